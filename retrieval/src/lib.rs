//! # Retrieval Coordinator
//!
//! This crate combines the corpus retrieval components behind one surface:
//!
//! - **Sources**: file-backed and API-backed document providers
//! - **Similarity Index**: chunk-level embedding search
//! - **Cache**: TTL'd documents and search results
//!
//! ## Architecture
//!
//! ```text
//! caller ──► DocumentRetriever
//!                 │
//!                 ├─► DocumentCache ──────────── fast path
//!                 │
//!                 ├─► SimilarityIndex ─┐
//!                 ├─► FileSource ──────┼── fan-out ─► merge/rank ─► cache
//!                 └─► ApiSource ───────┘                 write-through
//! ```
//!
//! Lookups try the cache, then each source in priority order, indexing
//! whatever they fetch. Searches fan out to the index and every source
//! concurrently, merge by relevance score, and deduplicate by document id.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use corpus_retrieval::{DocumentRetriever, RetrievalConfig};
//!
//! let config = RetrievalConfig::new("./documents");
//! let retriever = DocumentRetriever::new(config).await?;
//!
//! let doc = retriever.retrieve_document("q3-report", true).await;
//! let hits = retriever.search_documents("quarterly revenue", 10, true).await;
//! ```

pub mod config;
pub mod engine;
pub mod error;

pub use config::{ApiConfig, CacheSettings, EmbeddingSettings, QuerySettings, RetrievalConfig};
pub use engine::{DocumentRetriever, RetrieverStats};
pub use error::{Result, RetrievalError};

// Re-export from dependencies for convenience
pub use corpus_cache::DocumentCache;
pub use corpus_embeddings::{EmbeddingProvider, SimilarityIndex};
pub use corpus_sources::{ContentType, Document, DocumentMetadata, DocumentSource};
