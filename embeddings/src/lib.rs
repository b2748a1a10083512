//! # Embeddings
//!
//! Embedding generation and chunk-level similarity search for the corpus
//! retrieval system.
//!
//! - **Chunking**: documents are split into overlapping fixed-size
//!   word-count windows before embedding
//! - **Providers**: a deterministic local hashing embedder plus a remote
//!   API-backed provider
//! - **Similarity Index**: chunk-level nearest-neighbor search that regroups
//!   matches by owning document
//!
//! The index trades fidelity for queryability: a search result's content is
//! reconstructed from the chunks that matched, not from the original full
//! text. Callers that need the full text fetch the document by id.

pub mod chunker;
pub mod error;
pub mod index;
pub mod provider;
pub mod similarity;

pub use chunker::Chunker;
pub use error::{EmbeddingError, Result};
pub use index::SimilarityIndex;
pub use provider::{EmbeddingProvider, HashEmbedder, RemoteEmbedder};
pub use similarity::{cosine_distance, cosine_similarity};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;

/// Default embedding dimension for the local hashing provider.
pub const DEFAULT_DIMENSION: usize = 384;
