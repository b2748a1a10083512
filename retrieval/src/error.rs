//! Error types for the retrieval coordinator.

use thiserror::Error;

/// Result type alias for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Errors that can occur while building the retrieval coordinator.
///
/// Construction is the only fallible surface: once built, every public
/// coordinator operation degrades to "nothing found" instead of erroring.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// Cache error.
    #[error("cache error: {0}")]
    Cache(#[from] corpus_cache::CacheError),

    /// Document source error.
    #[error("source error: {0}")]
    Source(#[from] corpus_sources::SourceError),

    /// Embedding error.
    #[error("embedding error: {0}")]
    Embedding(#[from] corpus_embeddings::EmbeddingError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
