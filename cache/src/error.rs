//! Error types for the document cache.

use thiserror::Error;

/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Errors that can occur inside the cache.
///
/// These stay internal: public reads translate them to a miss, public
/// writes to a `false` return.
#[derive(Error, Debug)]
pub enum CacheError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
