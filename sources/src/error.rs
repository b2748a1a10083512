//! Error types for document sources.

use thiserror::Error;

/// Result type alias for source operations.
pub type Result<T> = std::result::Result<T, SourceError>;

/// Errors that can occur inside a document source.
///
/// These never cross a source's public boundary; the trait methods convert
/// them to "absent" or an empty list after logging.
#[derive(Error, Debug)]
pub enum SourceError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not match the wire contract.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
