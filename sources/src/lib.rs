//! # Document Sources
//!
//! This crate provides the document data model and the pluggable
//! [`DocumentSource`] abstraction used by the retrieval coordinator.
//!
//! Two source variants are provided:
//!
//! - [`FileSource`]: documents stored as markdown or plain-text files in a
//!   local directory
//! - [`ApiSource`]: documents served by a remote knowledge-base API
//!
//! Sources are deliberately infallible at their public boundary: a lookup
//! that fails for any reason reports "absent" and a search that fails
//! reports an empty list, so the coordinator can fall through to the next
//! source without caring why the previous one came up empty.

pub mod api;
pub mod document;
pub mod error;
pub mod file;
pub mod source;

pub use api::ApiSource;
pub use document::{ContentType, Document, DocumentMetadata};
pub use error::{Result, SourceError};
pub use file::FileSource;
pub use source::DocumentSource;
