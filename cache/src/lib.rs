//! # Document Cache
//!
//! TTL'd cache for documents and search-result lists, keyed by a
//! fingerprint of (operation namespace, identifier). The cache is a pure
//! accelerator: reads never error (every failure path is a miss) and
//! writes report success as a boolean, so the system stays correct with
//! the cache completely broken.

pub mod error;
pub mod store;

pub use error::{CacheError, Result};
pub use store::DocumentCache;
