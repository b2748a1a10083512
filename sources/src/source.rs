//! The document source abstraction.

use async_trait::async_trait;

use crate::document::{Document, DocumentMetadata};

/// A backing provider of documents.
///
/// Every variant implements the same three operations. Failures stay inside
/// the source: `retrieve_document` collapses I/O failures, parse failures
/// and not-found to `None`, and the search/list operations collapse them to
/// an empty list. The coordinator cannot distinguish "not found" from
/// "source failed" for a given source; it simply moves on to the next one.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Short label used in logs and stats.
    fn name(&self) -> &str;

    /// Fetch a single document by id.
    async fn retrieve_document(&self, document_id: &str) -> Option<Document>;

    /// Free-text search, returning at most `limit` documents.
    async fn search_documents(&self, query: &str, limit: usize) -> Vec<Document>;

    /// Enumerate available documents, up to `limit`.
    async fn list_documents(&self, limit: usize) -> Vec<DocumentMetadata>;
}
