//! Document data model shared by every retrieval component.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Content format of a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// PDF document.
    Pdf,
    /// Plain text.
    #[default]
    Text,
    /// HTML page.
    Html,
    /// Markdown document.
    Markdown,
    /// JSON payload.
    Json,
    /// XML payload.
    Xml,
}

/// Identity and descriptive attributes of a document.
///
/// The `id` is globally unique within one coordinator instance and stable
/// across sources. Metadata is only ever replaced whole; there are no
/// partial updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Unique identifier, stable across sources.
    pub id: String,

    /// Human-readable title.
    pub title: String,

    /// Originating source label (file path, URL, ...).
    pub source: String,

    /// Content format tag.
    pub content_type: ContentType,

    /// When the document was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// When the document was last modified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,

    /// Author, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Size in bytes of the backing content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,

    /// Page count, for paginated formats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,

    /// Keyword tags. Order carries no meaning.
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl DocumentMetadata {
    /// Create metadata with the required fields; optional fields start empty.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        source: impl Into<String>,
        content_type: ContentType,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            source: source.into(),
            content_type,
            created_at: None,
            modified_at: None,
            author: None,
            file_size: None,
            page_count: None,
            keywords: Vec::new(),
        }
    }

    /// Set the author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the keyword tags.
    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }
}

/// A document: metadata paired with full text content.
///
/// Documents are immutable value objects passed by copy between layers.
/// The one exception is `chunks`, which the similarity index fills in when
/// the document is indexed. The cache holds independent serialized copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Identity and descriptive attributes.
    pub metadata: DocumentMetadata,

    /// Full text content.
    pub content: String,

    /// Content chunks, populated by the similarity index at indexing time.
    #[serde(default)]
    pub chunks: Vec<String>,

    /// Document-level embedding, when one has been computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Document {
    /// Create a document from metadata and content.
    pub fn new(metadata: DocumentMetadata, content: impl Into<String>) -> Self {
        Self {
            metadata,
            content: content.into(),
            chunks: Vec::new(),
            embedding: None,
        }
    }

    /// The document's unique id.
    pub fn id(&self) -> &str {
        &self.metadata.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_metadata_roundtrip() {
        let metadata = DocumentMetadata::new("doc-1", "Quarterly Report", "reports/", ContentType::Markdown)
            .with_author("finance")
            .with_keywords(vec!["q3".to_string(), "revenue".to_string()]);

        let json = serde_json::to_string(&metadata).unwrap();
        let parsed: DocumentMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, metadata);
    }

    #[test]
    fn test_content_type_snake_case() {
        let json = serde_json::to_string(&ContentType::Markdown).unwrap();
        assert_eq!(json, "\"markdown\"");
    }

    #[test]
    fn test_document_defaults_on_deserialize() {
        // Wire payloads omit chunks and embedding entirely.
        let json = r#"{
            "metadata": {
                "id": "d1",
                "title": "t",
                "source": "api",
                "content_type": "text"
            },
            "content": "hello"
        }"#;

        let doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(doc.id(), "d1");
        assert!(doc.chunks.is_empty());
        assert!(doc.embedding.is_none());
    }
}
