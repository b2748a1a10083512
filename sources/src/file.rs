//! File-backed document source.
//!
//! Documents live as markdown or plain-text files in a single directory,
//! addressed by a path convention: document id `report-q3` resolves to
//! `report-q3.md`, falling back to `report-q3.txt`. Search is a substring
//! match against file stems only; content search is the similarity index's
//! job, not this source's.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::fs;
use tracing::{debug, warn};

use crate::document::{ContentType, Document, DocumentMetadata};
use crate::error::Result;
use crate::source::DocumentSource;

/// File extensions recognized as documents, in resolution order.
const EXTENSIONS: [(&str, ContentType); 2] =
    [("md", ContentType::Markdown), ("txt", ContentType::Text)];

/// Document source backed by a directory of markdown/plain-text files.
pub struct FileSource {
    /// Root directory holding the document files.
    root: PathBuf,
}

impl FileSource {
    /// Create a file source rooted at the given directory.
    ///
    /// The directory is created if it doesn't exist.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// The root directory this source reads from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn try_retrieve(&self, document_id: &str) -> Result<Option<Document>> {
        for (ext, content_type) in EXTENSIONS {
            let path = self.root.join(format!("{document_id}.{ext}"));
            let Ok(file_meta) = fs::metadata(&path).await else {
                continue;
            };

            let raw = fs::read_to_string(&path).await?;

            // Primary extraction; fall back to the raw file contents when it
            // yields nothing.
            let (title, content) = match content_type {
                ContentType::Markdown => {
                    let (title, body) = parse_markdown(&raw);
                    if body.trim().is_empty() {
                        (title, raw)
                    } else {
                        (title, body)
                    }
                }
                _ => (None, raw),
            };

            if content.trim().is_empty() {
                warn!("no content extracted from {}", path.display());
                return Ok(None);
            }

            let mut metadata = DocumentMetadata::new(
                document_id,
                title.unwrap_or_else(|| document_id.to_string()),
                path.display().to_string(),
                content_type,
            );
            metadata.file_size = Some(file_meta.len());
            metadata.modified_at = file_meta.modified().ok().map(DateTime::<Utc>::from);
            metadata.created_at = file_meta.created().ok().map(DateTime::<Utc>::from);

            return Ok(Some(Document::new(metadata, content)));
        }

        debug!("document {document_id} not found under {}", self.root.display());
        Ok(None)
    }

    async fn try_search(&self, query: &str, limit: usize) -> Result<Vec<Document>> {
        let needle = query.to_lowercase();
        let mut results = Vec::new();

        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if results.len() >= limit {
                break;
            }

            let path = entry.path();
            let Some(stem) = document_stem(&path) else {
                continue;
            };

            if stem.to_lowercase().contains(&needle) {
                match self.try_retrieve(&stem).await {
                    Ok(Some(doc)) => results.push(doc),
                    Ok(None) => {}
                    Err(e) => warn!("failed to read {}: {e}", path.display()),
                }
            }
        }

        Ok(results)
    }

    async fn try_list(&self, limit: usize) -> Result<Vec<DocumentMetadata>> {
        let mut listing = Vec::new();

        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if listing.len() >= limit {
                break;
            }

            let path = entry.path();
            let Some(stem) = document_stem(&path) else {
                continue;
            };
            let Some(content_type) = content_type_of(&path) else {
                continue;
            };
            let Ok(file_meta) = entry.metadata().await else {
                continue;
            };

            let mut metadata = DocumentMetadata::new(
                stem.clone(),
                stem,
                path.display().to_string(),
                content_type,
            );
            metadata.file_size = Some(file_meta.len());
            metadata.modified_at = file_meta.modified().ok().map(DateTime::<Utc>::from);
            metadata.created_at = file_meta.created().ok().map(DateTime::<Utc>::from);

            listing.push(metadata);
        }

        Ok(listing)
    }
}

#[async_trait::async_trait]
impl DocumentSource for FileSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn retrieve_document(&self, document_id: &str) -> Option<Document> {
        match self.try_retrieve(document_id).await {
            Ok(doc) => doc,
            Err(e) => {
                warn!("error retrieving document {document_id}: {e}");
                None
            }
        }
    }

    async fn search_documents(&self, query: &str, limit: usize) -> Vec<Document> {
        match self.try_search(query, limit).await {
            Ok(docs) => docs,
            Err(e) => {
                warn!("error searching documents for {query:?}: {e}");
                Vec::new()
            }
        }
    }

    async fn list_documents(&self, limit: usize) -> Vec<DocumentMetadata> {
        match self.try_list(limit).await {
            Ok(listing) => listing,
            Err(e) => {
                warn!("error listing documents: {e}");
                Vec::new()
            }
        }
    }
}

/// File stem of a recognized document file, if `path` is one.
fn document_stem(path: &Path) -> Option<String> {
    content_type_of(path)?;
    path.file_stem().map(|s| s.to_string_lossy().to_string())
}

/// Content type implied by a file's extension.
fn content_type_of(path: &Path) -> Option<ContentType> {
    let ext = path.extension()?.to_str()?;
    EXTENSIONS
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, ct)| *ct)
}

/// Extract a markdown document's title and body.
///
/// Skips a leading `---` frontmatter block and lifts the first `# ` heading
/// out of the body as the title.
fn parse_markdown(raw: &str) -> (Option<String>, String) {
    let mut lines = raw.lines().peekable();

    // Frontmatter: a leading `---` line up to the closing `---`.
    if lines.peek().is_some_and(|l| l.trim() == "---") {
        lines.next();
        for line in lines.by_ref() {
            if line.trim() == "---" {
                break;
            }
        }
    }

    let mut title = None;
    let mut body = String::new();
    for line in lines {
        if title.is_none() && body.trim().is_empty() {
            if let Some(heading) = line.trim().strip_prefix("# ") {
                title = Some(heading.trim().to_string());
                continue;
            }
        }
        body.push_str(line);
        body.push('\n');
    }

    (title, body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    async fn source_with_files(files: &[(&str, &str)]) -> (TempDir, FileSource) {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            std::fs::write(dir.path().join(name), content).unwrap();
        }
        let source = FileSource::new(dir.path()).await.unwrap();
        (dir, source)
    }

    #[tokio::test]
    async fn test_retrieve_markdown_document() {
        let (_dir, source) =
            source_with_files(&[("q3-report.md", "# Q3 Report\n\nRevenue rose 15 percent.")]).await;

        let doc = source.retrieve_document("q3-report").await.unwrap();
        assert_eq!(doc.metadata.title, "Q3 Report");
        assert_eq!(doc.metadata.content_type, ContentType::Markdown);
        assert_eq!(doc.content, "Revenue rose 15 percent.");
        assert!(doc.metadata.file_size.is_some());
    }

    #[tokio::test]
    async fn test_retrieve_prefers_markdown_over_text() {
        let (_dir, source) = source_with_files(&[
            ("notes.md", "markdown body"),
            ("notes.txt", "text body"),
        ])
        .await;

        let doc = source.retrieve_document("notes").await.unwrap();
        assert_eq!(doc.metadata.content_type, ContentType::Markdown);
        assert_eq!(doc.content, "markdown body");
    }

    #[tokio::test]
    async fn test_retrieve_missing_is_absent() {
        let (_dir, source) = source_with_files(&[]).await;
        assert!(source.retrieve_document("nope").await.is_none());
    }

    #[tokio::test]
    async fn test_markdown_frontmatter_skipped() {
        let raw = "---\nauthor: finance\n---\n# Title\n\nBody text.";
        let (_dir, source) = source_with_files(&[("doc.md", raw)]).await;

        let doc = source.retrieve_document("doc").await.unwrap();
        assert_eq!(doc.metadata.title, "Title");
        assert_eq!(doc.content, "Body text.");
    }

    #[tokio::test]
    async fn test_markdown_without_body_falls_back_to_raw() {
        // Primary extraction strips everything; fallback keeps the raw file.
        let raw = "---\nauthor: finance\n---\n";
        let (_dir, source) = source_with_files(&[("stub.md", raw)]).await;

        let doc = source.retrieve_document("stub").await.unwrap();
        assert_eq!(doc.content, raw);
    }

    #[tokio::test]
    async fn test_search_matches_stems_only() {
        let (_dir, source) = source_with_files(&[
            ("sales-q3.md", "# Sales\n\nNothing about the query word here."),
            ("retro.txt", "sales sales sales"),
        ])
        .await;

        let results = source.search_documents("sales", 10).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id(), "sales-q3");
    }

    #[tokio::test]
    async fn test_search_respects_limit() {
        let (_dir, source) = source_with_files(&[
            ("a-doc.txt", "one"),
            ("b-doc.txt", "two"),
            ("c-doc.txt", "three"),
        ])
        .await;

        let results = source.search_documents("doc", 2).await;
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_list_documents() {
        let (_dir, source) = source_with_files(&[
            ("one.md", "# One\n\nbody"),
            ("two.txt", "body"),
            ("ignored.pdf", "binary-ish"),
        ])
        .await;

        let mut listing = source.list_documents(10).await;
        listing.sort_by(|a, b| a.id.cmp(&b.id));

        let ids: Vec<&str> = listing.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["one", "two"]);
    }
}
