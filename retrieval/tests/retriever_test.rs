//! Integration tests for the retrieval coordinator.
//!
//! These exercise the full stack: file-backed source, mock remote API,
//! similarity index, and cache, through the coordinator's public surface.

use anyhow::Result;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use corpus_retrieval::{
    ApiConfig, ContentType, Document, DocumentMetadata, DocumentRetriever, RetrievalConfig,
};

fn make_doc(id: &str, content: &str) -> Document {
    let metadata = DocumentMetadata::new(id, id, "test", ContentType::Text);
    Document::new(metadata, content)
}

async fn retriever_with_files(files: &[(&str, &str)]) -> Result<(TempDir, DocumentRetriever)> {
    let dir = TempDir::new()?;
    for (name, content) in files {
        std::fs::write(dir.path().join(name), content)?;
    }
    let retriever = DocumentRetriever::new(RetrievalConfig::new(dir.path())).await?;
    Ok((dir, retriever))
}

#[tokio::test]
async fn test_end_to_end_retrieve_and_search() -> Result<()> {
    let (_dir, retriever) =
        retriever_with_files(&[("d1.txt", "quarterly revenue rose 15 percent")]).await?;

    // Retrieval must hand back the stored content byte-for-byte, and as a
    // side effect make the document searchable.
    let doc = retriever.retrieve_document("d1", true).await.expect("d1 exists");
    assert_eq!(doc.content, "quarterly revenue rose 15 percent");

    // The file stem carries no query vocabulary, so only the similarity
    // index can produce this hit.
    let results = retriever.search_documents("revenue", 5, false).await;
    assert!(
        results.iter().any(|d| d.id() == "d1"),
        "expected d1 in search results"
    );

    Ok(())
}

#[tokio::test]
async fn test_lookup_miss_is_none() -> Result<()> {
    let (_dir, retriever) = retriever_with_files(&[]).await?;
    assert!(retriever.retrieve_document("ghost", true).await.is_none());
    Ok(())
}

#[tokio::test]
async fn test_index_hit_takes_precedence_over_source_hit() -> Result<()> {
    // The file source will match "alpha" by stem; the index holds the same
    // document id with different content. The merged result must carry the
    // index's reconstruction, proving the index entry (and its score) won.
    let (_dir, retriever) = retriever_with_files(&[("alpha.txt", "alpha alpha alpha")]).await?;

    let mut indexed = make_doc("alpha", "alpha");
    assert!(retriever.add_document_to_index(&mut indexed).await);

    let results = retriever.search_documents("alpha", 5, false).await;
    assert_eq!(results.len(), 1, "same id must merge to one entry");
    assert_eq!(results[0].content, "alpha");

    Ok(())
}

#[tokio::test]
async fn test_fallback_to_api_source_and_caching() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/documents/remote-doc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metadata": {
                "id": "remote-doc",
                "title": "Remote Doc",
                "source": "api",
                "content_type": "text"
            },
            "content": "served remotely"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new()?;
    let config = RetrievalConfig::new(dir.path()).with_api(ApiConfig::new(server.uri()));
    let retriever = DocumentRetriever::new(config).await?;

    // File source has nothing; the API source must be consulted next.
    let doc = retriever
        .retrieve_document("remote-doc", true)
        .await
        .expect("remote doc");
    assert_eq!(doc.content, "served remotely");

    // Second lookup is served from cache: the mock's expect(1) verifies no
    // further HTTP round-trip happened.
    let cached = retriever
        .retrieve_document("remote-doc", true)
        .await
        .expect("cached doc");
    assert_eq!(cached.content, "served remotely");

    Ok(())
}

#[tokio::test]
async fn test_unavailable_api_degrades_to_not_found() -> Result<()> {
    // Nothing is listening on this port; the source must swallow the
    // transport error and the coordinator must report a plain miss.
    let dir = TempDir::new()?;
    let config =
        RetrievalConfig::new(dir.path()).with_api(ApiConfig::new("http://127.0.0.1:1"));
    let retriever = DocumentRetriever::new(config).await?;

    assert!(retriever.retrieve_document("anything", true).await.is_none());
    assert!(retriever.search_documents("anything", 5, false).await.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_empty_and_garbage_queries_do_not_error() -> Result<()> {
    let (_dir, retriever) =
        retriever_with_files(&[("report.txt", "quarterly revenue figures")]).await?;

    let empty = retriever.search_documents("", 5, true).await;
    assert!(empty.len() <= 5);

    let garbage = retriever.search_documents("@#$%^&*()", 5, true).await;
    assert!(garbage.len() <= 5);

    Ok(())
}

#[tokio::test]
async fn test_search_results_served_from_cache() -> Result<()> {
    let (dir, retriever) =
        retriever_with_files(&[("sales-summary.txt", "enterprise deals closed")]).await?;

    let first = retriever.search_documents("sales", 5, true).await;
    assert_eq!(first.len(), 1);

    // Remove the backing file; the cached result list must still answer.
    std::fs::remove_file(dir.path().join("sales-summary.txt"))?;

    let second = retriever.search_documents("sales", 5, true).await;
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].id(), "sales-summary");

    Ok(())
}

#[tokio::test]
async fn test_search_limit_truncates() -> Result<()> {
    let (_dir, retriever) = retriever_with_files(&[
        ("doc-a.txt", "first"),
        ("doc-b.txt", "second"),
        ("doc-c.txt", "third"),
    ])
    .await?;

    let results = retriever.search_documents("doc", 2, false).await;
    assert_eq!(results.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_reindexing_same_document_counts_once() -> Result<()> {
    let (_dir, retriever) = retriever_with_files(&[]).await?;

    let mut doc = make_doc("d1", "some indexed content");
    assert!(retriever.add_document_to_index(&mut doc).await);
    assert!(retriever.add_document_to_index(&mut doc).await);

    assert_eq!(retriever.stats().await.total_documents, 1);

    Ok(())
}

#[tokio::test]
async fn test_stats_reflect_activity() -> Result<()> {
    let (_dir, retriever) =
        retriever_with_files(&[("d1.txt", "quarterly revenue rose 15 percent")]).await?;

    let before = retriever.stats().await;
    assert_eq!(before.total_documents, 0);
    assert_eq!(before.sources_available, 1);
    assert_eq!(before.cache_entries, 0);

    retriever.retrieve_document("d1", true).await.expect("d1 exists");

    let after = retriever.stats().await;
    assert_eq!(after.total_documents, 1);
    assert_eq!(after.cache_entries, 1);

    Ok(())
}

#[tokio::test]
async fn test_clear_cache() -> Result<()> {
    let (_dir, retriever) = retriever_with_files(&[("d1.txt", "cached content")]).await?;

    retriever.retrieve_document("d1", true).await.expect("d1 exists");
    assert_eq!(retriever.stats().await.cache_entries, 1);

    retriever.clear_cache().await;
    assert_eq!(retriever.stats().await.cache_entries, 0);

    Ok(())
}

#[tokio::test]
async fn test_cache_can_be_disabled() -> Result<()> {
    let dir = TempDir::new()?;
    std::fs::write(dir.path().join("d1.txt"), "uncached content")?;

    let config = RetrievalConfig::new(dir.path()).with_cache_enabled(false);
    let retriever = DocumentRetriever::new(config).await?;

    retriever.retrieve_document("d1", true).await.expect("d1 exists");
    assert_eq!(retriever.stats().await.cache_entries, 0);

    Ok(())
}

#[tokio::test]
async fn test_list_documents_deduplicates_by_id() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/documents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [
                {"id": "shared", "title": "From API", "source": "api", "content_type": "text"},
                {"id": "api-only", "title": "API Only", "source": "api", "content_type": "text"}
            ]
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new()?;
    std::fs::write(dir.path().join("shared.txt"), "file version")?;

    let config = RetrievalConfig::new(dir.path()).with_api(ApiConfig::new(server.uri()));
    let retriever = DocumentRetriever::new(config).await?;

    let listing = retriever.list_documents(10).await;
    let mut ids: Vec<&str> = listing.iter().map(|m| m.id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["api-only", "shared"]);

    // The file source outranks the API source for the shared id.
    let shared = listing.iter().find(|m| m.id == "shared").expect("shared listed");
    assert_ne!(shared.title, "From API");

    Ok(())
}
