//! API-backed document source for remote knowledge bases.
//!
//! Wire contract:
//!
//! - `GET {base}/documents/{id}` → `{"metadata": {...}, "content": "..."}`
//! - `GET {base}/search?q=<query>&limit=<n>` → `{"results": [...]}`
//! - `GET {base}/documents?limit=<n>` → `{"documents": [...]}`
//!
//! A bearer credential is attached to every request when configured. Any
//! non-2xx status or transport error is converted to "absent"/empty at the
//! trait boundary.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::document::{Document, DocumentMetadata};
use crate::error::{Result, SourceError};
use crate::source::DocumentSource;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Document source backed by a remote knowledge-base API.
pub struct ApiSource {
    /// Base URL, without trailing slash.
    base_url: String,

    /// HTTP client carrying auth headers and the request timeout.
    client: reqwest::Client,
}

impl ApiSource {
    /// Create an API source for the given base URL.
    ///
    /// When `api_key` is set, it is sent as a bearer credential on every
    /// request. Each request carries an independent `timeout`; a timed-out
    /// call contributes nothing to that operation's result.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<&str>,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            let value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| SourceError::InvalidResponse(format!("invalid api key: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { base_url, client })
    }

    async fn try_retrieve(&self, document_id: &str) -> Result<Option<Document>> {
        let url = format!("{}/documents/{document_id}", self.base_url);
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            debug!("document {document_id} not found at {url}");
            return Ok(None);
        }
        let response = response.error_for_status()?;

        let payload: DocumentPayload = response.json().await?;
        Ok(Some(payload.into_document()))
    }

    async fn try_search(&self, query: &str, limit: usize) -> Result<Vec<Document>> {
        let url = format!("{}/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("limit", &limit.to_string())])
            .send()
            .await?
            .error_for_status()?;

        let payload: SearchPayload = response.json().await?;
        Ok(payload
            .results
            .into_iter()
            .map(DocumentPayload::into_document)
            .collect())
    }

    async fn try_list(&self, limit: usize) -> Result<Vec<DocumentMetadata>> {
        let url = format!("{}/documents", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("limit", &limit.to_string())])
            .send()
            .await?
            .error_for_status()?;

        let payload: ListPayload = response.json().await?;
        Ok(payload.documents)
    }
}

#[async_trait::async_trait]
impl DocumentSource for ApiSource {
    fn name(&self) -> &str {
        "api"
    }

    async fn retrieve_document(&self, document_id: &str) -> Option<Document> {
        match self.try_retrieve(document_id).await {
            Ok(doc) => doc,
            Err(e) => {
                warn!("error retrieving document {document_id} from API: {e}");
                None
            }
        }
    }

    async fn search_documents(&self, query: &str, limit: usize) -> Vec<Document> {
        match self.try_search(query, limit).await {
            Ok(docs) => docs,
            Err(e) => {
                warn!("error searching API for {query:?}: {e}");
                Vec::new()
            }
        }
    }

    async fn list_documents(&self, limit: usize) -> Vec<DocumentMetadata> {
        match self.try_list(limit).await {
            Ok(listing) => listing,
            Err(e) => {
                warn!("error listing documents from API: {e}");
                Vec::new()
            }
        }
    }
}

/// One document on the wire.
#[derive(Debug, Deserialize)]
struct DocumentPayload {
    metadata: DocumentMetadata,
    #[serde(default)]
    content: String,
}

impl DocumentPayload {
    fn into_document(self) -> Document {
        Document::new(self.metadata, self.content)
    }
}

/// Response shape of `GET /search`.
#[derive(Debug, Deserialize)]
struct SearchPayload {
    #[serde(default)]
    results: Vec<DocumentPayload>,
}

/// Response shape of `GET /documents`.
#[derive(Debug, Deserialize)]
struct ListPayload {
    #[serde(default)]
    documents: Vec<DocumentMetadata>,
}
