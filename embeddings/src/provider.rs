//! Embedding providers.
//!
//! Two providers are supported: a deterministic local hashing embedder that
//! needs no network or model weights, and a remote API-backed provider for
//! deployments with a real embedding service.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::Embedding;
use crate::error::{EmbeddingError, Result};
use crate::similarity::normalize;

/// Trait for embedding providers.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Get the name of this provider.
    fn name(&self) -> &str;

    /// Model identifier this provider embeds with.
    fn model(&self) -> &str;

    /// Dimension of the embeddings this provider produces.
    fn dimension(&self) -> usize;

    /// Generate an embedding for the given text.
    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// Generate embeddings for multiple texts.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        // Default implementation: process sequentially
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Check if the provider is available (API key set, etc.).
    fn is_available(&self) -> bool;
}

/// Deterministic local embedding provider.
///
/// Feature-hashes each lowercased alphanumeric token into a fixed-dimension
/// slot and L2-normalizes the resulting count vector. Texts sharing
/// vocabulary always score a positive cosine similarity, which is all the
/// similarity index needs; there is no semantic generalization. Always
/// available, no network, stable within a process.
pub struct HashEmbedder {
    dimension: usize,
    model: String,
}

impl HashEmbedder {
    /// Create a hashing embedder with the given output dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            model: "hash-v1".to_string(),
        }
    }

    fn token_slot(&self, token: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        (hasher.finish() % self.dimension as u64) as usize
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(crate::DEFAULT_DIMENSION)
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    fn name(&self) -> &str {
        "hash"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        let mut vector = vec![0.0f32; self.dimension];

        let lowered = text.to_lowercase();
        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            vector[self.token_slot(token)] += 1.0;
        }

        normalize(&mut vector);
        Ok(vector)
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Remote embedding provider speaking the common `POST /embeddings` contract.
pub struct RemoteEmbedder {
    /// API base URL, without trailing slash.
    base_url: String,

    /// Bearer credential.
    api_key: Option<String>,

    /// HTTP client.
    client: reqwest::Client,

    /// Model requested from the API.
    model: String,

    /// Expected embedding dimension.
    dimension: usize,
}

impl RemoteEmbedder {
    /// Create a remote provider.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        dimension: usize,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client,
            model: model.into(),
            dimension,
        })
    }

    async fn request(&self, input: serde_json::Value) -> Result<ApiEmbeddingResponse> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(EmbeddingError::ProviderNotConfigured)?;

        debug!("requesting embeddings with model {}", self.model);

        let body = serde_json::json!({
            "input": input,
            "model": self.model,
        });

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ApiRequest(error_text));
        }

        Ok(response.json().await?)
    }

    fn check_dimension(&self, embedding: &[f32]) -> Result<()> {
        if embedding.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl EmbeddingProvider for RemoteEmbedder {
    fn name(&self) -> &str {
        "remote"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        let result = self.request(serde_json::json!(text)).await?;

        let embedding = result
            .data
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::InvalidResponse("no embedding in response".to_string()))?
            .embedding;

        self.check_dimension(&embedding)?;
        Ok(embedding)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let result = self.request(serde_json::json!(texts)).await?;

        if result.data.len() != texts.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                result.data.len()
            )));
        }

        let mut embeddings = Vec::with_capacity(result.data.len());
        for item in result.data {
            self.check_dimension(&item.embedding)?;
            embeddings.push(item.embedding);
        }
        Ok(embeddings)
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Wire format of the embeddings endpoint.
#[derive(Debug, Deserialize)]
struct ApiEmbeddingResponse {
    data: Vec<ApiEmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct ApiEmbeddingData {
    embedding: Vec<f32>,
}
