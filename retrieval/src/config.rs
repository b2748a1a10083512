//! Configuration for the retrieval coordinator.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, RetrievalError};

/// Configuration for the retrieval coordinator and its collaborators.
///
/// Consumed read-only at construction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Root directory of the file-backed source.
    pub documents_dir: PathBuf,

    /// Remote API source; omitted when no knowledge base is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<ApiConfig>,

    /// Cache settings.
    #[serde(default)]
    pub cache: CacheSettings,

    /// Embedding and chunking settings.
    #[serde(default)]
    pub embedding: EmbeddingSettings,

    /// Query processing settings.
    #[serde(default)]
    pub query: QuerySettings,
}

impl RetrievalConfig {
    /// Create a configuration with default values.
    pub fn new(documents_dir: impl Into<PathBuf>) -> Self {
        Self {
            documents_dir: documents_dir.into(),
            api: None,
            cache: CacheSettings::default(),
            embedding: EmbeddingSettings::default(),
            query: QuerySettings::default(),
        }
    }

    /// Load a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Set the remote API source.
    pub fn with_api(mut self, api: ApiConfig) -> Self {
        self.api = Some(api);
        self
    }

    /// Set the cache directory, enabling disk persistence.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache.dir = Some(dir.into());
        self
    }

    /// Enable or disable the cache entirely.
    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache.enabled = enabled;
        self
    }

    /// Set the embedding settings.
    pub fn with_embedding(mut self, embedding: EmbeddingSettings) -> Self {
        self.embedding = embedding;
        self
    }

    /// Set the query settings.
    pub fn with_query(mut self, query: QuerySettings) -> Self {
        self.query = query;
        self
    }

    /// Check invariants that would otherwise surface as broken behavior
    /// deep inside a collaborator.
    pub fn validate(&self) -> Result<()> {
        if self.embedding.dimension == 0 {
            return Err(RetrievalError::Config(
                "embedding dimension must be non-zero".to_string(),
            ));
        }
        if self.embedding.chunk_overlap >= self.embedding.chunk_size {
            return Err(RetrievalError::Config(format!(
                "chunk overlap {} must be less than chunk size {}",
                self.embedding.chunk_overlap, self.embedding.chunk_size
            )));
        }
        if let Some(api) = &self.api {
            if !api.base_url.starts_with("http://") && !api.base_url.starts_with("https://") {
                return Err(RetrievalError::Config(format!(
                    "API base URL must be http(s): {}",
                    api.base_url
                )));
            }
        }
        Ok(())
    }
}

/// Remote API source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the knowledge-base API.
    pub base_url: String,

    /// Bearer credential attached to every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_api_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// Create API settings for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout_secs: default_api_timeout_secs(),
        }
    }

    /// Set the bearer credential.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
}

fn default_api_timeout_secs() -> u64 {
    30
}

/// Cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Whether caching is used at all.
    pub enabled: bool,

    /// Directory for disk persistence; in-memory only when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Maximum number of cache entries.
    pub max_entries: usize,

    /// TTL for cached documents, in seconds.
    pub document_ttl_secs: u64,

    /// TTL for cached search results, in seconds.
    pub search_ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
            max_entries: 1024,
            document_ttl_secs: 3600,
            search_ttl_secs: 1800,
        }
    }
}

/// Embedding and chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Model identifier.
    pub model: String,

    /// Embedding dimension.
    pub dimension: usize,

    /// Words per chunk.
    pub chunk_size: usize,

    /// Words shared between consecutive chunks.
    pub chunk_overlap: usize,

    /// Remote embedding API; the local hashing embedder is used when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteEmbedderConfig>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "hash-v1".to_string(),
            dimension: corpus_embeddings::DEFAULT_DIMENSION,
            chunk_size: 500,
            chunk_overlap: 50,
            remote: None,
        }
    }
}

/// Remote embedding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteEmbedderConfig {
    /// Base URL of the embedding API.
    pub base_url: String,

    /// Bearer credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_api_timeout_secs")]
    pub timeout_secs: u64,
}

/// Query processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuerySettings {
    /// Default maximum number of search results.
    pub max_results: usize,

    /// Minimum similarity score for index results.
    pub similarity_threshold: f32,

    /// Relevance score assigned to source hits with no index score.
    pub source_hit_score: f32,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            max_results: 10,
            similarity_threshold: 0.0,
            source_hit_score: 0.5,
        }
    }
}
