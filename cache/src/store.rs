//! The document cache store.
//!
//! Entries live in memory behind an async lock, each carrying an expiry
//! timestamp. With persistence enabled the full entry set is also written
//! to a JSON file in the cache directory, reloaded on construction with
//! expired entries discarded.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use corpus_sources::Document;

use crate::error::Result;

/// File name of the persisted entry set inside the cache directory.
const PERSIST_FILE: &str = "entries.json";

/// A cached value: one document or one search-result list.
#[derive(Debug, Clone, Serialize, Deserialize)]
enum CachedValue {
    Document(Document),
    SearchResults(Vec<Document>),
}

/// One cache entry with its expiry bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    /// Derived cache key.
    key: String,

    /// The cached value.
    value: CachedValue,

    /// When the entry was stored (unix millis).
    stored_at: u64,

    /// When the entry stops being returned (unix millis).
    expires_at: u64,

    /// Insertion sequence number, used for oldest-first eviction.
    seq: u64,
}

impl CacheEntry {
    fn is_expired(&self, now: u64) -> bool {
        self.expires_at <= now
    }
}

/// TTL'd cache for documents and search-result lists.
///
/// Shared process-wide: all operations take `&self` and are safe to call
/// from concurrent tasks. Writes are idempotent upserts keyed by the
/// derived fingerprint, so concurrent writers race with last-write-wins
/// semantics.
pub struct DocumentCache {
    /// In-memory entries.
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,

    /// Path of the persisted entry file, when persistence is enabled.
    persist_path: Option<PathBuf>,

    /// Maximum number of entries before oldest-first eviction.
    max_entries: usize,

    /// Monotonic insertion counter.
    next_seq: AtomicU64,
}

impl DocumentCache {
    /// Create a new in-memory cache.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            persist_path: None,
            max_entries,
            next_seq: AtomicU64::new(0),
        }
    }

    /// Create a cache persisted under the given directory.
    ///
    /// The directory is created if missing. A previously persisted entry
    /// set is reloaded, dropping entries that expired in the meantime; a
    /// corrupt entry file is discarded with a warning rather than raised.
    pub async fn with_persistence(dir: impl AsRef<Path>, max_entries: usize) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).await?;

        let cache = Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            persist_path: Some(dir.join(PERSIST_FILE)),
            max_entries,
            next_seq: AtomicU64::new(0),
        };
        cache.load().await;
        Ok(cache)
    }

    /// Derive the cache key for an operation namespace and identifier.
    ///
    /// Identical identifiers collide deterministically; distinct namespaces
    /// never collide with each other.
    fn cache_key(namespace: &str, identifier: &str) -> String {
        let digest = Sha256::digest(identifier.as_bytes());
        let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        format!("{namespace}:{hex}")
    }

    /// Get a cached document, if present and not expired.
    pub async fn get_document(&self, document_id: &str) -> Option<Document> {
        let key = Self::cache_key("doc", document_id);
        match self.get_value(&key).await {
            Some(CachedValue::Document(doc)) => Some(doc),
            _ => None,
        }
    }

    /// Store a document keyed by its id, overwriting any prior entry.
    ///
    /// Returns `false` when the storage layer failed; the failure is logged
    /// and never propagated.
    pub async fn set_document(&self, document: &Document, ttl: Duration) -> bool {
        let key = Self::cache_key("doc", document.id());
        let value = CachedValue::Document(document.clone());
        match self.insert(key, value, ttl).await {
            Ok(()) => true,
            Err(e) => {
                warn!("error caching document {}: {e}", document.id());
                false
            }
        }
    }

    /// Get cached search results for the exact query string.
    pub async fn get_search_results(&self, query: &str) -> Option<Vec<Document>> {
        let key = Self::cache_key("search", query);
        match self.get_value(&key).await {
            Some(CachedValue::SearchResults(docs)) => Some(docs),
            _ => None,
        }
    }

    /// Store search results for the exact query string.
    pub async fn set_search_results(
        &self,
        query: &str,
        results: &[Document],
        ttl: Duration,
    ) -> bool {
        let key = Self::cache_key("search", query);
        let value = CachedValue::SearchResults(results.to_vec());
        match self.insert(key, value, ttl).await {
            Ok(()) => true,
            Err(e) => {
                warn!("error caching search results for {query:?}: {e}");
                false
            }
        }
    }

    /// Drop all entries.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
        if let Err(e) = self.persist().await {
            warn!("error persisting cleared cache: {e}");
        }
        info!("cleared document cache");
    }

    /// Number of live (unexpired) entries.
    pub async fn len(&self) -> usize {
        let now = now_millis();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| !e.is_expired(now))
            .count()
    }

    /// Whether the cache holds no live entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Fetch a live value, dropping it if expired.
    async fn get_value(&self, key: &str) -> Option<CachedValue> {
        let now = now_millis();

        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: treat as absent and drop the entry.
        debug!("cache entry {key} expired");
        self.entries.write().await.remove(key);
        None
    }

    async fn insert(&self, key: String, value: CachedValue, ttl: Duration) -> Result<()> {
        let now = now_millis();
        let entry = CacheEntry {
            key: key.clone(),
            value,
            stored_at: now,
            expires_at: now.saturating_add(ttl.as_millis() as u64),
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
        };

        {
            let mut entries = self.entries.write().await;

            // Evict the oldest entry when at capacity.
            if entries.len() >= self.max_entries && !entries.contains_key(&key) {
                if let Some(oldest_key) = entries
                    .values()
                    .min_by_key(|e| e.seq)
                    .map(|e| e.key.clone())
                {
                    debug!("evicting cache entry {oldest_key}");
                    entries.remove(&oldest_key);
                }
            }

            entries.insert(key, entry);
        }

        self.persist().await
    }

    /// Write the entry set to disk, atomically via a temp file.
    async fn persist(&self) -> Result<()> {
        let Some(ref path) = self.persist_path else {
            return Ok(());
        };

        let entries = self.entries.read().await;
        let all: Vec<&CacheEntry> = entries.values().collect();
        let content = serde_json::to_string(&all)?;
        drop(entries);

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, &content).await?;
        fs::rename(&temp_path, path).await?;

        Ok(())
    }

    /// Load persisted entries, skipping anything already expired.
    async fn load(&self) {
        let Some(ref path) = self.persist_path else {
            return;
        };
        let Ok(content) = fs::read_to_string(path).await else {
            return;
        };

        let parsed: Vec<CacheEntry> = match serde_json::from_str(&content) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("discarding corrupt cache file {}: {e}", path.display());
                return;
            }
        };

        let now = now_millis();
        let mut max_seq = 0;
        let mut entries = self.entries.write().await;
        for entry in parsed {
            if entry.is_expired(now) {
                continue;
            }
            max_seq = max_seq.max(entry.seq);
            entries.insert(entry.key.clone(), entry);
        }

        self.next_seq.store(max_seq + 1, Ordering::Relaxed);
        info!("loaded {} cache entries from disk", entries.len());
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
