//! Retrieval coordinator implementation.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use ordered_float::OrderedFloat;
use tracing::{debug, info, warn};

use corpus_cache::DocumentCache;
use corpus_embeddings::{Chunker, EmbeddingProvider, HashEmbedder, RemoteEmbedder, SimilarityIndex};
use corpus_sources::{ApiSource, Document, DocumentMetadata, DocumentSource, FileSource};

use crate::config::RetrievalConfig;
use crate::error::Result;

/// Coordinates document retrieval across heterogeneous sources.
///
/// On lookup, the coordinator checks the cache, then queries each source in
/// priority order until one succeeds, caching and indexing the result. On
/// search, it fans out to the similarity index and every source
/// concurrently, merges results by relevance score, deduplicates by
/// document id, and caches the merged list.
///
/// After construction no collaborator error escapes: a failed source,
/// cache, or index contributes nothing to that call and the operation
/// degrades to "nothing found" rather than erroring. There is no retry
/// policy; a failed collaborator is simply tried fresh on the next call.
pub struct DocumentRetriever {
    /// Configuration, read-only after construction.
    config: RetrievalConfig,

    /// Document sources in fixed priority order: file-backed before
    /// API-backed.
    sources: Vec<Arc<dyn DocumentSource>>,

    /// Chunk-level similarity index.
    index: Arc<SimilarityIndex>,

    /// Document/search-result cache; `None` when caching is disabled.
    cache: Option<Arc<DocumentCache>>,
}

impl DocumentRetriever {
    /// Build a coordinator from configuration.
    ///
    /// This is the only fallible operation on the coordinator.
    pub async fn new(config: RetrievalConfig) -> Result<Self> {
        config.validate()?;

        let file_source = FileSource::new(&config.documents_dir).await?;
        let mut sources: Vec<Arc<dyn DocumentSource>> = vec![Arc::new(file_source)];

        if let Some(api) = &config.api {
            let api_source = ApiSource::new(
                api.base_url.as_str(),
                api.api_key.as_deref(),
                Duration::from_secs(api.timeout_secs),
            )?;
            sources.push(Arc::new(api_source));
        }

        let provider: Arc<dyn EmbeddingProvider> = match &config.embedding.remote {
            Some(remote) => Arc::new(RemoteEmbedder::new(
                remote.base_url.as_str(),
                remote.api_key.clone(),
                config.embedding.model.as_str(),
                config.embedding.dimension,
                Duration::from_secs(remote.timeout_secs),
            )?),
            None => Arc::new(HashEmbedder::new(config.embedding.dimension)),
        };

        let chunker = Chunker::new(config.embedding.chunk_size, config.embedding.chunk_overlap)?;
        let index = Arc::new(
            SimilarityIndex::new(provider, chunker)
                .with_min_score(config.query.similarity_threshold),
        );

        let cache = if config.cache.enabled {
            let cache = match &config.cache.dir {
                Some(dir) => DocumentCache::with_persistence(dir, config.cache.max_entries).await?,
                None => DocumentCache::new(config.cache.max_entries),
            };
            Some(Arc::new(cache))
        } else {
            None
        };

        info!(
            "retrieval coordinator initialized with {} sources",
            sources.len()
        );

        Ok(Self {
            config,
            sources,
            index,
            cache,
        })
    }

    /// Retrieve a document by id.
    ///
    /// Checks the cache, then each source in priority order. The first
    /// source to yield the document wins; the result is written through to
    /// the cache and submitted to the similarity index so it becomes
    /// searchable. `None` means "not found", never an error.
    pub async fn retrieve_document(&self, document_id: &str, use_cache: bool) -> Option<Document> {
        if use_cache {
            if let Some(cache) = &self.cache {
                if let Some(doc) = cache.get_document(document_id).await {
                    debug!("retrieved document {document_id} from cache");
                    return Some(doc);
                }
            }
        }

        for source in &self.sources {
            let Some(mut doc) = source.retrieve_document(document_id).await else {
                continue;
            };

            if use_cache {
                if let Some(cache) = &self.cache {
                    cache.set_document(&doc, self.document_ttl()).await;
                }
            }

            // Self-healing indexing: anything fetched by id becomes
            // searchable. An indexing failure never blocks the return.
            if let Err(e) = self.index.add_document(&mut doc).await {
                warn!("failed to index document {document_id}: {e}");
            }

            info!(
                "retrieved document {document_id} from source {}",
                source.name()
            );
            return Some(doc);
        }

        debug!("document {document_id} not found in any source");
        None
    }

    /// Search for documents matching the query.
    ///
    /// On a cache miss, fans out concurrently to the similarity index and
    /// every source, then merges: index results keep their real scores;
    /// source hits whose id is not already present are appended with the
    /// configured default score and never overwrite an index entry. The
    /// merged list is sorted descending by score (ties keep insertion
    /// order), truncated to `limit`, and written through to the cache.
    pub async fn search_documents(
        &self,
        query: &str,
        limit: usize,
        use_cache: bool,
    ) -> Vec<Document> {
        if use_cache {
            if let Some(cache) = &self.cache {
                if let Some(mut results) = cache.get_search_results(query).await {
                    debug!("retrieved search results for {query:?} from cache");
                    results.truncate(limit);
                    return results;
                }
            }
        }

        let index_search = async {
            match self.index.search_similar(query, limit).await {
                Ok(scored) => scored,
                Err(e) => {
                    warn!("similarity search failed for {query:?}: {e}");
                    Vec::new()
                }
            }
        };
        let source_search = join_all(
            self.sources
                .iter()
                .map(|source| source.search_documents(query, limit)),
        );
        let (scored, per_source) = tokio::join!(index_search, source_search);

        let mut seen: HashSet<String> = HashSet::new();
        let mut merged: Vec<(Document, f32)> = Vec::with_capacity(scored.len());
        for (doc, score) in scored {
            seen.insert(doc.metadata.id.clone());
            merged.push((doc, score));
        }
        for doc in per_source.into_iter().flatten() {
            if seen.insert(doc.metadata.id.clone()) {
                merged.push((doc, self.config.query.source_hit_score));
            }
        }

        merged.sort_by_key(|(_, score)| std::cmp::Reverse(OrderedFloat(*score)));
        merged.truncate(limit);
        let results: Vec<Document> = merged.into_iter().map(|(doc, _)| doc).collect();

        if use_cache {
            if let Some(cache) = &self.cache {
                cache
                    .set_search_results(query, &results, self.search_ttl())
                    .await;
            }
        }

        info!("found {} documents for query {query:?}", results.len());
        results
    }

    /// List available documents across all sources.
    ///
    /// Duplicated ids keep the entry from the higher-priority source.
    pub async fn list_documents(&self, limit: usize) -> Vec<DocumentMetadata> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut listing = Vec::new();

        for source in &self.sources {
            for metadata in source.list_documents(limit).await {
                if seen.insert(metadata.id.clone()) {
                    listing.push(metadata);
                }
            }
        }

        listing.truncate(limit);
        listing
    }

    /// Add a document directly to the similarity index.
    ///
    /// Fills in `document.chunks` on success. Returns `false` on failure;
    /// the failure is logged, not raised.
    pub async fn add_document_to_index(&self, document: &mut Document) -> bool {
        match self.index.add_document(document).await {
            Ok(()) => true,
            Err(e) => {
                warn!("failed to index document {}: {e}", document.id());
                false
            }
        }
    }

    /// Coordinator statistics.
    pub async fn stats(&self) -> RetrieverStats {
        let cache_entries = match &self.cache {
            Some(cache) => cache.len().await,
            None => 0,
        };

        RetrieverStats {
            total_documents: self.index.document_count().await,
            sources_available: self.sources.len(),
            cache_entries,
        }
    }

    /// Drop every cache entry.
    pub async fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear().await;
        }
    }

    fn document_ttl(&self) -> Duration {
        Duration::from_secs(self.config.cache.document_ttl_secs)
    }

    fn search_ttl(&self) -> Duration {
        Duration::from_secs(self.config.cache.search_ttl_secs)
    }
}

/// Statistics about the retrieval coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrieverStats {
    /// Number of distinct documents in the similarity index.
    pub total_documents: usize,

    /// Number of configured sources.
    pub sources_available: usize,

    /// Number of live cache entries.
    pub cache_entries: usize,
}
