//! Chunk-level similarity index.
//!
//! Documents are chunked, each chunk embedded and stored tagged with its
//! owning document id and position. A query retrieves the nearest chunks,
//! regroups them by owning document, and scores each document by its best
//! (minimum-distance) chunk. The returned "document" is a partial
//! reconstruction: its content is the matching chunks joined together, not
//! the original full text. That trade is deliberate; callers needing full
//! text fetch by id.

use std::collections::HashMap;
use std::sync::Arc;

use ordered_float::OrderedFloat;
use tokio::sync::RwLock;
use tracing::{debug, info};

use corpus_sources::{ContentType, Document, DocumentMetadata};

use crate::Embedding;
use crate::chunker::Chunker;
use crate::error::Result;
use crate::provider::EmbeddingProvider;
use crate::similarity::cosine_distance;

/// One embedded chunk of an indexed document.
struct ChunkRecord {
    /// Position of the chunk in the document.
    chunk_index: usize,

    /// Chunk text.
    text: String,

    /// Chunk embedding.
    embedding: Embedding,
}

/// All indexed state for one document.
struct DocumentRecords {
    title: String,
    source: String,
    content_type: ContentType,
    chunks: Vec<ChunkRecord>,
}

/// Chunk-level similarity index shared across coordinator instances.
///
/// Writes are idempotent upserts keyed by document id (re-indexing a
/// document replaces its chunk records), so concurrent writers race safely
/// with last-write-wins semantics. The index is a best-effort accelerator,
/// not a source of truth.
pub struct SimilarityIndex {
    /// Embedding provider for chunks and queries.
    provider: Arc<dyn EmbeddingProvider>,

    /// Word-window chunker.
    chunker: Chunker,

    /// Minimum similarity score for a result to be returned.
    min_score: f32,

    /// Indexed chunk records, keyed by owning document id.
    records: RwLock<HashMap<String, DocumentRecords>>,
}

impl SimilarityIndex {
    /// Create an index over the given provider and chunker.
    pub fn new(provider: Arc<dyn EmbeddingProvider>, chunker: Chunker) -> Self {
        Self {
            provider,
            chunker,
            min_score: 0.0,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Set the minimum similarity score for search results.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    /// Chunk, embed, and store a document.
    ///
    /// Replaces any chunk records previously stored for the same document
    /// id, and fills in `document.chunks` as a side effect. A document whose
    /// content yields no chunks is removed from the index.
    pub async fn add_document(&self, document: &mut Document) -> Result<()> {
        let doc_id = document.metadata.id.clone();

        let chunks = self.chunker.chunk(&document.content);
        document.chunks = chunks.clone();

        if chunks.is_empty() {
            debug!("document {doc_id} has no chunkable content, removing from index");
            self.records.write().await.remove(&doc_id);
            return Ok(());
        }

        let embeddings = self.provider.embed_batch(&chunks).await?;

        let chunk_records = chunks
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(chunk_index, (text, embedding))| ChunkRecord {
                chunk_index,
                text,
                embedding,
            })
            .collect();

        let record = DocumentRecords {
            title: document.metadata.title.clone(),
            source: document.metadata.source.clone(),
            content_type: document.metadata.content_type,
            chunks: chunk_records,
        };

        let mut records = self.records.write().await;
        let chunk_count = record.chunks.len();
        records.insert(doc_id.clone(), record);

        info!("indexed document {doc_id} with {chunk_count} chunks");
        Ok(())
    }

    /// Search for documents similar to the query.
    ///
    /// Embeds the query, ranks the nearest `limit` chunks, regroups them by
    /// owning document, and scores each document by its best chunk
    /// (`similarity = 1 - distance`). Results are sorted descending by
    /// score and truncated to `limit`.
    pub async fn search_similar(&self, query: &str, limit: usize) -> Result<Vec<(Document, f32)>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.provider.embed(query).await?;
        if query_embedding.iter().all(|x| *x == 0.0) {
            // Nothing to compare against: the query had no usable tokens.
            return Ok(Vec::new());
        }

        let records = self.records.read().await;

        // Rank individual chunks first, nearest across the whole index.
        let mut matches: Vec<(&str, &DocumentRecords, &ChunkRecord, f32)> = Vec::new();
        for (doc_id, doc_records) in records.iter() {
            for chunk in &doc_records.chunks {
                let distance = cosine_distance(&query_embedding, &chunk.embedding)?;
                matches.push((doc_id.as_str(), doc_records, chunk, distance));
            }
        }
        matches.sort_by_key(|(_, _, _, distance)| OrderedFloat(*distance));
        matches.truncate(limit);

        // Regroup by owning document; a document may contribute several
        // chunks to one query. The best (minimum-distance) chunk sets the
        // document's score.
        let mut order: Vec<&str> = Vec::new();
        let mut grouped: HashMap<&str, (&DocumentRecords, Vec<&ChunkRecord>, f32)> = HashMap::new();
        for (doc_id, doc_records, chunk, distance) in matches {
            let entry = grouped
                .entry(doc_id)
                .or_insert_with(|| {
                    order.push(doc_id);
                    (doc_records, Vec::new(), distance)
                });
            entry.1.push(chunk);
            entry.2 = entry.2.min(distance);
        }

        let mut results: Vec<(Document, f32)> = Vec::with_capacity(order.len());
        for doc_id in order {
            let Some((doc_records, mut chunks, min_distance)) = grouped.remove(doc_id) else {
                continue;
            };
            chunks.sort_by_key(|c| c.chunk_index);

            let score = 1.0 - min_distance;
            if score < self.min_score {
                continue;
            }

            let chunk_texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
            let metadata = DocumentMetadata::new(
                doc_id,
                doc_records.title.clone(),
                doc_records.source.clone(),
                doc_records.content_type,
            );
            let mut document = Document::new(metadata, chunk_texts.join("\n\n"));
            document.chunks = chunk_texts;

            results.push((document, score));
        }

        results.sort_by_key(|(_, score)| std::cmp::Reverse(OrderedFloat(*score)));
        results.truncate(limit);

        Ok(results)
    }

    /// Number of distinct documents currently indexed.
    pub async fn document_count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Drop all indexed records.
    pub async fn clear(&self) {
        self.records.write().await.clear();
        info!("cleared similarity index");
    }
}
