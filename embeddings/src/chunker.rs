//! Word-window chunking for embedding.
//!
//! Documents are split into overlapping fixed-size word-count windows. The
//! window is the unit of embedding and nearest-neighbor search; the overlap
//! keeps phrases that straddle a window boundary findable from both sides.

use crate::error::{EmbeddingError, Result};

/// Splits text into overlapping word-count windows.
#[derive(Debug, Clone)]
pub struct Chunker {
    /// Words per chunk.
    chunk_size: usize,

    /// Words shared between consecutive chunks. Always less than `chunk_size`.
    overlap: usize,
}

impl Chunker {
    /// Default words per chunk.
    pub const DEFAULT_CHUNK_SIZE: usize = 500;

    /// Default overlap between consecutive chunks.
    pub const DEFAULT_OVERLAP: usize = 50;

    /// Create a chunker.
    ///
    /// Fails when `chunk_size` is zero or `overlap >= chunk_size` (the
    /// window would never advance).
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(EmbeddingError::InvalidChunking(
                "chunk size must be non-zero".to_string(),
            ));
        }
        if overlap >= chunk_size {
            return Err(EmbeddingError::InvalidChunking(format!(
                "overlap {overlap} must be less than chunk size {chunk_size}"
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Words per chunk.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Words shared between consecutive chunks.
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split text into overlapping word windows.
    ///
    /// Empty or whitespace-only input yields no chunks.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return Vec::new();
        }

        let step = self.chunk_size - self.overlap;
        let mut chunks = Vec::new();
        let mut start = 0;
        loop {
            let end = (start + self.chunk_size).min(words.len());
            chunks.push(words[start..end].join(" "));
            if start + self.chunk_size >= words.len() {
                break;
            }
            start += step;
        }

        chunks
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
            overlap: Self::DEFAULT_OVERLAP,
        }
    }
}
