//! Text chunking domain models
//!
//! Models for splitting document pages into retrieval-sized chunks.
//! Chunk ids are derived from the document id and the chunk's position, so
//! re-chunking the same document always yields the same ids.

use serde::{Deserialize, Serialize};

/// Separators tried in order when a page must be split further
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

/// Configuration for document chunking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ChunkingConfig {
    /// Target maximum size of each chunk in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters of preceding text repeated at the start of each
    /// non-first chunk of a page
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Split points in preference order (paragraph, line, sentence, word)
    #[serde(default = "default_separators")]
    pub separators: Vec<String>,
}

const fn default_chunk_size() -> usize {
    4000
}

const fn default_chunk_overlap() -> usize {
    200
}

fn default_separators() -> Vec<String> {
    DEFAULT_SEPARATORS.iter().map(|s| (*s).to_string()).collect()
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            separators: default_separators(),
        }
    }
}

impl ChunkingConfig {
    /// Configuration with the given size and no overlap
    pub fn without_overlap(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap: 0,
            separators: default_separators(),
        }
    }

    /// Validate the chunking configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("chunk_size must be greater than 0".to_string());
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err("chunk_overlap must be less than chunk_size".to_string());
        }

        if self.separators.iter().any(String::is_empty) {
            return Err("separators cannot contain an empty string".to_string());
        }

        Ok(())
    }
}

/// A chunk of text extracted from one document page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Stable identifier: `{document_id}:page:{page}:offset:{span_start}`
    pub id: String,

    /// ID of the parent document
    pub document_id: String,

    /// The text content of this chunk
    pub content: String,

    /// Page the chunk was cut from (1-based)
    pub source_page: usize,

    /// Index of this chunk within the whole document (0-based)
    pub chunk_index: usize,

    /// Metadata about this chunk
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(
        document_id: &str,
        content: String,
        source_page: usize,
        chunk_index: usize,
        metadata: ChunkMetadata,
    ) -> Self {
        Self {
            id: chunk_id(document_id, source_page, metadata.span_start),
            document_id: document_id.to_string(),
            content,
            source_page,
            chunk_index,
            metadata,
        }
    }

    /// Returns true if this is the first chunk of the document
    pub const fn is_first(&self) -> bool {
        self.chunk_index == 0
    }

    /// Number of characters in the chunk
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    /// Get a preview of the content (first 100 chars)
    pub fn preview(&self) -> String {
        match self.content.char_indices().nth(100) {
            None => self.content.clone(),
            Some((pos, _)) => format!("{}...", &self.content[..pos]),
        }
    }
}

/// Build the deterministic id of a chunk
pub fn chunk_id(document_id: &str, source_page: usize, start_offset: usize) -> String {
    format!("{document_id}:page:{source_page}:offset:{start_offset}")
}

/// Position of a chunk within its page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Byte offset of the chunk start within the page text
    pub start_offset: usize,

    /// Byte offset one past the chunk end within the page text
    pub end_offset: usize,

    /// Byte offset where the chunk's own span begins, after any overlap
    /// borrowed from the previous chunk
    pub span_start: usize,

    /// Whether the chunk exceeds the configured size because no separator
    /// could split it further
    pub oversized: bool,
}

impl ChunkMetadata {
    /// Create metadata with offsets
    pub const fn with_offsets(start: usize, end: usize) -> Self {
        Self {
            start_offset: start,
            end_offset: end,
            span_start: start,
            oversized: false,
        }
    }

    /// Mark as exceeding the configured chunk size
    #[must_use]
    pub const fn mark_oversized(mut self) -> Self {
        self.oversized = true;
        self
    }
}

/// Result of a chunking operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingResult {
    /// The chunks created
    pub chunks: Vec<Chunk>,

    /// Pages that produced no chunk because they held no text
    pub skipped_pages: Vec<usize>,

    /// Original document size in characters
    pub original_size: usize,
}

impl ChunkingResult {
    /// Create a new chunking result
    pub const fn new(chunks: Vec<Chunk>, skipped_pages: Vec<usize>, original_size: usize) -> Self {
        Self {
            chunks,
            skipped_pages,
            original_size,
        }
    }

    pub fn total_chunks(&self) -> usize {
        self.chunks.len()
    }

    pub fn oversized_chunks(&self) -> usize {
        self.chunks.iter().filter(|c| c.metadata.oversized).count()
    }

    /// Calculate the average chunk size in characters
    pub fn average_chunk_size(&self) -> f64 {
        if self.chunks.is_empty() {
            0.0
        } else {
            let total: usize = self.chunks.iter().map(Chunk::char_count).sum();
            total as f64 / self.chunks.len() as f64
        }
    }
}
