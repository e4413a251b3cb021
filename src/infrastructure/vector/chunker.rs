//! Recursive character chunker
//!
//! Splits each page on the configured separators in preference order,
//! keeping separators attached to the preceding piece, then merges adjacent
//! pieces greedily up to `chunk_size` characters. Offsets are byte offsets
//! into the page text.

use tracing::{debug, info, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Chunk, ChunkMetadata, ChunkingConfig, ChunkingResult, Document, Page};

/// A contiguous byte range of page text and its length in characters
#[derive(Debug, Clone, Copy)]
struct Piece {
    start: usize,
    end: usize,
    chars: usize,
}

/// Page-aware text chunker
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    /// Create a chunker, rejecting invalid configuration
    pub fn new(config: ChunkingConfig) -> DomainResult<Self> {
        config
            .validate()
            .map_err(|e| DomainError::Configuration(format!("Invalid chunking config: {e}")))?;
        Ok(Self { config })
    }

    pub const fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Chunk every page of a document
    ///
    /// Blank pages produce no chunk; every other page produces at least one.
    pub fn chunk(&self, document: &Document) -> ChunkingResult {
        let mut chunks = Vec::new();
        let mut skipped_pages = Vec::new();

        for page in &document.pages {
            if page.is_blank() {
                info!(
                    document_id = %document.id,
                    page = page.number,
                    "skipping page with no text"
                );
                skipped_pages.push(page.number);
                continue;
            }
            let page_chunks = self.chunk_page(&document.id, page, chunks.len());
            debug!(page = page.number, chunks = page_chunks.len(), "page chunked");
            chunks.extend(page_chunks);
        }

        ChunkingResult::new(chunks, skipped_pages, document.char_count())
    }

    /// Chunk a single page; `first_index` is the document-wide index of the
    /// first chunk produced
    pub fn chunk_page(&self, document_id: &str, page: &Page, first_index: usize) -> Vec<Chunk> {
        let text = page.text.as_str();
        if text.is_empty() {
            return Vec::new();
        }

        let mut pieces = Vec::new();
        self.split_recursive(text, 0, text.len(), &self.config.separators, &mut pieces);
        let spans = self.merge(pieces);

        let mut chunks = Vec::with_capacity(spans.len());
        let mut previous_span_start = None;

        for (offset, span) in spans.iter().enumerate() {
            let start = match previous_span_start {
                Some(floor) => overlap_start(text, span.start, floor, self.config.chunk_overlap),
                None => span.start,
            };

            let mut metadata = ChunkMetadata {
                span_start: span.start,
                ..ChunkMetadata::with_offsets(start, span.end)
            };
            if span.chars > self.config.chunk_size {
                metadata = metadata.mark_oversized();
            }

            let chunk = Chunk::new(
                document_id,
                text[start..span.end].to_string(),
                page.number,
                first_index + offset,
                metadata,
            );
            if metadata.oversized {
                warn!(
                    chunk_id = %chunk.id,
                    chars = span.chars,
                    chunk_size = self.config.chunk_size,
                    "no separator splits this span; emitting oversized chunk"
                );
            }

            previous_span_start = Some(span.start);
            chunks.push(chunk);
        }

        chunks
    }

    fn split_recursive(
        &self,
        text: &str,
        start: usize,
        end: usize,
        separators: &[String],
        out: &mut Vec<Piece>,
    ) {
        let slice = &text[start..end];
        let chars = slice.chars().count();
        if chars <= self.config.chunk_size {
            out.push(Piece { start, end, chars });
            return;
        }

        for (i, separator) in separators.iter().enumerate() {
            let bounds = split_keeping_separator(slice, separator);
            if bounds.len() > 1 {
                for (a, b) in bounds {
                    self.split_recursive(text, start + a, start + b, &separators[i + 1..], out);
                }
                return;
            }
        }

        out.push(Piece { start, end, chars });
    }

    fn merge(&self, pieces: Vec<Piece>) -> Vec<Piece> {
        let mut merged = Vec::new();
        let mut current: Option<Piece> = None;

        for piece in pieces {
            current = match current {
                Some(cur) if cur.chars + piece.chars <= self.config.chunk_size => Some(Piece {
                    start: cur.start,
                    end: piece.end,
                    chars: cur.chars + piece.chars,
                }),
                Some(cur) => {
                    merged.push(cur);
                    Some(piece)
                }
                None => Some(piece),
            };
        }

        merged.extend(current);
        merged
    }
}

/// Split `slice` after every occurrence of `separator`
fn split_keeping_separator(slice: &str, separator: &str) -> Vec<(usize, usize)> {
    let mut bounds = Vec::new();
    let mut last = 0;
    for (idx, _) in slice.match_indices(separator) {
        let end = idx + separator.len();
        bounds.push((last, end));
        last = end;
    }
    if last < slice.len() {
        bounds.push((last, slice.len()));
    }
    bounds
}

/// Where a chunk starting at `span_start` begins once overlap is applied.
///
/// Walks back up to `overlap` characters without crossing `floor`, then
/// moves forward to the next word boundary. Returns `span_start` when no
/// boundary exists in that window.
fn overlap_start(text: &str, span_start: usize, floor: usize, overlap: usize) -> usize {
    if overlap == 0 || span_start <= floor {
        return span_start;
    }

    let window = &text[floor..span_start];
    let candidate = window
        .char_indices()
        .rev()
        .take(overlap)
        .last()
        .map_or(span_start, |(idx, _)| floor + idx);

    let at_boundary = candidate == 0
        || text[..candidate]
            .chars()
            .next_back()
            .is_some_and(char::is_whitespace);
    if at_boundary {
        return candidate;
    }

    text[candidate..span_start]
        .char_indices()
        .find(|(_, c)| c.is_whitespace())
        .map_or(span_start, |(idx, c)| candidate + idx + c.len_utf8())
}
