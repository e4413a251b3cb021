//! Ingestion pipeline: Loader output -> Chunker -> Embedder -> IndexWriter.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};

use super::embedder::Embedder;
use super::index_writer::IndexWriter;
use crate::domain::errors::DomainResult;
use crate::domain::models::{Document, IndexCoordinate, IndexedRecord};
use crate::infrastructure::vector::Chunker;

/// Summary of one ingestion run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestionReport {
    pub document_id: String,
    pub coordinate: IndexCoordinate,
    pub pages: usize,
    pub skipped_pages: Vec<usize>,
    pub chunks: usize,
    pub oversized_chunks: usize,
    pub records_upserted: usize,
    pub batches: usize,
}

pub struct IngestionPipeline {
    chunker: Chunker,
    embedder: Arc<Embedder>,
    writer: IndexWriter,
}

impl IngestionPipeline {
    pub fn new(chunker: Chunker, embedder: Arc<Embedder>, writer: IndexWriter) -> Self {
        Self {
            chunker,
            embedder,
            writer,
        }
    }

    pub const fn coordinate(&self) -> &IndexCoordinate {
        self.writer.coordinate()
    }

    /// Index a loaded document.
    ///
    /// Chunk ids are deterministic, so running this twice over the same
    /// document overwrites the same records instead of duplicating them.
    #[instrument(skip(self, document), fields(document_id = %document.id, coordinate = %self.writer.coordinate()))]
    pub async fn run(&self, document: &Document) -> DomainResult<IngestionReport> {
        let chunking = self.chunker.chunk(document);
        info!(
            pages = document.page_count(),
            chunks = chunking.total_chunks(),
            skipped = chunking.skipped_pages.len(),
            "document chunked"
        );

        // Every vector is length-checked before the index is touched
        let vectors = self.embedder.embed_chunks(&chunking.chunks).await?;

        let description = self.writer.ensure_namespace().await?;
        self.embedder.check_index(&description)?;

        let records: Vec<IndexedRecord> = chunking
            .chunks
            .iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexedRecord::from_chunk(chunk, vector, Some(&document.source)))
            .collect();

        let upsert = self.writer.upsert(&records).await?;

        Ok(IngestionReport {
            document_id: document.id.clone(),
            coordinate: self.writer.coordinate().clone(),
            pages: document.page_count(),
            skipped_pages: chunking.skipped_pages.clone(),
            chunks: chunking.total_chunks(),
            oversized_chunks: chunking.oversized_chunks(),
            records_upserted: upsert.records,
            batches: upsert.batches,
        })
    }
}
