//! Query-side similarity search.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::domain::errors::DomainResult;
use crate::domain::models::{IndexCoordinate, RecordMetadata, RetrievedContext, ScoredRecord};
use crate::domain::ports::VectorIndex;

pub struct Retriever {
    index: Arc<dyn VectorIndex>,
    coordinate: IndexCoordinate,
}

impl Retriever {
    pub fn new(index: Arc<dyn VectorIndex>, coordinate: IndexCoordinate) -> Self {
        Self { index, coordinate }
    }

    pub const fn coordinate(&self) -> &IndexCoordinate {
        &self.coordinate
    }

    /// Up to `k` records most similar to `query_vector`, best first.
    ///
    /// An empty or absent namespace yields an empty context.
    #[instrument(skip(self, query_vector), fields(coordinate = %self.coordinate, k))]
    pub async fn retrieve(&self, query_vector: &[f32], k: usize) -> DomainResult<RetrievedContext> {
        if k == 0 {
            return Ok(RetrievedContext::empty());
        }

        let matches = self.index.query(&self.coordinate, query_vector, k).await?;

        let mut records: Vec<ScoredRecord> = matches
            .into_iter()
            .filter_map(|m| {
                let Some(text) = m.text else {
                    warn!(id = %m.id, "skipping record without text metadata");
                    return None;
                };
                Some(ScoredRecord {
                    id: m.id,
                    score: m.score,
                    metadata: RecordMetadata {
                        text,
                        source_page: m.source_page.unwrap_or_default(),
                        source: m.source,
                    },
                })
            })
            .collect();

        records.sort_by(|a, b| b.score.total_cmp(&a.score));
        records.truncate(k);
        debug!(retrieved = records.len(), "retrieval complete");

        Ok(RetrievedContext::new(records))
    }
}
