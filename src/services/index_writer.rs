//! Ingestion-side writes to the vector index.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{info, instrument, warn};

use crate::domain::errors::{DomainError, DomainResult, ProviderKind};
use crate::domain::models::{IndexCoordinate, IndexDescription, IndexSpec, IndexedRecord};
use crate::domain::ports::VectorIndex;

/// Outcome of a batched upsert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpsertReport {
    pub records: usize,
    pub batches: usize,
}

pub struct IndexWriter {
    index: Arc<dyn VectorIndex>,
    spec: IndexSpec,
    coordinate: IndexCoordinate,
    batch_size: usize,
    ready_timeout: Duration,
    poll_interval: Duration,
}

impl IndexWriter {
    pub fn new(
        index: Arc<dyn VectorIndex>,
        spec: IndexSpec,
        namespace: impl Into<String>,
        batch_size: usize,
        ready_timeout: Duration,
    ) -> Self {
        let coordinate = IndexCoordinate::new(spec.name.clone(), namespace);
        Self {
            index,
            spec,
            coordinate,
            batch_size: batch_size.max(1),
            ready_timeout,
            poll_interval: Duration::from_secs(2),
        }
    }

    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub const fn coordinate(&self) -> &IndexCoordinate {
        &self.coordinate
    }

    /// Make sure the target index exists with the configured dimension and
    /// metric, creating it if absent and waiting until it is ready
    #[instrument(skip(self), fields(index = %self.spec.name))]
    pub async fn ensure_namespace(&self) -> DomainResult<IndexDescription> {
        let description = match self.index.describe_index(&self.spec.name).await? {
            Some(existing) => {
                self.check_compatible(&existing)?;
                existing
            }
            None => {
                info!(
                    dimension = self.spec.dimension,
                    metric = %self.spec.metric,
                    "index not found, creating"
                );
                let created = self.index.create_index(&self.spec).await?;
                self.check_compatible(&created)?;
                created
            }
        };

        if description.ready {
            Ok(description)
        } else {
            self.wait_until_ready().await
        }
    }

    fn check_compatible(&self, description: &IndexDescription) -> DomainResult<()> {
        if description.dimension != self.spec.dimension {
            return Err(DomainError::DimensionMismatch {
                expected: self.spec.dimension,
                actual: description.dimension,
            });
        }
        if description.metric != self.spec.metric {
            return Err(DomainError::Configuration(format!(
                "index '{}' uses metric {}, configured metric is {}",
                description.name, description.metric, self.spec.metric
            )));
        }
        Ok(())
    }

    async fn wait_until_ready(&self) -> DomainResult<IndexDescription> {
        let deadline = Instant::now() + self.ready_timeout;
        loop {
            if let Some(description) = self.index.describe_index(&self.spec.name).await? {
                if description.ready {
                    info!("index ready");
                    return Ok(description);
                }
            }
            if Instant::now() + self.poll_interval > deadline {
                return Err(DomainError::Timeout {
                    provider: ProviderKind::VectorIndex,
                    timeout_secs: self.ready_timeout.as_secs(),
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Write records in batches, stopping at the first failed batch
    #[instrument(skip(self, records), fields(coordinate = %self.coordinate, records = records.len()))]
    pub async fn upsert(&self, records: &[IndexedRecord]) -> DomainResult<UpsertReport> {
        let mut report = UpsertReport::default();

        for (batch, chunk) in records.chunks(self.batch_size).enumerate() {
            let written = self
                .index
                .upsert(&self.coordinate, chunk)
                .await
                .map_err(|source| DomainError::BatchFailed {
                    batch,
                    first_id: chunk.first().map(|r| r.id.clone()).unwrap_or_default(),
                    last_id: chunk.last().map(|r| r.id.clone()).unwrap_or_default(),
                    source: Box::new(source),
                })?;

            if written != chunk.len() {
                warn!(batch, sent = chunk.len(), written, "index acknowledged fewer records than sent");
            }
            report.records += chunk.len();
            report.batches += 1;
        }

        info!(records = report.records, batches = report.batches, "upsert complete");
        Ok(report)
    }
}
