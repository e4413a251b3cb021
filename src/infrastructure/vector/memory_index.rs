//! In-process vector index
//!
//! Brute-force similarity search over records held in memory. With a
//! snapshot path the whole state is persisted as JSON after every mutation,
//! which makes offline ingestion followed by `docent ask` possible without a
//! hosted index.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::errors::{DomainError, DomainResult, ProviderKind};
use crate::domain::models::{
    IndexCoordinate, IndexDescription, IndexMetric, IndexSpec, IndexedRecord,
};
use crate::domain::ports::{NamespaceStats, QueryMatch, VectorIndex};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredIndex {
    description: Option<IndexDescription>,
    namespaces: BTreeMap<String, BTreeMap<String, IndexedRecord>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Snapshot {
    indexes: BTreeMap<String, StoredIndex>,
}

/// Vector index held in process memory
#[derive(Debug, Default)]
pub struct InMemoryVectorIndex {
    state: RwLock<Snapshot>,
    snapshot_path: Option<PathBuf>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an index persisted at `path`, starting empty if the file is absent
    pub async fn open(path: impl Into<PathBuf>) -> DomainResult<Self> {
        let path = path.into();
        let state = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Snapshot::default(),
            Err(e) => {
                return Err(DomainError::provider(
                    ProviderKind::VectorIndex,
                    format!("failed to read snapshot {}: {e}", path.display()),
                ))
            }
        };
        debug!(path = %path.display(), indexes = state.indexes.len(), "opened memory index");
        Ok(Self {
            state: RwLock::new(state),
            snapshot_path: Some(path),
        })
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    async fn persist(&self, state: &Snapshot) -> DomainResult<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };
        let write_err = |e: std::io::Error| {
            DomainError::provider(
                ProviderKind::VectorIndex,
                format!("failed to write snapshot {}: {e}", path.display()),
            )
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
        let bytes = serde_json::to_vec(state)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await.map_err(write_err)?;
        tokio::fs::rename(&tmp, path).await.map_err(write_err)
    }
}

fn not_found(name: &str) -> DomainError {
    DomainError::provider(ProviderKind::VectorIndex, format!("index '{name}' not found"))
}

/// Similarity under `metric`; higher is always closer
pub fn similarity(metric: IndexMetric, a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    match metric {
        IndexMetric::Dotproduct => dot,
        IndexMetric::Cosine => {
            let mag_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
            let mag_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
            if mag_a == 0.0 || mag_b == 0.0 {
                0.0
            } else {
                dot / (mag_a * mag_b)
            }
        }
        IndexMetric::Euclidean => {
            let distance = a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y).powi(2))
                .sum::<f32>()
                .sqrt();
            -distance
        }
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn describe_index(&self, name: &str) -> DomainResult<Option<IndexDescription>> {
        let state = self.state.read().await;
        Ok(state
            .indexes
            .get(name)
            .and_then(|index| index.description.clone()))
    }

    async fn create_index(&self, spec: &IndexSpec) -> DomainResult<IndexDescription> {
        let mut state = self.state.write().await;
        let index = state.indexes.entry(spec.name.clone()).or_default();
        let description = index
            .description
            .get_or_insert_with(|| IndexDescription {
                name: spec.name.clone(),
                dimension: spec.dimension,
                metric: spec.metric,
                host: None,
                ready: true,
            })
            .clone();
        self.persist(&state).await?;
        Ok(description)
    }

    async fn upsert(
        &self,
        coordinate: &IndexCoordinate,
        records: &[IndexedRecord],
    ) -> DomainResult<usize> {
        let mut state = self.state.write().await;
        let index = state
            .indexes
            .get_mut(&coordinate.index_name)
            .filter(|index| index.description.is_some())
            .ok_or_else(|| not_found(&coordinate.index_name))?;
        let dimension = index.description.as_ref().map_or(0, |d| d.dimension);

        if let Some(bad) = records.iter().find(|r| r.vector.len() != dimension) {
            return Err(DomainError::provider(
                ProviderKind::VectorIndex,
                format!(
                    "record {} has dimension {}, index expects {dimension}",
                    bad.id,
                    bad.vector.len()
                ),
            ));
        }

        let namespace = index
            .namespaces
            .entry(coordinate.namespace.clone())
            .or_default();
        for record in records {
            namespace.insert(record.id.clone(), record.clone());
        }

        self.persist(&state).await?;
        Ok(records.len())
    }

    async fn query(
        &self,
        coordinate: &IndexCoordinate,
        vector: &[f32],
        top_k: usize,
    ) -> DomainResult<Vec<QueryMatch>> {
        let state = self.state.read().await;
        let index = state
            .indexes
            .get(&coordinate.index_name)
            .filter(|index| index.description.is_some())
            .ok_or_else(|| not_found(&coordinate.index_name))?;
        let metric = index
            .description
            .as_ref()
            .map_or(IndexMetric::Cosine, |d| d.metric);

        let Some(namespace) = index.namespaces.get(&coordinate.namespace) else {
            return Ok(Vec::new());
        };

        let mut matches: Vec<QueryMatch> = namespace
            .values()
            .map(|record| QueryMatch {
                id: record.id.clone(),
                score: similarity(metric, vector, &record.vector),
                text: Some(record.metadata.text.clone()),
                source_page: Some(record.metadata.source_page),
                source: record.metadata.source.clone(),
            })
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        matches.truncate(top_k);
        Ok(matches)
    }

    async fn namespace_stats(&self, index_name: &str) -> DomainResult<Vec<NamespaceStats>> {
        let state = self.state.read().await;
        let index = state
            .indexes
            .get(index_name)
            .ok_or_else(|| not_found(index_name))?;
        Ok(index
            .namespaces
            .iter()
            .map(|(namespace, records)| NamespaceStats {
                namespace: namespace.clone(),
                record_count: records.len(),
            })
            .collect())
    }
}
