//! Vector index port.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::errors::DomainResult;
use crate::domain::models::{IndexCoordinate, IndexDescription, IndexSpec, IndexedRecord};

/// A raw similarity-search hit as stored by the index.
///
/// Metadata fields are optional because an index may hold records written by
/// other tools; the retriever decides what to do with incomplete ones.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryMatch {
    pub id: String,
    pub score: f32,
    pub text: Option<String>,
    pub source_page: Option<usize>,
    pub source: Option<String>,
}

/// Record count of one namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamespaceStats {
    pub namespace: String,
    pub record_count: usize,
}

/// Storage and similarity search for embedded chunks.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Backend name (e.g., "pinecone", "memory").
    fn name(&self) -> &'static str;

    /// Describe an index, `None` when it does not exist.
    async fn describe_index(&self, name: &str) -> DomainResult<Option<IndexDescription>>;

    /// Create the index described by `spec`.
    ///
    /// Creating an index that already exists is not an error; the returned
    /// description is whatever the service reports afterwards.
    async fn create_index(&self, spec: &IndexSpec) -> DomainResult<IndexDescription>;

    /// Insert or overwrite records by id. Returns the number written.
    async fn upsert(
        &self,
        coordinate: &IndexCoordinate,
        records: &[IndexedRecord],
    ) -> DomainResult<usize>;

    /// Return up to `top_k` matches, most similar first.
    ///
    /// An empty or absent namespace yields an empty vector.
    async fn query(
        &self,
        coordinate: &IndexCoordinate,
        vector: &[f32],
        top_k: usize,
    ) -> DomainResult<Vec<QueryMatch>>;

    /// Per-namespace record counts for an index.
    async fn namespace_stats(&self, index_name: &str) -> DomainResult<Vec<NamespaceStats>>;
}
