//! Vector index records and retrieval results.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::chunking::Chunk;

/// Where a record lives: a named index plus a logical partition inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexCoordinate {
    pub index_name: String,
    pub namespace: String,
}

impl IndexCoordinate {
    pub fn new(index_name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            namespace: namespace.into(),
        }
    }
}

impl fmt::Display for IndexCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.index_name, self.namespace)
    }
}

/// Similarity metric an index is created with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexMetric {
    #[default]
    Cosine,
    Euclidean,
    Dotproduct,
}

impl fmt::Display for IndexMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cosine => write!(f, "cosine"),
            Self::Euclidean => write!(f, "euclidean"),
            Self::Dotproduct => write!(f, "dotproduct"),
        }
    }
}

/// Parameters used when an index has to be created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    pub name: String,
    pub dimension: usize,
    pub metric: IndexMetric,
    /// Serverless cloud, e.g. "aws"
    pub cloud: String,
    /// Serverless region, e.g. "us-east-1"
    pub region: String,
}

/// What the index service reports about an existing index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescription {
    pub name: String,
    pub dimension: usize,
    pub metric: IndexMetric,
    /// Data-plane host, when the service exposes one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    pub ready: bool,
}

/// Metadata stored alongside every vector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Chunk text, returned verbatim at query time
    pub text: String,

    /// Page the chunk came from
    pub source_page: usize,

    /// Origin of the document (file path)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// One `(id, vector, metadata)` triple written to the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedRecord {
    pub id: String,
    pub vector: Vec<f32>,
    pub metadata: RecordMetadata,
}

impl IndexedRecord {
    /// Pair a chunk with its embedding
    pub fn from_chunk(chunk: &Chunk, vector: Vec<f32>, source: Option<&str>) -> Self {
        Self {
            id: chunk.id.clone(),
            vector,
            metadata: RecordMetadata {
                text: chunk.content.clone(),
                source_page: chunk.source_page,
                source: source.map(str::to_string),
            },
        }
    }
}

/// A record returned by similarity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub id: String,

    /// Similarity to the query vector (higher is closer)
    pub score: f32,

    pub metadata: RecordMetadata,
}

/// Records retrieved for one query, most similar first.
///
/// Order determines position in the prompt. An empty context is a valid
/// state meaning no grounding is available.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievedContext {
    records: Vec<ScoredRecord>,
}

impl RetrievedContext {
    pub const fn new(records: Vec<ScoredRecord>) -> Self {
        Self { records }
    }

    pub const fn empty() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub fn records(&self) -> &[ScoredRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn top(&self) -> Option<&ScoredRecord> {
        self.records.first()
    }

    /// Chunk texts in rank order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.metadata.text.as_str())
    }

    /// Distinct source pages in rank order
    pub fn source_pages(&self) -> Vec<usize> {
        let mut pages = Vec::new();
        for record in &self.records {
            if !pages.contains(&record.metadata.source_page) {
                pages.push(record.metadata.source_page);
            }
        }
        pages
    }
}

impl IntoIterator for RetrievedContext {
    type Item = ScoredRecord;
    type IntoIter = std::vec::IntoIter<ScoredRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
