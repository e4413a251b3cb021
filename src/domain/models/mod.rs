//! Domain models
//!
//! Plain data shared by the ingestion and query pipelines.

pub mod answer;
pub mod chunking;
pub mod config;
pub mod credential;
pub mod document;
pub mod record;
pub mod session;

pub use answer::{AnswerResult, Prompt};
pub use chunking::{chunk_id, Chunk, ChunkMetadata, ChunkingConfig, ChunkingResult};
pub use config::{
    Config, EmbeddingConfig, IndexConfig, IndexProvider, LlmConfig, LoggingConfig,
    RetrievalConfig,
};
pub use credential::ApiKey;
pub use document::{document_id_from_stem, Document, Page};
pub use record::{
    IndexCoordinate, IndexDescription, IndexMetric, IndexSpec, IndexedRecord, RecordMetadata,
    RetrievedContext, ScoredRecord,
};
pub use session::{ChatSession, Role, Turn};
