//! Service layer
//!
//! The ingestion and query pipelines and the stages they are built from.

pub mod embedder;
pub mod generator;
pub mod index_writer;
pub mod ingestion_service;
pub mod prompt_assembler;
pub mod rag_service;
pub mod retriever;

pub use embedder::Embedder;
pub use generator::Generator;
pub use index_writer::{IndexWriter, UpsertReport};
pub use ingestion_service::{IngestionPipeline, IngestionReport};
pub use prompt_assembler::PromptAssembler;
pub use rag_service::QueryPipeline;
pub use retriever::Retriever;
