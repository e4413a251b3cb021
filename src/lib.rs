//! Docent - question answering over a reference document
//!
//! Docent ingests a document into a vector index and answers questions about
//! it by retrieving the most similar chunks and asking a language model to
//! answer from them alone.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, errors, and the provider ports
//! - **Service Layer** (`services`): The ingestion and query pipelines
//! - **Adapters** (`adapters`): OpenAI, Pinecone, and document loaders
//! - **Infrastructure Layer** (`infrastructure`): Configuration, logging, chunking
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use docent::cli::service;
//! use docent::domain::models::ChatSession;
//! use docent::infrastructure::config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     let pipeline = service::query_pipeline(&config).await?;
//!     let mut session = ChatSession::new();
//!     let result = pipeline.answer(&mut session, "What is the minimum age?").await?;
//!     println!("{}", result.answer);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    AnswerResult, ApiKey, ChatSession, Chunk, ChunkingConfig, Config, Document, IndexCoordinate,
    LoggingConfig, Page, RetrievedContext,
};
pub use domain::ports::{DocumentLoader, EmbeddingProvider, LanguageModel, VectorIndex};
pub use domain::{DomainError, DomainResult, ErrorKind};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{IngestionPipeline, QueryPipeline};
