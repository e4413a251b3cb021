//! Port trait definitions (Hexagonal Architecture)
//!
//! Async trait interfaces that adapters implement:
//! - EmbeddingProvider: text to dense vectors
//! - VectorIndex: record storage and similarity search
//! - LanguageModel: answer generation
//! - DocumentLoader: page-delimited source text

pub mod embedding;
pub mod llm;
pub mod loader;
pub mod vector_index;

pub use embedding::{EmbeddingInput, EmbeddingOutput, EmbeddingProvider};
pub use llm::{LanguageModel, LanguageModelFactory};
pub use loader::DocumentLoader;
pub use vector_index::{NamespaceStats, QueryMatch, VectorIndex};
