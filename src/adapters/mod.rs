//! Infrastructure adapters for external systems.

pub mod embeddings;
pub mod http;
pub mod llm;
pub mod loaders;
pub mod vector_index;
