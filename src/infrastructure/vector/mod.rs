//! Vector infrastructure components
//!
//! Text chunking and the in-process vector index.

pub mod chunker;
pub mod memory_index;

pub use chunker::Chunker;
pub use memory_index::InMemoryVectorIndex;
