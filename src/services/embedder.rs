//! Embedding stage shared by ingestion and query.
//!
//! Wraps an [`EmbeddingProvider`] together with the index dimension so that
//! no vector of the wrong length ever reaches the index.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::errors::{DomainError, DomainResult, ProviderKind};
use crate::domain::models::{Chunk, IndexDescription};
use crate::domain::ports::{EmbeddingInput, EmbeddingProvider};

pub struct Embedder {
    provider: Arc<dyn EmbeddingProvider>,
    dimension: usize,
    batch_size: usize,
}

impl Embedder {
    /// Fails with `DimensionMismatch` when the provider's model does not
    /// produce vectors of the index dimension
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        dimension: usize,
        batch_size: usize,
    ) -> DomainResult<Self> {
        check_dimension(dimension, provider.dimension())?;
        Ok(Self {
            provider,
            dimension,
            batch_size: batch_size.max(1),
        })
    }

    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Compare against the dimension a live index reports
    pub fn check_index(&self, description: &IndexDescription) -> DomainResult<()> {
        check_dimension(description.dimension, self.dimension)
    }

    /// Embed a single text (the query side)
    #[instrument(skip(self, text), fields(provider = self.provider.name()))]
    pub async fn embed(&self, text: &str) -> DomainResult<Vec<f32>> {
        let vector = self.provider.embed(text).await?;
        check_dimension(self.dimension, vector.len())?;
        Ok(vector)
    }

    /// Embed chunks in batches, returning one vector per chunk in order
    #[instrument(skip(self, chunks), fields(provider = self.provider.name(), chunks = chunks.len()))]
    pub async fn embed_chunks(&self, chunks: &[Chunk]) -> DomainResult<Vec<Vec<f32>>> {
        let batch_size = self.batch_size.min(self.provider.max_batch_size().max(1));
        let mut vectors = Vec::with_capacity(chunks.len());

        for (batch_index, batch) in chunks.chunks(batch_size).enumerate() {
            let inputs: Vec<EmbeddingInput> = batch
                .iter()
                .map(|chunk| EmbeddingInput {
                    id: chunk.id.clone(),
                    text: chunk.content.clone(),
                })
                .collect();

            let outputs = self.provider.embed_batch(&inputs).await?;
            if outputs.len() != inputs.len() {
                return Err(DomainError::provider(
                    ProviderKind::Embedding,
                    format!(
                        "expected {} embeddings in batch {batch_index}, got {}",
                        inputs.len(),
                        outputs.len()
                    ),
                ));
            }

            for output in outputs {
                check_dimension(self.dimension, output.vector.len())?;
                vectors.push(output.vector);
            }
            debug!(batch = batch_index, size = batch.len(), "embedded batch");
        }

        Ok(vectors)
    }
}

fn check_dimension(expected: usize, actual: usize) -> DomainResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(DomainError::DimensionMismatch { expected, actual })
    }
}
