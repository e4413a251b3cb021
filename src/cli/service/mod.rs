//! Pipeline construction from loaded configuration.
//!
//! Every command builds its collaborators here so credential and name checks
//! happen before any document is read or any provider is called.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::adapters::embeddings::{OpenAiEmbeddingConfig, OpenAiEmbeddingProvider};
use crate::adapters::llm::{OpenAiChatFactory, OpenAiChatSettings};
use crate::adapters::vector_index::{PineconeIndex, PineconeSettings};
use crate::domain::errors::DomainResult;
use crate::domain::models::{Config, IndexProvider};
use crate::domain::ports::VectorIndex;
use crate::infrastructure::vector::{Chunker, InMemoryVectorIndex};
use crate::services::{Embedder, IndexWriter, IngestionPipeline, QueryPipeline, Retriever};

/// Snapshot location for the memory provider when none is configured
pub const DEFAULT_SNAPSHOT_PATH: &str = ".docent/index.json";

/// Open the configured vector index backend
pub async fn open_index(config: &Config) -> DomainResult<Arc<dyn VectorIndex>> {
    match config.index.provider {
        IndexProvider::Pinecone => {
            let settings = PineconeSettings::from_settings(&config.index)?;
            Ok(Arc::new(PineconeIndex::new(settings)?))
        }
        IndexProvider::Memory => {
            let path = config
                .index
                .snapshot_path
                .as_ref()
                .map_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT_PATH), PathBuf::from);
            debug!(path = %path.display(), "using memory index");
            Ok(Arc::new(InMemoryVectorIndex::open(path).await?))
        }
    }
}

pub fn embedder(config: &Config) -> DomainResult<Arc<Embedder>> {
    let provider = OpenAiEmbeddingProvider::new(OpenAiEmbeddingConfig::from_settings(
        &config.embedding,
    )?)?;
    Ok(Arc::new(Embedder::new(
        Arc::new(provider),
        config.embedding.dimension,
        config.embedding.batch_size,
    )?))
}

/// Build the ingestion pipeline, optionally writing to another namespace
pub async fn ingestion_pipeline(
    config: &Config,
    namespace: Option<&str>,
) -> DomainResult<IngestionPipeline> {
    let spec = config.index.spec(config.embedding.dimension)?;
    let chunker = Chunker::new(config.chunking.clone())?;
    let embedder = embedder(config)?;
    let index = open_index(config).await?;

    let writer = IndexWriter::new(
        index,
        spec,
        namespace.unwrap_or(&config.index.namespace),
        config.index.upsert_batch_size,
        Duration::from_secs(config.index.ready_timeout_secs),
    );
    Ok(IngestionPipeline::new(chunker, embedder, writer))
}

/// Build the query pipeline; the configured LLM key becomes the fallback
/// for sessions that carry none
pub async fn query_pipeline(config: &Config) -> DomainResult<QueryPipeline> {
    let coordinate = config.index.coordinate()?;
    let embedder = embedder(config)?;
    let index = open_index(config).await?;

    let models = OpenAiChatFactory::new(OpenAiChatSettings::from(&config.llm));
    Ok(QueryPipeline::new(
        embedder,
        Retriever::new(index, coordinate),
        Arc::new(models),
        config.retrieval.top_k,
    )
    .with_fallback_key(config.llm.api_key.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::DomainError;
    use crate::domain::models::ApiKey;

    fn memory_config(dir: &tempfile::TempDir) -> Config {
        let mut config = Config::default();
        config.index.provider = IndexProvider::Memory;
        config.index.name = Some("tos-index".to_string());
        config.index.snapshot_path = Some(dir.path().join("index.json").display().to_string());
        config.embedding.api_key = ApiKey::new("sk-test-0123456789abcdef");
        config
    }

    #[tokio::test]
    async fn test_missing_index_name_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = memory_config(&dir);
        config.index.name = None;

        assert!(matches!(
            ingestion_pipeline(&config, None).await,
            Err(DomainError::Configuration(_))
        ));
        assert!(matches!(
            query_pipeline(&config).await,
            Err(DomainError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_embedding_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = memory_config(&dir);
        config.embedding.api_key = None;

        assert!(matches!(
            query_pipeline(&config).await,
            Err(DomainError::MissingCredential(_))
        ));
    }

    #[tokio::test]
    async fn test_pinecone_requires_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = memory_config(&dir);
        config.index.provider = IndexProvider::Pinecone;

        assert!(matches!(
            open_index(&config).await,
            Err(DomainError::MissingCredential(_))
        ));
    }

    #[tokio::test]
    async fn test_ingestion_namespace_override() {
        let dir = tempfile::tempdir().unwrap();
        let config = memory_config(&dir);

        let pipeline = ingestion_pipeline(&config, Some("staging")).await.unwrap();
        assert_eq!(pipeline.coordinate().namespace, "staging");
        assert_eq!(pipeline.coordinate().index_name, "tos-index");

        let query = query_pipeline(&config).await.unwrap();
        assert_eq!(query.coordinate().namespace, "rag-demo-app");
        assert_eq!(query.top_k(), 5);
    }
}
