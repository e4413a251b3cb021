//! OpenAI embedding provider adapter.
//!
//! Calls the `/v1/embeddings` endpoint. Compatible with any OpenAI-compatible
//! embedding API (e.g., Azure OpenAI, local servers).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::adapters::http;
use crate::domain::errors::{DomainError, DomainResult, ProviderKind};
use crate::domain::models::{ApiKey, EmbeddingConfig};
use crate::domain::ports::embedding::{EmbeddingInput, EmbeddingOutput, EmbeddingProvider};

const PROVIDER: ProviderKind = ProviderKind::Embedding;

/// Configuration for the OpenAI embedding provider.
#[derive(Debug, Clone)]
pub struct OpenAiEmbeddingConfig {
    pub api_key: ApiKey,
    /// Base URL for the API. Default: `https://api.openai.com/v1`.
    pub base_url: String,
    /// Embedding model. Default: `text-embedding-3-small`.
    pub model: String,
    /// Expected embedding dimension. Default: 1536.
    pub dimension: usize,
    /// Request timeout in seconds. Default: 30.
    pub timeout_secs: u64,
    /// Maximum texts per single API request.
    pub max_batch_size: usize,
}

impl OpenAiEmbeddingConfig {
    /// API limit on inputs per request
    pub const MAX_INPUTS: usize = 2048;

    pub fn from_settings(settings: &EmbeddingConfig) -> DomainResult<Self> {
        Ok(Self {
            api_key: settings.require_api_key()?.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            dimension: settings.dimension,
            timeout_secs: settings.timeout_secs,
            max_batch_size: Self::MAX_INPUTS,
        })
    }
}

/// OpenAI embedding provider.
pub struct OpenAiEmbeddingProvider {
    config: OpenAiEmbeddingConfig,
    client: Client,
}

impl OpenAiEmbeddingProvider {
    pub fn new(config: OpenAiEmbeddingConfig) -> DomainResult<Self> {
        let client = http::build_client(PROVIDER, config.timeout_secs)?;
        Ok(Self { config, client })
    }

    #[instrument(skip(self, texts), fields(model = %self.config.model, count = texts.len()))]
    async fn call_embeddings_api(&self, texts: Vec<String>) -> DomainResult<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.config.base_url);
        let expected = texts.len();

        let request_body = EmbeddingsRequest {
            model: &self.config.model,
            input: texts,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.config.api_key.expose())
            .json(&request_body)
            .send()
            .await
            .map_err(|e| http::send_error(PROVIDER, self.config.timeout_secs, &e))?;

        if !response.status().is_success() {
            return Err(http::status_error(PROVIDER, "Embedding API", response).await);
        }

        let result: EmbeddingsResponse = http::decode(PROVIDER, "embedding", response).await?;

        if result.data.len() != expected {
            return Err(DomainError::provider(
                PROVIDER,
                format!(
                    "Embedding API returned {} vectors for {expected} inputs",
                    result.data.len()
                ),
            ));
        }

        // Sort by index to maintain input order
        let mut data = result.data;
        data.sort_by_key(|d| d.index);
        debug!(vectors = data.len(), "embeddings received");

        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    async fn embed(&self, text: &str) -> DomainResult<Vec<f32>> {
        let results = self.call_embeddings_api(vec![text.to_string()]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::provider(PROVIDER, "Empty embedding response"))
    }

    async fn embed_batch(&self, inputs: &[EmbeddingInput]) -> DomainResult<Vec<EmbeddingOutput>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let mut all_outputs = Vec::with_capacity(inputs.len());

        for batch in inputs.chunks(self.config.max_batch_size.max(1)) {
            let texts = batch.iter().map(|i| i.text.clone()).collect();
            let vectors = self.call_embeddings_api(texts).await?;

            all_outputs.extend(batch.iter().zip(vectors).map(|(input, vector)| EmbeddingOutput {
                id: input.id.clone(),
                vector,
            }));
        }

        Ok(all_outputs)
    }

    fn max_batch_size(&self) -> usize {
        self.config.max_batch_size
    }
}

// -- OpenAI API request/response types --

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}
