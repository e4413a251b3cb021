use serde::{Deserialize, Serialize};

use super::chunking::ChunkingConfig;
use super::credential::ApiKey;
use super::record::{IndexCoordinate, IndexMetric, IndexSpec};
use crate::domain::errors::{DomainError, DomainResult};

/// Main configuration structure for Docent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Embedding provider configuration (shared by ingestion and query)
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Answer-generation model configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Vector index configuration
    #[serde(default)]
    pub index: IndexConfig,

    /// Query-time retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Document chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Embedding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EmbeddingConfig {
    /// Embedding model; must be the same at ingestion and query time
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Vector dimension the index is created with
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// OpenAI-compatible API base URL
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    /// API key (can also be set via `OPENAI_API_KEY`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<ApiKey>,

    /// Texts per embedding request during ingestion
    #[serde(default = "default_embedding_batch_size")]
    pub batch_size: usize,

    /// Request timeout in seconds
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

const fn default_dimension() -> usize {
    1536
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

const fn default_embedding_batch_size() -> usize {
    100
}

const fn default_embedding_timeout() -> u64 {
    30
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            dimension: default_dimension(),
            base_url: default_openai_base_url(),
            api_key: None,
            batch_size: default_embedding_batch_size(),
            timeout_secs: default_embedding_timeout(),
        }
    }
}

impl EmbeddingConfig {
    pub fn require_api_key(&self) -> DomainResult<&ApiKey> {
        self.api_key.as_ref().ok_or_else(|| {
            DomainError::MissingCredential(
                "embedding API key not set. Set OPENAI_API_KEY or embedding.api_key".to_string(),
            )
        })
    }
}

/// Answer-generation model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LlmConfig {
    /// Chat model to call
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Optional cap on generated tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// OpenAI-compatible API base URL
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    /// API key; when absent the caller must supply one per session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<ApiKey>,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_llm_model() -> String {
    "gpt-4".to_string()
}

const fn default_temperature() -> f32 {
    0.5
}

const fn default_llm_timeout() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_llm_model(),
            temperature: default_temperature(),
            max_tokens: None,
            base_url: default_openai_base_url(),
            api_key: None,
            timeout_secs: default_llm_timeout(),
        }
    }
}

/// Which vector index backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexProvider {
    #[default]
    Pinecone,
    /// In-process index, optionally persisted to a JSON snapshot
    Memory,
}

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IndexConfig {
    #[serde(default)]
    pub provider: IndexProvider,

    /// Target index name (can also be set via `PINECONE_INDEX_NAME`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Logical partition within the index
    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default)]
    pub metric: IndexMetric,

    #[serde(default = "default_cloud")]
    pub cloud: String,

    #[serde(default = "default_region")]
    pub region: String,

    /// API key (can also be set via `PINECONE_API_KEY`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<ApiKey>,

    /// Control-plane base URL
    #[serde(default = "default_control_plane_url")]
    pub control_plane_url: String,

    /// Value of the `X-Pinecone-API-Version` header
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Data-plane host override; discovered from the control plane when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Snapshot file for the memory provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<String>,

    /// Records per upsert request
    #[serde(default = "default_upsert_batch_size")]
    pub upsert_batch_size: usize,

    /// Request timeout in seconds
    #[serde(default = "default_index_timeout")]
    pub timeout_secs: u64,

    /// How long to wait for a newly created index to become ready
    #[serde(default = "default_ready_timeout")]
    pub ready_timeout_secs: u64,
}

fn default_namespace() -> String {
    "rag-demo-app".to_string()
}

fn default_cloud() -> String {
    "aws".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_control_plane_url() -> String {
    "https://api.pinecone.io".to_string()
}

fn default_api_version() -> String {
    "2024-07".to_string()
}

const fn default_upsert_batch_size() -> usize {
    100
}

const fn default_index_timeout() -> u64 {
    30
}

const fn default_ready_timeout() -> u64 {
    120
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            provider: IndexProvider::default(),
            name: None,
            namespace: default_namespace(),
            metric: IndexMetric::default(),
            cloud: default_cloud(),
            region: default_region(),
            api_key: None,
            control_plane_url: default_control_plane_url(),
            api_version: default_api_version(),
            host: None,
            snapshot_path: None,
            upsert_batch_size: default_upsert_batch_size(),
            timeout_secs: default_index_timeout(),
            ready_timeout_secs: default_ready_timeout(),
        }
    }
}

impl IndexConfig {
    pub fn require_name(&self) -> DomainResult<&str> {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Ok(name),
            _ => Err(DomainError::Configuration(
                "index name is not set. Set PINECONE_INDEX_NAME or index.name".to_string(),
            )),
        }
    }

    pub fn require_api_key(&self) -> DomainResult<&ApiKey> {
        self.api_key.as_ref().ok_or_else(|| {
            DomainError::MissingCredential(
                "vector index API key not set. Set PINECONE_API_KEY or index.api_key".to_string(),
            )
        })
    }

    pub fn coordinate(&self) -> DomainResult<IndexCoordinate> {
        Ok(IndexCoordinate::new(self.require_name()?, self.namespace.clone()))
    }

    /// Creation parameters; dimension comes from the embedding section
    pub fn spec(&self, dimension: usize) -> DomainResult<IndexSpec> {
        Ok(IndexSpec {
            name: self.require_name()?.to_string(),
            dimension,
            metric: self.metric,
            cloud: self.cloud.clone(),
            region: self.region.clone(),
        })
    }
}

/// Query-time retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetrievalConfig {
    /// Number of chunks retrieved per question
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

const fn default_top_k() -> usize {
    5
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json, pretty or compact
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling JSON log files (stderr only when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,

    /// Rotation policy for file logs: daily, hourly, never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}
