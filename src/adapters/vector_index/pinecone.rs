//! Pinecone REST adapter.
//!
//! Index management goes through the control plane
//! (`https://api.pinecone.io/indexes`). Vector reads and writes go to the
//! per-index data-plane host, which is discovered from the index
//! description unless configured explicitly.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::adapters::http;
use crate::domain::errors::{DomainError, DomainResult, ProviderKind};
use crate::domain::models::{
    ApiKey, IndexConfig, IndexCoordinate, IndexDescription, IndexMetric, IndexSpec, IndexedRecord,
};
use crate::domain::ports::{NamespaceStats, QueryMatch, VectorIndex};

const PROVIDER: ProviderKind = ProviderKind::VectorIndex;

/// Connection settings for the Pinecone adapter
#[derive(Debug, Clone)]
pub struct PineconeSettings {
    pub api_key: ApiKey,
    pub control_plane_url: String,
    pub api_version: String,
    /// Fixed data-plane host; skips discovery when set
    pub host: Option<String>,
    pub timeout_secs: u64,
}

impl PineconeSettings {
    pub fn from_settings(config: &IndexConfig) -> DomainResult<Self> {
        Ok(Self {
            api_key: config.require_api_key()?.clone(),
            control_plane_url: config.control_plane_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            host: config.host.clone(),
            timeout_secs: config.timeout_secs,
        })
    }
}

/// Pinecone-backed vector index
pub struct PineconeIndex {
    settings: PineconeSettings,
    client: Client,
    hosts: RwLock<HashMap<String, String>>,
}

impl PineconeIndex {
    pub fn new(settings: PineconeSettings) -> DomainResult<Self> {
        let client = http::build_client(PROVIDER, settings.timeout_secs)?;
        Ok(Self {
            settings,
            client,
            hosts: RwLock::new(HashMap::new()),
        })
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("Api-Key", self.settings.api_key.expose())
            .header("X-Pinecone-API-Version", &self.settings.api_version)
    }

    async fn send(&self, builder: RequestBuilder) -> DomainResult<reqwest::Response> {
        builder
            .send()
            .await
            .map_err(|e| http::send_error(PROVIDER, self.settings.timeout_secs, &e))
    }

    /// Base URL of the index's data plane
    async fn data_plane(&self, index_name: &str) -> DomainResult<String> {
        if let Some(host) = &self.settings.host {
            return Ok(with_scheme(host));
        }
        if let Some(host) = self.hosts.read().await.get(index_name) {
            return Ok(host.clone());
        }

        let description = self.describe_index(index_name).await?.ok_or_else(|| {
            DomainError::provider(PROVIDER, format!("index '{index_name}' not found"))
        })?;
        let host = description.host.ok_or_else(|| {
            DomainError::provider(
                PROVIDER,
                format!("index '{index_name}' has no data-plane host yet"),
            )
        })?;
        let url = with_scheme(&host);
        self.hosts
            .write()
            .await
            .insert(index_name.to_string(), url.clone());
        Ok(url)
    }
}

fn with_scheme(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    fn name(&self) -> &'static str {
        "pinecone"
    }

    #[instrument(skip(self))]
    async fn describe_index(&self, name: &str) -> DomainResult<Option<IndexDescription>> {
        let url = format!("{}/indexes/{name}", self.settings.control_plane_url);
        let response = self.send(self.request(Method::GET, &url)).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(http::status_error(PROVIDER, "Pinecone describe_index", response).await);
        }

        let model: IndexModel = http::decode(PROVIDER, "describe_index", response).await?;
        Ok(Some(model.into()))
    }

    #[instrument(skip(self, spec), fields(index = %spec.name, dimension = spec.dimension))]
    async fn create_index(&self, spec: &IndexSpec) -> DomainResult<IndexDescription> {
        let url = format!("{}/indexes", self.settings.control_plane_url);
        let body = CreateIndexRequest {
            name: &spec.name,
            dimension: spec.dimension,
            metric: spec.metric,
            spec: ServerlessSpec {
                serverless: ServerlessLocation {
                    cloud: &spec.cloud,
                    region: &spec.region,
                },
            },
        };

        let response = self.send(self.request(Method::POST, &url).json(&body)).await?;

        if response.status() == StatusCode::CONFLICT {
            debug!("index already exists");
            return self.describe_index(&spec.name).await?.ok_or_else(|| {
                DomainError::provider(PROVIDER, format!("index '{}' vanished after conflict", spec.name))
            });
        }
        if !response.status().is_success() {
            return Err(http::status_error(PROVIDER, "Pinecone create_index", response).await);
        }

        let model: IndexModel = http::decode(PROVIDER, "create_index", response).await?;
        info!(index = %model.name, "created index");
        Ok(model.into())
    }

    #[instrument(skip(self, records), fields(coordinate = %coordinate, count = records.len()))]
    async fn upsert(
        &self,
        coordinate: &IndexCoordinate,
        records: &[IndexedRecord],
    ) -> DomainResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let base = self.data_plane(&coordinate.index_name).await?;
        let body = UpsertRequest {
            namespace: &coordinate.namespace,
            vectors: records
                .iter()
                .map(|record| UpsertVector {
                    id: &record.id,
                    values: &record.vector,
                    metadata: &record.metadata,
                })
                .collect(),
        };

        let response = self
            .send(
                self.request(Method::POST, &format!("{base}/vectors/upsert"))
                    .json(&body),
            )
            .await?;
        if !response.status().is_success() {
            return Err(http::status_error(PROVIDER, "Pinecone upsert", response).await);
        }

        let result: UpsertResponse = http::decode(PROVIDER, "upsert", response).await?;
        Ok(result.upserted_count)
    }

    #[instrument(skip(self, vector), fields(coordinate = %coordinate, top_k))]
    async fn query(
        &self,
        coordinate: &IndexCoordinate,
        vector: &[f32],
        top_k: usize,
    ) -> DomainResult<Vec<QueryMatch>> {
        let base = self.data_plane(&coordinate.index_name).await?;
        let body = QueryRequest {
            namespace: &coordinate.namespace,
            vector,
            top_k,
            include_metadata: true,
            include_values: false,
        };

        let response = self
            .send(self.request(Method::POST, &format!("{base}/query")).json(&body))
            .await?;
        if !response.status().is_success() {
            return Err(http::status_error(PROVIDER, "Pinecone query", response).await);
        }

        let result: QueryResponse = http::decode(PROVIDER, "query", response).await?;
        Ok(result.matches.into_iter().map(QueryMatch::from).collect())
    }

    async fn namespace_stats(&self, index_name: &str) -> DomainResult<Vec<NamespaceStats>> {
        let base = self.data_plane(index_name).await?;
        let response = self
            .send(
                self.request(Method::POST, &format!("{base}/describe_index_stats"))
                    .json(&serde_json::json!({})),
            )
            .await?;
        if !response.status().is_success() {
            return Err(http::status_error(PROVIDER, "Pinecone describe_index_stats", response).await);
        }

        let stats: IndexStats = http::decode(PROVIDER, "describe_index_stats", response).await?;
        let mut namespaces: Vec<NamespaceStats> = stats
            .namespaces
            .into_iter()
            .map(|(namespace, summary)| NamespaceStats {
                namespace,
                record_count: summary.vector_count,
            })
            .collect();
        namespaces.sort_by(|a, b| a.namespace.cmp(&b.namespace));
        Ok(namespaces)
    }
}

// -- Pinecone API request/response types --

#[derive(Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: IndexMetric,
    spec: ServerlessSpec<'a>,
}

#[derive(Serialize)]
struct ServerlessSpec<'a> {
    serverless: ServerlessLocation<'a>,
}

#[derive(Serialize)]
struct ServerlessLocation<'a> {
    cloud: &'a str,
    region: &'a str,
}

#[derive(Debug, Deserialize)]
struct IndexModel {
    name: String,
    dimension: usize,
    metric: IndexMetric,
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    status: Option<IndexStatus>,
}

#[derive(Debug, Deserialize)]
struct IndexStatus {
    #[serde(default)]
    ready: bool,
}

impl From<IndexModel> for IndexDescription {
    fn from(model: IndexModel) -> Self {
        Self {
            name: model.name,
            dimension: model.dimension,
            metric: model.metric,
            host: model.host.filter(|h| !h.is_empty()),
            ready: model.status.is_some_and(|s| s.ready),
        }
    }
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    namespace: &'a str,
    vectors: Vec<UpsertVector<'a>>,
}

#[derive(Serialize)]
struct UpsertVector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: &'a crate::domain::models::RecordMetadata,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    namespace: &'a str,
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<PineconeMatch>,
}

#[derive(Debug, Deserialize)]
struct PineconeMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
}

impl From<PineconeMatch> for QueryMatch {
    fn from(m: PineconeMatch) -> Self {
        let metadata = m.metadata.unwrap_or_default();
        // numeric metadata comes back as floats
        let source_page = metadata.get("source_page").and_then(|v| {
            v.as_u64()
                .or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
                .and_then(|n| usize::try_from(n).ok())
        });
        Self {
            id: m.id,
            score: m.score,
            text: metadata
                .get("text")
                .and_then(Value::as_str)
                .map(str::to_string),
            source_page,
            source: metadata
                .get("source")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IndexStats {
    #[serde(default)]
    namespaces: HashMap<String, NamespaceSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NamespaceSummary {
    #[serde(default)]
    vector_count: usize,
}
