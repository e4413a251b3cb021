//! Common test utilities for integration tests
//!
//! Provides deterministic stand-ins for the embedding, index and language
//! model providers, plus a harness wiring them into both pipelines.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use docent::domain::errors::{DomainError, DomainResult, ProviderKind};
use docent::domain::models::{
    ApiKey, ChunkingConfig, Document, IndexCoordinate, IndexDescription, IndexMetric, IndexSpec,
    IndexedRecord, Page,
};
use docent::domain::ports::{
    EmbeddingInput, EmbeddingOutput, EmbeddingProvider, LanguageModel, LanguageModelFactory,
    NamespaceStats, QueryMatch, VectorIndex,
};
use docent::infrastructure::vector::{Chunker, InMemoryVectorIndex};
use docent::services::{Embedder, IndexWriter, IngestionPipeline, QueryPipeline, Retriever};

pub const DIMENSION: usize = 1536;
pub const INDEX_NAME: &str = "tos-index";
pub const NAMESPACE: &str = "rag-demo-app";

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn test_key() -> ApiKey {
    ApiKey::new("sk-test-0123456789abcdef").expect("non-empty key")
}

pub fn spec(dimension: usize) -> IndexSpec {
    IndexSpec {
        name: INDEX_NAME.to_string(),
        dimension,
        metric: IndexMetric::Cosine,
        cloud: "aws".to_string(),
        region: "us-east-1".to_string(),
    }
}

/// Three-page terms of service, one topic per page
pub fn tos_document() -> Document {
    Document::new(
        "tos",
        "tos.txt",
        vec![
            Page::new(
                1,
                "Accounts. You must provide accurate registration details when creating an \
                 account. Keep your password confidential.",
            ),
            Page::new(
                2,
                "Eligibility. Users must be 13 years or older to use the service. Minimum age \
                 requirements may be higher in some countries.",
            ),
            Page::new(
                3,
                "Payments. Subscriptions renew monthly and invoices are sent by email. Refunds \
                 are issued within 30 days.",
            ),
        ],
    )
}

// -- Embedding --

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "be", "by", "for", "in", "is", "may", "must", "of", "or", "the",
    "to", "use", "what", "when", "you", "your",
];

/// Bag-of-words embedder: each content word adds weight to a hashed bucket
pub struct KeywordEmbedder {
    dimension: usize,
    reported_dimension: usize,
    calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self::misreporting(dimension, dimension)
    }

    /// Claims `reported` but returns vectors of `actual` length, like a
    /// model configured with the wrong dimension
    pub fn misreporting(reported: usize, actual: usize) -> Self {
        Self {
            dimension: actual,
            reported_dimension: reported,
            calls: AtomicUsize::new(0),
        }
    }

    /// Provider calls made so far (single and batch)
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn vector(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; self.dimension];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .map(str::to_lowercase)
            .filter(|w| !w.is_empty() && !STOPWORDS.contains(&w.as_str()))
        {
            vector[bucket(&word, self.dimension)] += 1.0;
        }
        vector
    }
}

/// FNV-1a, so buckets are stable across runs
fn bucket(word: &str, dimension: usize) -> usize {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in word.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    (hash % dimension as u64) as usize
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn dimension(&self) -> usize {
        self.reported_dimension
    }

    async fn embed(&self, text: &str) -> DomainResult<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.vector(text))
    }

    async fn embed_batch(&self, inputs: &[EmbeddingInput]) -> DomainResult<Vec<EmbeddingOutput>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(inputs
            .iter()
            .map(|input| EmbeddingOutput {
                id: input.id.clone(),
                vector: self.vector(&input.text),
            })
            .collect())
    }

    fn max_batch_size(&self) -> usize {
        16
    }
}

// -- Vector index --

/// Memory index that counts calls and can fail a chosen upsert
pub struct CountingIndex {
    inner: InMemoryVectorIndex,
    describes: AtomicUsize,
    creates: AtomicUsize,
    upserts: AtomicUsize,
    queries: AtomicUsize,
    fail_upsert_call: Option<usize>,
}

impl Default for CountingIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl CountingIndex {
    pub fn new() -> Self {
        Self {
            inner: InMemoryVectorIndex::new(),
            describes: AtomicUsize::new(0),
            creates: AtomicUsize::new(0),
            upserts: AtomicUsize::new(0),
            queries: AtomicUsize::new(0),
            fail_upsert_call: None,
        }
    }

    /// Fail the upsert call with this 0-based position
    pub fn failing_upsert_on(call: usize) -> Self {
        Self {
            fail_upsert_call: Some(call),
            ..Self::new()
        }
    }

    pub fn upsert_calls(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    pub fn query_calls(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.describes.load(Ordering::SeqCst)
            + self.creates.load(Ordering::SeqCst)
            + self.upsert_calls()
            + self.query_calls()
    }

    /// Direct access for seeding without touching the counters
    pub fn inner(&self) -> &InMemoryVectorIndex {
        &self.inner
    }

    pub async fn record_count(&self, namespace: &str) -> usize {
        self.inner
            .namespace_stats(INDEX_NAME)
            .await
            .unwrap_or_default()
            .into_iter()
            .find(|stats| stats.namespace == namespace)
            .map_or(0, |stats| stats.record_count)
    }
}

#[async_trait]
impl VectorIndex for CountingIndex {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn describe_index(&self, name: &str) -> DomainResult<Option<IndexDescription>> {
        self.describes.fetch_add(1, Ordering::SeqCst);
        self.inner.describe_index(name).await
    }

    async fn create_index(&self, spec: &IndexSpec) -> DomainResult<IndexDescription> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.inner.create_index(spec).await
    }

    async fn upsert(
        &self,
        coordinate: &IndexCoordinate,
        records: &[IndexedRecord],
    ) -> DomainResult<usize> {
        let call = self.upserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_upsert_call == Some(call) {
            return Err(DomainError::provider(
                ProviderKind::VectorIndex,
                "503 Service Unavailable",
            ));
        }
        self.inner.upsert(coordinate, records).await
    }

    async fn query(
        &self,
        coordinate: &IndexCoordinate,
        vector: &[f32],
        top_k: usize,
    ) -> DomainResult<Vec<QueryMatch>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.query(coordinate, vector, top_k).await
    }

    async fn namespace_stats(&self, index_name: &str) -> DomainResult<Vec<NamespaceStats>> {
        self.inner.namespace_stats(index_name).await
    }
}

// -- Language model --

/// Factory for a canned model that records every prompt it receives
#[derive(Default)]
pub struct FakeModels {
    answer: Option<String>,
    connects: AtomicUsize,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl FakeModels {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: Some(answer.to_string()),
            ..Self::default()
        }
    }

    /// Every generate call fails with a provider error
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt log").clone()
    }
}

impl LanguageModelFactory for FakeModels {
    fn connect(&self, _api_key: &ApiKey) -> DomainResult<Arc<dyn LanguageModel>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(FakeModel {
            answer: self.answer.clone(),
            prompts: Arc::clone(&self.prompts),
        }))
    }
}

struct FakeModel {
    answer: Option<String>,
    prompts: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl LanguageModel for FakeModel {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn model(&self) -> &str {
        "fake-model"
    }

    async fn generate(&self, prompt: &str) -> DomainResult<String> {
        self.prompts.lock().expect("prompt log").push(prompt.to_string());
        self.answer
            .clone()
            .ok_or_else(|| DomainError::provider(ProviderKind::Llm, "upstream unavailable"))
    }
}

// -- Harness --

/// Both pipelines over shared fakes
pub struct Harness {
    pub embeddings: Arc<KeywordEmbedder>,
    pub index: Arc<CountingIndex>,
    pub models: Arc<FakeModels>,
}

impl Harness {
    pub fn new(index: CountingIndex, models: FakeModels) -> Self {
        Self::with_embeddings(KeywordEmbedder::new(DIMENSION), index, models)
    }

    pub fn with_embeddings(
        embeddings: KeywordEmbedder,
        index: CountingIndex,
        models: FakeModels,
    ) -> Self {
        Self {
            embeddings: Arc::new(embeddings),
            index: Arc::new(index),
            models: Arc::new(models),
        }
    }

    pub fn embedder(&self) -> Arc<Embedder> {
        Arc::new(
            Embedder::new(self.embeddings.clone(), DIMENSION, 100).expect("matching dimension"),
        )
    }

    pub fn ingestion(&self, config: ChunkingConfig, upsert_batch_size: usize) -> IngestionPipeline {
        let index: Arc<dyn VectorIndex> = self.index.clone();
        let writer = IndexWriter::new(
            index,
            spec(DIMENSION),
            NAMESPACE,
            upsert_batch_size,
            Duration::from_secs(5),
        )
        .with_poll_interval(Duration::from_millis(10));
        IngestionPipeline::new(
            Chunker::new(config).expect("valid chunking config"),
            self.embedder(),
            writer,
        )
    }

    pub fn query(&self, namespace: &str, top_k: usize) -> QueryPipeline {
        let index: Arc<dyn VectorIndex> = self.index.clone();
        let models: Arc<dyn LanguageModelFactory> = self.models.clone();
        QueryPipeline::new(
            self.embedder(),
            Retriever::new(index, IndexCoordinate::new(INDEX_NAME, namespace)),
            models,
            top_k,
        )
    }
}
