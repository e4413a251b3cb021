//! Ingestion pipeline integration tests over fake providers.

mod common;

use std::sync::Arc;

use common::{CountingIndex, FakeModels, Harness, KeywordEmbedder, DIMENSION, NAMESPACE};
use docent::adapters::loaders::TextLoader;
use docent::domain::errors::{DomainError, ErrorKind};
use docent::domain::models::{ChunkingConfig, Document, Page};
use docent::domain::ports::{DocumentLoader, VectorIndex};
use docent::services::Embedder;

#[tokio::test]
async fn test_ingestion_reports_counts() {
    common::setup_test_logging();
    let harness = Harness::new(CountingIndex::new(), FakeModels::failing());

    let report = harness
        .ingestion(ChunkingConfig::default(), 100)
        .run(&common::tos_document())
        .await
        .unwrap();

    assert_eq!(report.document_id, "tos");
    assert_eq!(report.pages, 3);
    assert_eq!(report.chunks, 3);
    assert_eq!(report.records_upserted, 3);
    assert_eq!(report.batches, 1);
    assert!(report.skipped_pages.is_empty());
    assert_eq!(report.coordinate.namespace, NAMESPACE);
    assert_eq!(harness.index.record_count(NAMESPACE).await, 3);
}

#[tokio::test]
async fn test_reingesting_same_document_overwrites_records() {
    let harness = Harness::new(CountingIndex::new(), FakeModels::failing());
    let config = ChunkingConfig {
        chunk_overlap: 10,
        ..ChunkingConfig::without_overlap(60)
    };
    let document = common::tos_document();

    let first = harness.ingestion(config.clone(), 4).run(&document).await.unwrap();
    let count_after_first = harness.index.record_count(NAMESPACE).await;
    let second = harness.ingestion(config, 4).run(&document).await.unwrap();

    assert!(first.chunks > 3);
    assert_eq!(first, second);
    assert_eq!(count_after_first, first.chunks);
    assert_eq!(harness.index.record_count(NAMESPACE).await, first.chunks);
}

#[tokio::test]
async fn test_blank_pages_are_skipped_and_reported() {
    let harness = Harness::new(CountingIndex::new(), FakeModels::failing());
    let document = Document::new(
        "scan",
        "scan.txt",
        vec![
            Page::new(1, "Cover page with a title."),
            Page::new(2, "   \n "),
            Page::new(3, "Closing remarks."),
        ],
    );

    let report = harness
        .ingestion(ChunkingConfig::default(), 100)
        .run(&document)
        .await
        .unwrap();

    assert_eq!(report.skipped_pages, vec![2]);
    assert_eq!(report.chunks, 2);
}

#[tokio::test]
async fn test_existing_index_with_other_dimension_is_rejected() {
    let harness = Harness::new(CountingIndex::new(), FakeModels::failing());
    harness
        .index
        .inner()
        .create_index(&common::spec(768))
        .await
        .unwrap();

    let err = harness
        .ingestion(ChunkingConfig::default(), 100)
        .run(&common::tos_document())
        .await
        .unwrap_err();

    match err {
        DomainError::DimensionMismatch { expected, actual } => {
            assert_eq!(expected, DIMENSION);
            assert_eq!(actual, 768);
        }
        other => panic!("expected DimensionMismatch, got {other:?}"),
    }
    assert_eq!(harness.index.upsert_calls(), 0);
}

#[tokio::test]
async fn test_wrong_length_embeddings_never_reach_the_index() {
    // text-embedding-3-large configured with the default 1536 dimension
    let harness = Harness::with_embeddings(
        KeywordEmbedder::misreporting(DIMENSION, 3072),
        CountingIndex::new(),
        FakeModels::failing(),
    );

    let err = harness
        .ingestion(ChunkingConfig::default(), 100)
        .run(&common::tos_document())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DomainError::DimensionMismatch {
            expected: DIMENSION,
            actual: 3072
        }
    ));
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(harness.index.total_calls(), 0);
    assert!(harness
        .index
        .inner()
        .describe_index(common::INDEX_NAME)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_embedding_model_dimension_mismatch_fails_at_construction() {
    let provider = Arc::new(KeywordEmbedder::new(384));
    let err = Embedder::new(provider, DIMENSION, 100).err().unwrap();

    assert!(matches!(
        err,
        DomainError::DimensionMismatch {
            expected: DIMENSION,
            actual: 384
        }
    ));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[tokio::test]
async fn test_failed_batch_identifies_chunk_range() {
    let harness = Harness::new(CountingIndex::failing_upsert_on(1), FakeModels::failing());
    let document = Document::new(
        "faq",
        "faq.txt",
        (1..=5)
            .map(|n| Page::new(n, format!("Question {n} answered on its own page.")))
            .collect(),
    );

    let err = harness
        .ingestion(ChunkingConfig::default(), 2)
        .run(&document)
        .await
        .unwrap_err();

    match &err {
        DomainError::BatchFailed {
            batch,
            first_id,
            last_id,
            ..
        } => {
            assert_eq!(*batch, 1);
            assert_eq!(first_id, "faq:page:3:offset:0");
            assert_eq!(last_id, "faq:page:4:offset:0");
        }
        other => panic!("expected BatchFailed, got {other:?}"),
    }
    assert!(err.is_retryable());
    assert_eq!(harness.index.upsert_calls(), 2);
    assert_eq!(harness.index.record_count(NAMESPACE).await, 2);
}

#[tokio::test]
async fn test_missing_source_fails_before_any_index_call() {
    let harness = Harness::new(CountingIndex::new(), FakeModels::failing());
    let dir = tempfile::tempdir().unwrap();

    let err = TextLoader::new()
        .load(&dir.path().join("missing.pdf"), "missing")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::SourceRead);
    assert_eq!(harness.index.total_calls(), 0);
}

#[tokio::test]
async fn test_loaded_file_ingests_every_page() {
    let harness = Harness::new(CountingIndex::new(), FakeModels::failing());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tos.txt");
    std::fs::write(&path, "First page.\x0cSecond page.\x0cThird page.").unwrap();

    let document = TextLoader::new().load(&path, "tos").await.unwrap();
    let report = harness
        .ingestion(ChunkingConfig::default(), 100)
        .run(&document)
        .await
        .unwrap();

    assert_eq!(report.pages, 3);
    assert_eq!(report.records_upserted, 3);
}
