//! End-to-end upload and query behaviour.

use super::support::*;
use crate::types::{CHUNK_INDEX_KEY, DOCUMENT_ID_KEY};
use crate::{Metadata, RagService, SourceRef};
use grounded_core::AppError;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;

const RUST_TEXT: &str = "Rust is a systems programming language. \
It guarantees memory safety without a garbage collector. \
Ownership rules are checked at compile time. \
Borrowing lets code use values without taking ownership. \
Lifetimes describe how long references stay valid. \
Traits define shared behaviour across types. \
Cargo builds code and manages dependencies.";

fn metadata(pairs: &[(&str, &str)]) -> Metadata {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), json!(v)))
        .collect()
}

fn chunk_index(source: &SourceRef) -> u64 {
    source.metadata[CHUNK_INDEX_KEY].as_u64().unwrap()
}

/// Every stored chunk, ordered by chunk index. Collections in these tests
/// stay under the `top_k` ceiling.
async fn all_chunks(service: &RagService) -> Vec<SourceRef> {
    let mut sources = service.query("anything", Some(10)).await.unwrap().sources;
    sources.sort_by_key(chunk_index);
    sources
}

fn words(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect()
}

#[tokio::test]
async fn test_chunks_cover_every_word() {
    let h = Harness::new(80, 20).await;
    let outcome = h.service.upload(RUST_TEXT, None).await.unwrap();
    assert!(outcome.chunk_count > 1);

    let chunks = all_chunks(&h.service).await;
    for word in words(RUST_TEXT) {
        assert!(
            chunks.iter().any(|c| c.content.contains(word)),
            "word {word:?} missing from every chunk"
        );
    }
    for chunk in &chunks {
        assert!(chunk.content.chars().count() <= 80);
    }
}

#[tokio::test]
async fn test_character_cut_overlap_is_exact() {
    let h = Harness::new(50, 10).await;
    let text: String = (0..200).map(|i| (b'a' + (i % 26) as u8) as char).collect();

    let outcome = h.service.upload(&text, None).await.unwrap();
    assert_eq!(outcome.chunk_count, 5);

    let chunks = all_chunks(&h.service).await;
    for pair in chunks.windows(2) {
        let previous = &pair[0].content;
        let tail = &previous[previous.len() - 10..];
        assert!(pair[1].content.starts_with(tail));
    }
}

#[tokio::test]
async fn test_chunk_indices_are_contiguous() {
    let h = Harness::new(80, 20).await;
    let outcome = h.service.upload(RUST_TEXT, None).await.unwrap();

    let chunks = all_chunks(&h.service).await;
    let indices: Vec<u64> = chunks.iter().map(chunk_index).collect();
    let expected: Vec<u64> = (0..outcome.chunk_count as u64).collect();

    assert_eq!(indices, expected);
    assert_eq!(h.stored().await, outcome.chunk_count);

    // Retrieval order within a chunk sequence matches the source text
    let positions: Vec<usize> = chunks
        .iter()
        .map(|c| RUST_TEXT.find(&c.content[..10]).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn test_metadata_merged_into_every_chunk() {
    let h = Harness::new(80, 20).await;
    let outcome = h
        .service
        .upload(RUST_TEXT, Some(metadata(&[("source", "doc1")])))
        .await
        .unwrap();

    let chunks = all_chunks(&h.service).await;
    assert_eq!(chunks.len(), outcome.chunk_count);
    for chunk in &chunks {
        assert_eq!(chunk.metadata["source"], json!("doc1"));
        assert_eq!(chunk.metadata[DOCUMENT_ID_KEY], json!(outcome.document_id));
        assert!(chunk.metadata.contains_key(CHUNK_INDEX_KEY));
    }
}

#[tokio::test]
async fn test_round_trip_retrieval() {
    let h = Harness::new(1000, 200).await;
    h.service
        .upload("Kimchi is fermented cabbage seasoned with chili.", None)
        .await
        .unwrap();
    h.service
        .upload("The zyxquark protocol encrypts satellite telemetry.", None)
        .await
        .unwrap();
    h.service
        .upload("Ownership rules prevent data races in Rust.", None)
        .await
        .unwrap();

    let result = h
        .service
        .query("How does the zyxquark protocol work?", Some(2))
        .await
        .unwrap();

    assert!(result
        .sources
        .iter()
        .any(|s| s.content.contains("zyxquark")));
}

#[tokio::test]
async fn test_top_k_boundaries() {
    let h = Harness::new(80, 20).await;
    let outcome = h.service.upload(RUST_TEXT, None).await.unwrap();
    assert!(outcome.chunk_count < 10);

    let one = h.service.query("memory safety", Some(1)).await.unwrap();
    assert_eq!(one.sources.len(), 1);

    let all = h.service.query("memory safety", Some(10)).await.unwrap();
    assert_eq!(all.sources.len(), outcome.chunk_count);

    let default = h.service.query("memory safety", None).await.unwrap();
    assert_eq!(default.sources.len(), 3);
}

#[tokio::test]
async fn test_out_of_range_top_k_rejected_before_any_call() {
    let h = Harness::new(80, 20).await;
    h.service.upload(RUST_TEXT, None).await.unwrap();
    let embed_calls = h.embedder.calls();

    for top_k in [0, 11] {
        let err = h.service.query("memory", Some(top_k)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    assert_eq!(h.embedder.calls(), embed_calls);
    assert_eq!(h.llm.calls(), 0);
}

#[tokio::test]
async fn test_blank_question_rejected_before_any_call() {
    let h = Harness::new(80, 20).await;
    h.service.upload(RUST_TEXT, None).await.unwrap();
    let embed_calls = h.embedder.calls();

    for question in ["", "   ", "\n\t"] {
        let err = h.service.query(question, None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    assert_eq!(h.embedder.calls(), embed_calls);
    assert_eq!(h.llm.calls(), 0);
}

#[tokio::test]
async fn test_query_on_empty_collection_declines() {
    let h = Harness::new(80, 20).await;
    let result = h
        .service
        .query("What is the capital of France?", Some(3))
        .await
        .unwrap();

    assert!(result.sources.is_empty());
    assert_eq!(result.answer, DECLINE);
    assert_eq!(h.llm.calls(), 1);
}

#[tokio::test]
async fn test_reset_twice_leaves_empty_queryable_collection() {
    let h = Harness::new(80, 20).await;
    h.service.upload(RUST_TEXT, None).await.unwrap();
    assert!(h.stored().await > 0);

    for _ in 0..2 {
        h.service.delete_collection().await.unwrap();
        assert_eq!(h.store.count(COLLECTION).await, Some(0));

        let result = h.service.query("Rust", Some(3)).await.unwrap();
        assert!(result.sources.is_empty());
    }
}

#[tokio::test]
async fn test_capital_of_france() {
    let h = Harness::new(1000, 200).await;
    h.service
        .upload("Kimchi is fermented cabbage seasoned with chili.", None)
        .await
        .unwrap();

    let outcome = h
        .service
        .upload(
            "The capital of France is Paris. Paris has a population of about 2 million.",
            Some(metadata(&[("topic", "geography")])),
        )
        .await
        .unwrap();
    assert!(!outcome.document_id.is_empty());

    let result = h
        .service
        .query("What is the capital of France?", Some(1))
        .await
        .unwrap();

    assert_eq!(result.sources.len(), 1);
    assert!(result.sources[0].content.contains("Paris"));
    assert_eq!(result.sources[0].metadata["topic"], json!("geography"));
    assert!(result.answer.contains("Paris"));
}

#[tokio::test]
async fn test_reupload_creates_new_document() {
    let h = Harness::new(1000, 200).await;
    let first = h.service.upload("Same text twice.", None).await.unwrap();
    let second = h.service.upload("Same text twice.", None).await.unwrap();

    assert_ne!(first.document_id, second.document_id);
    assert_eq!(h.stored().await, 2);
}

#[tokio::test]
async fn test_empty_upload_writes_nothing() {
    let h = Harness::new(80, 20).await;
    let outcome = h.service.upload("", None).await.unwrap();

    assert!(!outcome.document_id.is_empty());
    assert_eq!(outcome.chunk_count, 0);
    assert_eq!(h.embedder.calls(), 0);
    assert_eq!(h.stored().await, 0);
}

#[tokio::test]
async fn test_vector_count_mismatch_is_provider_error() {
    let store = Arc::new(crate::MemoryStore::new());
    let service = RagService::new(
        Arc::new(ShortEmbedder),
        Arc::new(ExtractiveLlm::default()),
        store.clone(),
        options(80, 20),
    )
    .await
    .unwrap();

    let err = service.upload(RUST_TEXT, None).await.unwrap_err();
    assert!(matches!(err, AppError::Provider(_)));
    assert_eq!(store.count(COLLECTION).await, Some(0));
}

#[tokio::test]
async fn test_unreachable_store_fails_on_use_not_construction() {
    let service = RagService::new(
        Arc::new(CountingEmbedder::new()),
        Arc::new(ExtractiveLlm::default()),
        Arc::new(UnreachableStore),
        options(80, 20),
    )
    .await
    .unwrap();

    let err = service.upload(RUST_TEXT, None).await.unwrap_err();
    assert!(matches!(err, AppError::Store(_)));

    let err = service.query("Rust", None).await.unwrap_err();
    assert!(matches!(err, AppError::Store(_)));

    let err = service.delete_collection().await.unwrap_err();
    assert!(matches!(err, AppError::Store(_)));
}

#[tokio::test]
async fn test_concurrent_uploads() {
    let h = Harness::new(80, 20).await;
    let service = Arc::new(h.service);

    let uploads = (0..8).map(|i| {
        let service = service.clone();
        async move {
            let n = i.to_string();
            service
                .upload(
                    &format!("Document number {i} talks about topic {i}."),
                    Some(metadata(&[("n", n.as_str())])),
                )
                .await
        }
    });

    let outcomes: Vec<_> = futures::future::join_all(uploads)
        .await
        .into_iter()
        .collect::<Result<_, _>>()
        .unwrap();

    let ids: HashSet<&str> = outcomes.iter().map(|o| o.document_id.as_str()).collect();
    assert_eq!(ids.len(), 8);

    let written: usize = outcomes.iter().map(|o| o.chunk_count).sum();
    assert_eq!(h.store.count(COLLECTION).await, Some(written));
}

#[tokio::test]
async fn test_health_needs_no_backend() {
    let h = Harness::new(80, 20).await;
    let status = h.service.health();
    assert_eq!(status.status, "healthy");
    assert_eq!(status.version, env!("CARGO_PKG_VERSION"));
    assert_eq!(crate::health(), status);
}
