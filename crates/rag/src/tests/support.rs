//! Test doubles shared by the pipeline tests.

use crate::answer::GenerationSettings;
use crate::embeddings::{EmbeddingProvider, MockProvider};
use crate::store::{CollectionSchema, DistanceMetric, ScoredRecord, StoreRecord, VectorStore};
use crate::{ChunkConfig, MemoryStore, RagService, ServiceOptions};
use grounded_core::{AppError, AppResult};
use grounded_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use grounded_prompt::builtin_prompt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const DIMENSIONS: usize = 256;
pub const COLLECTION: &str = "test_documents";
pub const DECLINE: &str = "I cannot answer with the given information.";

/// Mock embedder that counts batch calls.
#[derive(Debug)]
pub struct CountingEmbedder {
    inner: MockProvider,
    calls: AtomicUsize,
}

impl CountingEmbedder {
    pub fn new() -> Self {
        Self {
            inner: MockProvider::new(DIMENSIONS),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for CountingEmbedder {
    fn provider_name(&self) -> &str {
        "counting"
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    fn dimensions(&self) -> usize {
        DIMENSIONS
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed_batch(texts).await
    }
}

/// Embedder that drops the last vector of every batch.
#[derive(Debug)]
pub struct ShortEmbedder;

#[async_trait::async_trait]
impl EmbeddingProvider for ShortEmbedder {
    fn provider_name(&self) -> &str {
        "short"
    }

    fn model_name(&self) -> &str {
        "short"
    }

    fn dimensions(&self) -> usize {
        DIMENSIONS
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let keep = texts.len().saturating_sub(1);
        Ok(vec![vec![0.1; DIMENSIONS]; keep])
    }
}

/// LLM double that answers with the first sentence of the prompt context,
/// or declines when the context is empty.
#[derive(Default)]
pub struct ExtractiveLlm {
    calls: AtomicUsize,
}

impl ExtractiveLlm {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl LlmClient for ExtractiveLlm {
    fn provider_name(&self) -> &str {
        "extractive"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let context = request
            .prompt
            .split_once("Context:\n")
            .and_then(|(_, rest)| rest.split_once("\n\nQuestion:"))
            .map(|(context, _)| context.trim())
            .unwrap_or("");

        let content = if context.is_empty() {
            DECLINE.to_string()
        } else {
            match context.split_once(". ") {
                Some((first, _)) => format!("{}.", first),
                None => context.to_string(),
            }
        };

        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage: LlmUsage::new(0, 0),
        })
    }
}

/// Store whose every call fails, as when the cluster is unreachable.
pub struct UnreachableStore;

#[async_trait::async_trait]
impl VectorStore for UnreachableStore {
    fn backend_name(&self) -> &str {
        "unreachable"
    }

    async fn ensure_collection(&self, _schema: &CollectionSchema) -> AppResult<()> {
        Err(AppError::Store("connection refused".to_string()))
    }

    async fn upsert(&self, _collection: &str, _records: Vec<StoreRecord>) -> AppResult<usize> {
        Err(AppError::Store("connection refused".to_string()))
    }

    async fn search(
        &self,
        _collection: &str,
        _query: &[f32],
        _top_k: usize,
        _metric: DistanceMetric,
    ) -> AppResult<Vec<ScoredRecord>> {
        Err(AppError::Store("connection refused".to_string()))
    }

    async fn drop_collection(&self, _collection: &str) -> AppResult<()> {
        Err(AppError::Store("connection refused".to_string()))
    }
}

pub fn options(chunk_size: usize, chunk_overlap: usize) -> ServiceOptions {
    ServiceOptions::new(
        builtin_prompt("en").unwrap(),
        GenerationSettings {
            model: "test-model".to_string(),
            temperature: 0.0,
            max_tokens: None,
        },
    )
    .with_collection(COLLECTION)
    .with_chunking(ChunkConfig::new(chunk_size, chunk_overlap).unwrap())
}

/// A service over a fresh in-memory store, with handles to its doubles.
pub struct Harness {
    pub service: RagService,
    pub store: Arc<MemoryStore>,
    pub embedder: Arc<CountingEmbedder>,
    pub llm: Arc<ExtractiveLlm>,
}

impl Harness {
    pub async fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let store = Arc::new(MemoryStore::new());
        let embedder = Arc::new(CountingEmbedder::new());
        let llm = Arc::new(ExtractiveLlm::default());

        let service = RagService::new(
            embedder.clone(),
            llm.clone(),
            store.clone(),
            options(chunk_size, chunk_overlap),
        )
        .await
        .unwrap();

        Self {
            service,
            store,
            embedder,
            llm,
        }
    }

    pub async fn stored(&self) -> usize {
        self.store.count(COLLECTION).await.unwrap_or(0)
    }
}
