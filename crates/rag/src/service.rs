//! RAG service orchestrator.
//!
//! Wires the chunker, embedding provider, vector store and answer
//! synthesizer together and owns the collection lifecycle. Build one
//! [`RagService`] per process and share it behind an `Arc`; every operation
//! takes `&self` and may run concurrently with the others.

use crate::answer::{AnswerSynthesizer, GenerationSettings, QueryResult};
use crate::chunk::{ChunkConfig, RecursiveCharacterSplitter};
use crate::embeddings::{create_provider, EmbeddingProvider};
use crate::indexer::Indexer;
use crate::retriever::{validate_query, validate_top_k, Retriever};
use crate::store::{create_store, AnnIndex, CollectionSchema, DistanceMetric, VectorStore};
use crate::types::{Metadata, UploadOutcome, DEFAULT_TOP_K};
use grounded_core::{AppConfig, AppResult};
use grounded_llm::{create_client, LlmClient};
use grounded_prompt::{resolve_prompt, PromptDefinition};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Version reported by [`health`].
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Liveness report. Does not touch any backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

/// Report the service as healthy.
pub fn health() -> HealthStatus {
    HealthStatus {
        status: "healthy".to_string(),
        version: VERSION.to_string(),
    }
}

/// Everything about a deployment that is not an adapter.
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub collection: String,
    pub metric: DistanceMetric,
    pub index: AnnIndex,
    pub chunking: ChunkConfig,
    pub prompt: PromptDefinition,
    pub generation: GenerationSettings,
}

impl ServiceOptions {
    /// Options with the default collection, metric, index and chunking.
    pub fn new(prompt: PromptDefinition, generation: GenerationSettings) -> Self {
        Self {
            collection: "rag_documents".to_string(),
            metric: DistanceMetric::L2,
            index: AnnIndex::default(),
            chunking: ChunkConfig::default(),
            prompt,
            generation,
        }
    }

    /// Read options from the application configuration.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        Ok(Self {
            collection: config.vector_store.collection.clone(),
            metric: DistanceMetric::parse(&config.vector_store.distance)?,
            index: AnnIndex::from_settings(&config.vector_store.index)?,
            chunking: ChunkConfig::try_from(&config.chunking)?,
            prompt: resolve_prompt(&config.prompt)?,
            generation: GenerationSettings::from(&config.llm),
        })
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn with_chunking(mut self, chunking: ChunkConfig) -> Self {
        self.chunking = chunking;
        self
    }
}

/// Retrieval-augmented question answering over one collection.
pub struct RagService {
    store: Arc<dyn VectorStore>,
    schema: CollectionSchema,
    indexer: Indexer,
    retriever: Retriever,
    synthesizer: AnswerSynthesizer,
}

impl RagService {
    /// Assemble the service from its adapters.
    ///
    /// The collection is created if absent. A failure here is only logged;
    /// it surfaces as a store error on the first operation that needs the
    /// collection.
    pub async fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmClient>,
        store: Arc<dyn VectorStore>,
        options: ServiceOptions,
    ) -> AppResult<Self> {
        options.chunking.validate()?;

        let schema = CollectionSchema {
            name: options.collection.clone(),
            dimension: embedder.dimensions(),
            metric: options.metric,
            index: options.index,
        };

        if let Err(e) = store.ensure_collection(&schema).await {
            warn!(
                collection = %schema.name,
                backend = store.backend_name(),
                error = %e,
                "Collection initialization failed"
            );
        }

        let indexer = Indexer::new(
            RecursiveCharacterSplitter::new(options.chunking),
            embedder.clone(),
            store.clone(),
            options.collection.clone(),
        );
        let retriever = Retriever::new(
            embedder.clone(),
            store.clone(),
            options.collection.clone(),
            options.metric,
        );
        let synthesizer = AnswerSynthesizer::new(llm, options.prompt, options.generation);

        info!(
            collection = %schema.name,
            backend = store.backend_name(),
            embedder = embedder.provider_name(),
            model = embedder.model_name(),
            dimension = schema.dimension,
            metric = %schema.metric,
            "RAG service ready"
        );

        Ok(Self {
            store,
            schema,
            indexer,
            retriever,
            synthesizer,
        })
    }

    /// Build the service from configuration, creating every adapter through
    /// its factory.
    pub async fn from_config(config: &AppConfig) -> AppResult<Self> {
        let embedder = create_provider(
            &config.embedding,
            config.resolve_api_key(&config.embedding.provider).as_deref(),
        )?;
        let llm = create_client(
            &config.llm,
            config.resolve_api_key(&config.llm.provider).as_deref(),
        )?;
        let store = create_store(
            &config.vector_store,
            config.resolve_store_token().as_deref(),
        )?;

        Self::new(embedder, llm, store, ServiceOptions::from_config(config)?).await
    }

    /// Schema of the managed collection.
    pub fn schema(&self) -> &CollectionSchema {
        &self.schema
    }

    /// Chunk, embed and store a document.
    pub async fn upload(&self, text: &str, metadata: Option<Metadata>) -> AppResult<UploadOutcome> {
        self.indexer.upload(text, metadata).await
    }

    /// Answer a question from the `top_k` (default 3) most relevant chunks.
    pub async fn query(&self, question: &str, top_k: Option<usize>) -> AppResult<QueryResult> {
        let top_k = top_k.unwrap_or(DEFAULT_TOP_K);
        validate_top_k(top_k)?;
        validate_query(question)?;

        let hits = self.retriever.retrieve(question, top_k).await?;
        let answer = self.synthesizer.synthesize(question, &hits).await?;
        let result = QueryResult::new(answer, hits);

        info!(
            top_k,
            sources = result.sources.len(),
            top_score = result.top_score,
            "Query answered"
        );

        Ok(result)
    }

    /// Drop the collection and recreate it empty with the same schema.
    /// Removes every chunk of every document.
    pub async fn delete_collection(&self) -> AppResult<()> {
        self.store.drop_collection(&self.schema.name).await?;
        self.store.ensure_collection(&self.schema).await?;
        info!(collection = %self.schema.name, "Collection reset");
        Ok(())
    }

    pub fn health(&self) -> HealthStatus {
        health()
    }
}
