//! Retrieval-augmented question answering.
//!
//! Documents are split into overlapping chunks, embedded, and stored in a
//! vector store. Questions are embedded with the same provider, the nearest
//! chunks are retrieved, and an LLM answers from them alone.
//!
//! # Example
//! ```no_run
//! use grounded_core::AppConfig;
//! use grounded_rag::RagService;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! let service = RagService::from_config(&config).await?;
//!
//! let uploaded = service
//!     .upload("The capital of France is Paris.", None)
//!     .await?;
//! println!("stored {} chunks", uploaded.chunk_count);
//!
//! let result = service.query("What is the capital of France?", Some(1)).await?;
//! println!("{}", result.answer);
//! # Ok(())
//! # }
//! ```

pub mod answer;
pub mod chunk;
pub mod embeddings;
pub mod indexer;
pub mod retriever;
pub mod service;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

pub use answer::{QueryResult, SourceRef};
pub use chunk::{ChunkConfig, RecursiveCharacterSplitter};
pub use embeddings::{create_provider, EmbeddingProvider, MockProvider};
pub use indexer::Indexer;
pub use retriever::Retriever;
pub use service::{health, HealthStatus, RagService, ServiceOptions};
pub use store::{create_store, validate_store_settings, MemoryStore, StoreBackend, VectorStore};
pub use types::{Chunk, Metadata, UploadOutcome, DEFAULT_TOP_K, MAX_TOP_K};
