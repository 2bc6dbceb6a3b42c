//! Vector store abstraction for document chunks.
//!
//! Defines a trait for backend-agnostic vector storage and retrieval, with
//! adapters for Milvus (REST), Qdrant (gRPC) and an in-process store.

pub mod memory;
pub mod milvus;
pub mod qdrant;
pub mod types;

pub use memory::MemoryStore;
pub use milvus::MilvusStore;
pub use qdrant::QdrantStore;
pub use types::{
    AnnIndex, CollectionSchema, DistanceMetric, ScoredRecord, StoreBackend, StoreRecord,
};

use grounded_core::config::VectorStoreSettings;
use grounded_core::AppResult;
use std::sync::Arc;

/// Trait for vector store backends.
///
/// Implementations must support:
/// - Idempotent collection creation (a concurrent duplicate create is success)
/// - Inserting records
/// - Top-k similarity search, best match first
/// - Idempotent collection removal
#[async_trait::async_trait]
pub trait VectorStore: Send + Sync {
    /// Backend name (e.g., "milvus", "qdrant", "memory").
    fn backend_name(&self) -> &str;

    /// Create the collection if it does not exist.
    async fn ensure_collection(&self, schema: &CollectionSchema) -> AppResult<()>;

    /// Insert records into a collection. Returns the number written.
    async fn upsert(&self, collection: &str, records: Vec<StoreRecord>) -> AppResult<usize>;

    /// Search for the `top_k` records closest to `query`.
    ///
    /// Returns fewer than `top_k` hits when the collection holds fewer
    /// records, and nothing at all for `top_k == 0`.
    async fn search(
        &self,
        collection: &str,
        query: &[f32],
        top_k: usize,
        metric: DistanceMetric,
    ) -> AppResult<Vec<ScoredRecord>>;

    /// Drop a collection. Dropping a missing collection succeeds.
    async fn drop_collection(&self, collection: &str) -> AppResult<()>;
}

/// Check the store settings with the same parsers [`create_store`] and the
/// service use, returning the selected backend.
pub fn validate_store_settings(settings: &VectorStoreSettings) -> AppResult<StoreBackend> {
    let backend = StoreBackend::parse(&settings.backend)?;
    DistanceMetric::parse(&settings.distance)?;
    AnnIndex::from_settings(&settings.index)?;
    Ok(backend)
}

/// Create the configured vector store backend.
pub fn create_store(
    settings: &VectorStoreSettings,
    token: Option<&str>,
) -> AppResult<Arc<dyn VectorStore>> {
    let backend = StoreBackend::parse(&settings.backend)?;
    let url = endpoint(settings, backend);

    tracing::debug!(backend = backend.as_str(), url = %url, "Creating vector store");

    match backend {
        StoreBackend::Milvus => {
            let search_index = AnnIndex::from_settings(&settings.index)?;
            Ok(Arc::new(MilvusStore::new(url, token, search_index)?))
        }
        StoreBackend::Qdrant => Ok(Arc::new(QdrantStore::new(&url, token)?)),
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}

/// Base URL of the backend; an unset port falls back to the backend default.
fn endpoint(settings: &VectorStoreSettings, backend: StoreBackend) -> String {
    match settings.port.or(backend.default_port()) {
        Some(port) => format!("http://{}:{}", settings.host, port),
        None => format!("http://{}", settings.host),
    }
}
