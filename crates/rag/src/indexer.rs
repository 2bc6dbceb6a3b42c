//! Document ingestion: chunk, embed, store.

use crate::chunk::RecursiveCharacterSplitter;
use crate::embeddings::EmbeddingProvider;
use crate::store::{StoreRecord, VectorStore};
use crate::types::{Chunk, Metadata, UploadOutcome};
use grounded_core::{AppError, AppResult};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Writes uploaded documents into a collection.
///
/// An upload makes one embedding call and one upsert call. The two steps
/// are not atomic: a failed upsert may leave some chunks behind.
pub struct Indexer {
    splitter: RecursiveCharacterSplitter,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    collection: String,
}

impl Indexer {
    pub fn new(
        splitter: RecursiveCharacterSplitter,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            splitter,
            embedder,
            store,
            collection: collection.into(),
        }
    }

    /// Split `text` into ordered chunks carrying merged metadata.
    pub fn chunk(&self, document_id: &str, text: &str, metadata: &Metadata) -> Vec<Chunk> {
        self.splitter
            .split(text)
            .into_iter()
            .enumerate()
            .map(|(index, piece)| Chunk::new(document_id, index, piece, metadata))
            .collect()
    }

    /// Upload a document. Returns the generated document id even when the
    /// text produced no chunks.
    pub async fn upload(&self, text: &str, metadata: Option<Metadata>) -> AppResult<UploadOutcome> {
        let document_id = Uuid::new_v4().to_string();
        let metadata = metadata.unwrap_or_default();

        let chunks = self.chunk(&document_id, text, &metadata);
        if chunks.is_empty() {
            info!(%document_id, "Document produced no chunks; nothing written");
            return Ok(UploadOutcome {
                document_id,
                chunk_count: 0,
            });
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        debug!(%document_id, chunks = texts.len(), "Embedding chunks");
        let vectors = self.embedder.embed_batch(&texts).await?;

        if vectors.len() != chunks.len() {
            return Err(AppError::Provider(format!(
                "{} returned {} embeddings for {} chunks",
                self.embedder.provider_name(),
                vectors.len(),
                chunks.len()
            )));
        }

        let records: Vec<StoreRecord> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| StoreRecord {
                id: Uuid::new_v4().to_string(),
                text: chunk.text,
                vector,
                metadata: chunk.metadata,
            })
            .collect();

        let written = self.store.upsert(&self.collection, records).await?;

        info!(
            %document_id,
            chunks = written,
            collection = %self.collection,
            "Uploaded document"
        );

        Ok(UploadOutcome {
            document_id,
            chunk_count: written,
        })
    }
}
