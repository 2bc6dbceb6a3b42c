//! Query-time similarity search.

use crate::embeddings::EmbeddingProvider;
use crate::store::{DistanceMetric, ScoredRecord, VectorStore};
use crate::types::MAX_TOP_K;
use grounded_core::{AppError, AppResult};
use std::sync::Arc;
use tracing::debug;

/// Reject a `top_k` outside `1..=MAX_TOP_K`.
pub fn validate_top_k(top_k: usize) -> AppResult<()> {
    if (1..=MAX_TOP_K).contains(&top_k) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "top_k must be between 1 and {}, got {}",
            MAX_TOP_K, top_k
        )))
    }
}

/// Reject a question with no text to embed.
pub fn validate_query(query: &str) -> AppResult<()> {
    if query.trim().is_empty() {
        return Err(AppError::Validation("Question must not be blank".to_string()));
    }
    Ok(())
}

/// Embeds a query and fetches the nearest chunks.
///
/// Must share its embedding provider with the [`Indexer`](crate::Indexer)
/// that filled the collection, or query and chunk vectors live in
/// different spaces.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    collection: String,
    metric: DistanceMetric,
}

impl Retriever {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        collection: impl Into<String>,
        metric: DistanceMetric,
    ) -> Self {
        Self {
            embedder,
            store,
            collection: collection.into(),
            metric,
        }
    }

    /// Retrieve up to `top_k` chunks, best match first.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> AppResult<Vec<ScoredRecord>> {
        validate_top_k(top_k)?;
        validate_query(query)?;

        let vector = self.embedder.embed(query).await?;
        let hits = self
            .store
            .search(&self.collection, &vector, top_k, self.metric)
            .await?;

        debug!(
            hits = hits.len(),
            top_score = hits.first().map(|h| h.score),
            metric = %self.metric,
            "Retrieved chunks"
        );

        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_k_bounds() {
        assert!(validate_top_k(1).is_ok());
        assert!(validate_top_k(MAX_TOP_K).is_ok());
        assert!(matches!(validate_top_k(0), Err(AppError::Validation(_))));
        assert!(matches!(
            validate_top_k(MAX_TOP_K + 1),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_blank_query_rejected() {
        assert!(validate_query("Rust").is_ok());
        assert!(matches!(validate_query(""), Err(AppError::Validation(_))));
        assert!(matches!(validate_query(" \n\t"), Err(AppError::Validation(_))));
    }
}
