//! Embedding provider trait and factory.

use super::providers::{MockProvider, OllamaProvider, OpenAiProvider};
use grounded_core::config::EmbeddingSettings;
use grounded_core::{AppError, AppResult};
use std::sync::Arc;

/// Trait for embedding providers.
///
/// `embed_batch` returns exactly one vector per input text, in input order,
/// all of `dimensions()` length. Failures are `AppError::Provider`.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "mock", "openai", "ollama")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Provider("No embedding returned".to_string()))
    }
}

/// Create an embedding provider based on configuration.
pub fn create_provider(
    settings: &EmbeddingSettings,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    tracing::debug!(
        provider = %settings.provider,
        model = %settings.model,
        dimensions = settings.dimensions,
        "Creating embedding provider"
    );

    match settings.provider.as_str() {
        "mock" => Ok(Arc::new(MockProvider::new(settings.dimensions))),

        "openai" => {
            let key = api_key.filter(|k| !k.trim().is_empty()).ok_or_else(|| {
                AppError::Config("OpenAI embeddings require OPENAI_API_KEY".to_string())
            })?;
            Ok(Arc::new(OpenAiProvider::new(settings, key)?))
        }

        "ollama" => Ok(Arc::new(OllamaProvider::new(settings)?)),

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: openai, ollama, mock",
            settings.provider
        ))),
    }
}

/// Check a provider response: one vector per text, each of the expected length.
pub(crate) fn check_embeddings(
    provider: &str,
    embeddings: &[Vec<f32>],
    expected_count: usize,
    expected_dimensions: usize,
) -> AppResult<()> {
    if embeddings.len() != expected_count {
        return Err(AppError::Provider(format!(
            "{} returned {} embeddings for {} texts",
            provider,
            embeddings.len(),
            expected_count
        )));
    }

    if let Some(bad) = embeddings.iter().find(|e| e.len() != expected_dimensions) {
        return Err(AppError::Provider(format!(
            "Unexpected embedding dimensions from {}: got {}, expected {}",
            provider,
            bad.len(),
            expected_dimensions
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(provider: &str) -> EmbeddingSettings {
        EmbeddingSettings {
            provider: provider.to_string(),
            dimensions: 384,
            ..EmbeddingSettings::default()
        }
    }

    #[test]
    fn test_create_mock_provider() {
        let provider = create_provider(&settings("mock"), None).unwrap();
        assert_eq!(provider.provider_name(), "mock");
        assert_eq!(provider.model_name(), "trigram-v1");
        assert_eq!(provider.dimensions(), 384);
    }

    #[test]
    fn test_openai_requires_key() {
        let err = create_provider(&settings("openai"), None).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_create_unknown_provider() {
        let result = create_provider(&settings("gguf"), None);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Unknown embedding provider"));
    }

    #[tokio::test]
    async fn test_provider_embed_single() {
        let provider = create_provider(&settings("mock"), None).unwrap();

        let embedding = provider.embed("test text").await.unwrap();
        assert_eq!(embedding.len(), 384);
    }

    #[test]
    fn test_check_embeddings_count_and_dimension() {
        let good = vec![vec![0.0; 3], vec![0.0; 3]];
        assert!(check_embeddings("test", &good, 2, 3).is_ok());
        assert!(check_embeddings("test", &good, 3, 3).is_err());

        let bad = vec![vec![0.0; 3], vec![0.0; 2]];
        let err = check_embeddings("test", &bad, 2, 3).unwrap_err();
        assert!(matches!(err, AppError::Provider(_)));
    }
}
