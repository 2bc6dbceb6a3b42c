//! Embedding generation.
//!
//! Provider-agnostic embedding interface with OpenAI, Ollama and an offline
//! trigram adapter.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
pub use providers::{MockProvider, OllamaProvider, OpenAiProvider};
