//! Error types for the grounded RAG service.
//!
//! Dependency failures are sorted into three families the caller can act on:
//! provider failures (embedding and language models), vector store failures,
//! and validation failures for caller input. The remaining variants cover
//! configuration, prompt rendering, file input and serialization.

use thiserror::Error;

/// Unified error type for the grounded workspace.
///
/// All fallible functions return `Result<T, AppError>`. Failures from
/// external collaborators are wrapped into a variant here at the adapter
/// boundary, so callers never inspect client-specific error types.
#[derive(Error, Debug)]
pub enum AppError {
    /// Embedding or language model provider failed (auth, network, quota, malformed response)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Vector store operation failed (connection, schema mismatch, missing collection)
    #[error("Vector store error: {0}")]
    Store(String),

    /// Caller-supplied input violates a documented constraint
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Prompt template errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Short machine-readable kind, used in structured logs and JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Provider(_) => "provider",
            AppError::Store(_) => "store",
            AppError::Validation(_) => "validation",
            AppError::Config(_) => "config",
            AppError::Prompt(_) => "prompt",
            AppError::Io(_) => "io",
            AppError::Serialization(_) => "serialization",
            AppError::Other(_) => "other",
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(AppError::Provider("x".into()).kind(), "provider");
        assert_eq!(AppError::Store("x".into()).kind(), "store");
        assert_eq!(AppError::Validation("x".into()).kind(), "validation");
    }

    #[test]
    fn test_display_carries_message() {
        let err = AppError::Validation("top_k must be between 1 and 10".into());
        assert_eq!(
            err.to_string(),
            "Validation error: top_k must be between 1 and 10"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: AppError = parse.unwrap_err().into();
        assert_eq!(err.kind(), "serialization");
    }
}
