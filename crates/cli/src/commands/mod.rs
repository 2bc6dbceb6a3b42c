//! Command handlers for the grounded CLI.
//!
//! Each subcommand maps to one operation of the RAG service.

pub mod health;
pub mod query;
pub mod reset;
pub mod upload;

pub use health::HealthCommand;
pub use query::QueryCommand;
pub use reset::ResetCommand;
pub use upload::UploadCommand;

use grounded_core::{config::AppConfig, AppError, AppResult};
use grounded_rag::{validate_store_settings, RagService};
use serde::Serialize;

/// Validate the configuration and wire the service from it.
///
/// Each CLI invocation is its own process, so a backend that keeps chunks
/// in memory would lose every upload before the next command runs.
pub async fn build_service(config: &AppConfig) -> AppResult<RagService> {
    config.validate()?;

    let backend = validate_store_settings(&config.vector_store)?;
    if !backend.is_persistent() {
        return Err(AppError::Config(format!(
            "The '{}' backend only lives for one process; use milvus or qdrant from the CLI",
            backend.as_str()
        )));
    }

    RagService::from_config(config).await
}

/// Print a value to stdout as pretty JSON.
pub(crate) fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
