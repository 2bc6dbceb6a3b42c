//! grounded CLI
//!
//! Main entry point for the grounded command-line tool.
//! Uploads documents into a vector store and answers questions from them.

mod commands;

use clap::{Parser, Subcommand};
use commands::{HealthCommand, QueryCommand, ResetCommand, UploadCommand};
use grounded_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;
use std::process::ExitCode;

/// grounded - question answering grounded on your own documents
#[derive(Parser, Debug)]
#[command(name = "grounded")]
#[command(about = "Retrieval-augmented question answering over uploaded documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file (default: ./grounded.yaml if present)
    #[arg(short, long, global = true, env = "GROUNDED_CONFIG")]
    config: Option<PathBuf>,

    /// Vector store backend (milvus, qdrant); the port defaults to 19530 or 6334
    #[arg(short, long, global = true)]
    backend: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload a document
    Upload(UploadCommand),

    /// Ask a question against the uploaded documents
    Query(QueryCommand),

    /// Delete every uploaded document
    Reset(ResetCommand),

    /// Report service liveness and version
    Health(HealthCommand),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Upload(_) => "upload",
            Commands::Query(_) => "query",
            Commands::Reset(_) => "reset",
            Commands::Health(_) => "health",
        }
    }
}

fn load_config(cli: &Cli) -> AppResult<AppConfig> {
    let config = AppConfig::load_from(cli.config.clone())?;
    Ok(config.with_overrides(
        cli.backend.clone(),
        cli.log_level.clone(),
        cli.verbose,
        cli.no_color,
        cli.json_logs,
    ))
}

#[tokio::main]
async fn main() -> ExitCode {
    // .env must be loaded before clap reads env-backed flags
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Health reports liveness only; it needs neither configuration nor backends
    if let Commands::Health(cmd) = &cli.command {
        return match cmd.execute() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{}", e);
                ExitCode::FAILURE
            }
        };
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("설정을 불러오는 중 오류가 발생했습니다: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init_logging(
        config.logging.level.as_deref(),
        !config.logging.color,
        config.logging.json,
    ) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    tracing::info!("grounded CLI starting");
    tracing::debug!(
        config_file = ?config.config_file,
        backend = %config.vector_store.backend,
        collection = %config.vector_store.collection,
        embedding = %config.embedding.provider,
        llm = %config.llm.provider,
        "Configuration loaded"
    );

    let _span = tracing::info_span!("command", name = cli.command.name()).entered();

    let result = match &cli.command {
        Commands::Upload(cmd) => cmd.execute(&config).await,
        Commands::Query(cmd) => cmd.execute(&config).await,
        Commands::Reset(cmd) => cmd.execute(&config).await,
        Commands::Health(_) => Ok(()),
    };

    match result {
        Ok(()) => {
            tracing::info!("Command completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Command failed: {:#}", e);
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_query_defaults() {
        let cli = Cli::try_parse_from(["grounded", "query", "What is the capital of France?"])
            .unwrap();
        match cli.command {
            Commands::Query(cmd) => {
                assert_eq!(cmd.top_k, 3);
                assert!(!cmd.json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "grounded", "reset", "--yes", "--backend", "qdrant", "--verbose",
        ])
        .unwrap();
        assert_eq!(cli.backend.as_deref(), Some("qdrant"));
        assert!(cli.verbose);
        assert_eq!(cli.command.name(), "reset");
    }

    #[test]
    fn test_upload_requires_text_or_file() {
        assert!(Cli::try_parse_from(["grounded", "upload"]).is_err());
        assert!(Cli::try_parse_from(["grounded", "upload", "text", "--file", "a.txt"]).is_err());

        let cli = Cli::try_parse_from([
            "grounded",
            "upload",
            "--file",
            "a.txt",
            "--metadata",
            r#"{"source":"doc1"}"#,
        ])
        .unwrap();
        match cli.command {
            Commands::Upload(cmd) => {
                assert_eq!(cmd.file, Some(PathBuf::from("a.txt")));
                assert!(cmd.text.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
