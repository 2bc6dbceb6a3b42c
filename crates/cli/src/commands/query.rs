//! Query command handler.

use super::{build_service, print_json};
use anyhow::Context;
use clap::Args;
use grounded_core::{config::AppConfig, AppResult};
use grounded_rag::{QueryResult, DEFAULT_TOP_K};

const FAILURE_MESSAGE: &str = "쿼리 처리 중 오류가 발생했습니다";

/// Ask a question against the uploaded documents
#[derive(Args, Debug)]
pub struct QueryCommand {
    /// Question text
    pub query: String,

    /// Number of chunks to retrieve (1-10)
    #[arg(short = 'k', long, default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl QueryCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!(top_k = self.top_k, "Executing query command");

        let result = self.run(config).await.context(FAILURE_MESSAGE)?;

        if self.json {
            print_json(&result)?;
        } else {
            print_human(&result);
        }

        Ok(())
    }

    async fn run(&self, config: &AppConfig) -> AppResult<QueryResult> {
        let service = build_service(config).await?;
        service.query(&self.query, Some(self.top_k)).await
    }
}

fn print_human(result: &QueryResult) {
    println!("답변:");
    println!("{}", result.answer);
    println!();

    if result.sources.is_empty() {
        println!("출처: (없음)");
        return;
    }

    println!("출처:");
    for (i, source) in result.sources.iter().enumerate() {
        println!("[{}] {}", i + 1, source.content);
        if !source.metadata.is_empty() {
            println!("    {}", serde_json::Value::Object(source.metadata.clone()));
        }
    }
}
