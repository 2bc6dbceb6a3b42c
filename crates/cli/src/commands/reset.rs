//! Reset command handler.
//!
//! Drops the collection and recreates it empty.

use super::{build_service, print_json};
use anyhow::Context;
use clap::Args;
use grounded_core::{config::AppConfig, AppResult};
use std::io::{BufRead, Write};

const SUCCESS_MESSAGE: &str = "컬렉션이 성공적으로 삭제되었습니다.";
const FAILURE_MESSAGE: &str = "컬렉션 삭제 중 오류가 발생했습니다";
const CANCELLED_MESSAGE: &str = "취소되었습니다.";

/// Delete every uploaded document (destructive)
#[derive(Args, Debug)]
pub struct ResetCommand {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ResetCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing reset command");

        if !self.yes && !confirm()? {
            println!("{}", CANCELLED_MESSAGE);
            return Ok(());
        }

        self.run(config).await.context(FAILURE_MESSAGE)?;

        if self.json {
            print_json(&serde_json::json!({ "message": SUCCESS_MESSAGE }))?;
        } else {
            println!("{}", SUCCESS_MESSAGE);
        }

        Ok(())
    }

    async fn run(&self, config: &AppConfig) -> AppResult<()> {
        let service = build_service(config).await?;
        tracing::warn!(collection = %service.schema().name, "Dropping collection");
        service.delete_collection().await
    }
}

/// Ask on stderr; anything but "y"/"yes" declines.
fn confirm() -> AppResult<bool> {
    eprint!("컬렉션의 모든 문서가 삭제됩니다. 계속하시겠습니까? [y/N] ");
    std::io::stderr().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
