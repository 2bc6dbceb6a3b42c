//! Health command handler.

use super::print_json;
use clap::Args;
use grounded_core::AppResult;

/// Report service liveness and version
#[derive(Args, Debug)]
pub struct HealthCommand {}

impl HealthCommand {
    /// Print `{status, version}`. Touches no backend.
    pub fn execute(&self) -> AppResult<()> {
        print_json(&grounded_rag::health())
    }
}
