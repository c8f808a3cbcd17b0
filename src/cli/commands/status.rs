//! `folio status`: replay a chunk workspace without calling the oracle.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use crate::application::{CorrectionEngine, CorrectionSettings};
use crate::cli::output::{output, quality_label, table, CommandOutput};
use crate::domain::models::{Config, Quality};

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Chunk workspace directory
    pub workspace: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub workspace: PathBuf,
    pub rounds: usize,
    pub quality: Option<Quality>,
    pub remain_steps: i32,
    pub next_index: u32,
    pub finished: bool,
    pub layouts: usize,
}

impl CommandOutput for StatusOutput {
    fn to_human(&self) -> String {
        let mut t = table(["Field", "Value"]);
        t.add_row(vec!["Workspace".to_string(), self.workspace.display().to_string()]);
        t.add_row(vec!["Rounds recorded".to_string(), self.rounds.to_string()]);
        t.add_row(vec!["Quality".to_string(), quality_label(self.quality).to_string()]);
        t.add_row(vec!["Steps left".to_string(), self.remain_steps.to_string()]);
        t.add_row(vec!["Next step".to_string(), self.next_index.to_string()]);
        t.add_row(vec!["Layouts".to_string(), self.layouts.to_string()]);
        t.add_row(vec![
            "Finished".to_string(),
            if self.finished { "yes" } else { "no" }.to_string(),
        ]);
        t.to_string()
    }
}

pub async fn execute(args: StatusArgs, config: &Config, json_mode: bool) -> Result<()> {
    let settings = CorrectionSettings::from_config(&config.correction)
        .context("Invalid correction settings")?;
    let recovered = CorrectionEngine::inspect(&settings, &args.workspace)
        .await
        .with_context(|| format!("Failed to read workspace {}", args.workspace.display()))?;

    let result = StatusOutput {
        workspace: args.workspace,
        rounds: recovered.rounds,
        quality: recovered.state.quality,
        remain_steps: recovered.state.remain_steps,
        next_index: recovered.state.next_index,
        finished: !recovered.state.should_continue(),
        layouts: recovered.document.len(),
    };
    output(&result, json_mode);
    Ok(())
}
