//! `folio batch`: correct every chunk in a directory.

use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::application::{BatchDriver, BatchReport, ChunkStatus};
use crate::cli::output::{output, quality_label, table, CommandOutput};
use crate::domain::models::Config;

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Directory of chunk files, optionally split into text/ and footnote/
    pub input_dir: PathBuf,

    /// Root for per-chunk workspaces
    #[arg(short, long)]
    pub workspace: PathBuf,

    /// Where corrected chunks are written (default: <workspace>/output)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Override max_concurrent_chunks from the configuration
    #[arg(long)]
    pub concurrency: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct BatchOutput {
    pub output_dir: PathBuf,
    pub succeeded: usize,
    pub failed: usize,
    #[serde(flatten)]
    pub report: BatchReport,
}

impl CommandOutput for BatchOutput {
    fn to_human(&self) -> String {
        if self.report.chunks.is_empty() {
            return "No chunks found.".to_string();
        }

        let mut t = table(["Chunk", "Result", "Quality", "Rounds", "Steps left"]);
        for chunk in &self.report.chunks {
            match &chunk.status {
                ChunkStatus::Corrected {
                    quality,
                    rounds_run,
                    recovered_rounds,
                    remain_steps,
                } => t.add_row(vec![
                    chunk.chunk.clone(),
                    "ok".to_string(),
                    quality_label(*quality).to_string(),
                    format!("{rounds_run} (+{recovered_rounds} resumed)"),
                    remain_steps.to_string(),
                ]),
                ChunkStatus::Failed { error } => t.add_row(vec![
                    chunk.chunk.clone(),
                    format!("failed: {error}"),
                    "-".to_string(),
                    "-".to_string(),
                    "-".to_string(),
                ]),
            };
        }

        format!(
            "{t}\n{} succeeded, {} failed. Output in {}",
            self.succeeded,
            self.failed,
            self.output_dir.display()
        )
    }
}

pub async fn execute(args: BatchArgs, config: &Config, json_mode: bool) -> Result<()> {
    let engine = Arc::new(crate::cli::build_engine(config)?);
    let concurrency = args.concurrency.unwrap_or(config.max_concurrent_chunks);
    let output_dir = args
        .output_dir
        .unwrap_or_else(|| args.workspace.join("output"));

    let driver = BatchDriver::new(engine, concurrency);
    let report = driver
        .run(&args.input_dir, &args.workspace, &output_dir)
        .await?;

    let result = BatchOutput {
        output_dir,
        succeeded: report.succeeded(),
        failed: report.failed(),
        report,
    };
    output(&result, json_mode);

    if result.failed > 0 {
        bail!(
            "{} of {} chunk(s) failed",
            result.failed,
            result.report.chunks.len()
        );
    }
    Ok(())
}
