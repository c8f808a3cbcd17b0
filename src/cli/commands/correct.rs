//! `folio correct`: correct one chunk.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use crate::application::{read_document, write_document, CorrectionEngine, CorrectionOutcome};
use crate::cli::output::{output, quality_label, CommandOutput};
use crate::domain::models::{Config, Quality, RequestDocument};
use crate::infrastructure::journal::InMemoryStepJournal;

#[derive(Args, Debug)]
pub struct CorrectArgs {
    /// Chunk file (a JSON request document)
    pub chunk: PathBuf,

    /// Workspace directory holding the chunk's step journal (created if absent)
    #[arg(short, long, required_unless_present = "ephemeral")]
    pub workspace: Option<PathBuf>,

    /// The chunk holds footnotes rather than body text
    #[arg(long)]
    pub footnote: bool,

    /// Write the corrected document here instead of printing it
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Keep the journal in memory; nothing is persisted or resumed
    #[arg(long, conflicts_with = "workspace")]
    pub ephemeral: bool,
}

#[derive(Debug, Serialize)]
pub struct CorrectOutput {
    pub chunk: String,
    pub quality: Option<Quality>,
    pub rounds_run: usize,
    pub recovered_rounds: usize,
    pub remain_steps: i32,
    pub next_index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<RequestDocument>,
}

impl CorrectOutput {
    fn new(chunk: String, outcome: CorrectionOutcome, output: Option<PathBuf>) -> Self {
        let document = output.is_none().then_some(outcome.document);
        Self {
            chunk,
            quality: outcome.state.quality,
            rounds_run: outcome.rounds_run,
            recovered_rounds: outcome.recovered_rounds,
            remain_steps: outcome.state.remain_steps,
            next_index: outcome.state.next_index,
            output,
            document,
        }
    }
}

impl CommandOutput for CorrectOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "Corrected {}: quality {}, {} round(s) run, {} resumed, {} step(s) left",
            self.chunk,
            quality_label(self.quality),
            self.rounds_run,
            self.recovered_rounds,
            self.remain_steps
        )];

        if let Some(path) = &self.output {
            lines.push(format!("Wrote {}", path.display()));
        } else if let Some(document) = &self.document {
            lines.push(serde_json::to_string_pretty(document).unwrap_or_default());
        }

        lines.join("\n")
    }
}

pub async fn execute(args: CorrectArgs, config: &Config, json_mode: bool) -> Result<()> {
    let original = read_document(&args.chunk).await?;
    let chunk = args
        .chunk
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("chunk")
        .to_string();

    let engine = crate::cli::build_engine(config)?;
    let outcome = run(&engine, &args, &chunk, &original).await?;

    if let Some(path) = &args.output {
        write_document(path, &outcome.document).await?;
    }

    output(&CorrectOutput::new(chunk, outcome, args.output), json_mode);
    Ok(())
}

async fn run(
    engine: &CorrectionEngine,
    args: &CorrectArgs,
    chunk: &str,
    original: &RequestDocument,
) -> Result<CorrectionOutcome> {
    let outcome = match &args.workspace {
        Some(workspace) => {
            engine
                .correct_in_workspace(chunk, workspace, original, args.footnote)
                .await
        }
        None => {
            let journal = InMemoryStepJournal::new();
            engine.correct(chunk, &journal, original, args.footnote).await
        }
    };

    outcome.with_context(|| format!("Failed to correct {}", args.chunk.display()))
}
