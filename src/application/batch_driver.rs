//! Runs the correction engine over a directory of chunks.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::fs;
use tracing::{error, info, instrument};

use super::chunk_io::{read_document, write_document};
use super::correction_loop::{CorrectionEngine, CorrectionOutcome};
use crate::domain::models::Quality;

const TEXT_GROUP: &str = "text";
const FOOTNOTE_GROUP: &str = "footnote";

/// One chunk file to correct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkJob {
    /// `text` or `footnote`
    pub group: String,
    /// File stem, unique within the group
    pub stem: String,
    pub input: PathBuf,
    pub is_footnote: bool,
}

impl ChunkJob {
    /// Identifier used in logs and reports: `<group>/<stem>`.
    pub fn id(&self) -> String {
        format!("{}/{}", self.group, self.stem)
    }

    pub fn workspace(&self, root: &Path) -> PathBuf {
        root.join(&self.group).join(&self.stem)
    }

    pub fn output(&self, root: &Path) -> PathBuf {
        root.join(&self.group).join(format!("{}.json", self.stem))
    }
}

/// Outcome of one chunk in a batch.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChunkStatus {
    Corrected {
        quality: Option<Quality>,
        rounds_run: usize,
        recovered_rounds: usize,
        remain_steps: i32,
    },
    Failed {
        error: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct ChunkReport {
    pub chunk: String,
    pub output: PathBuf,
    #[serde(flatten)]
    pub status: ChunkStatus,
}

/// Per-chunk results of a batch, sorted by chunk id.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub chunks: Vec<ChunkReport>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.chunks.len() - self.failed()
    }

    pub fn failed(&self) -> usize {
        self.chunks
            .iter()
            .filter(|report| matches!(report.status, ChunkStatus::Failed { .. }))
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }
}

/// Find every chunk under `input_dir`.
///
/// `text/` and `footnote/` subdirectories are used when present; otherwise
/// every `*.json` file directly in `input_dir` is a text chunk.
pub async fn discover_chunks(input_dir: &Path) -> Result<Vec<ChunkJob>> {
    let text_dir = input_dir.join(TEXT_GROUP);
    let footnote_dir = input_dir.join(FOOTNOTE_GROUP);
    let grouped = is_dir(&text_dir).await || is_dir(&footnote_dir).await;

    let mut jobs = Vec::new();
    if grouped {
        for (group, dir, is_footnote) in [
            (TEXT_GROUP, text_dir, false),
            (FOOTNOTE_GROUP, footnote_dir, true),
        ] {
            if is_dir(&dir).await {
                jobs.extend(jobs_in(&dir, group, is_footnote).await?);
            }
        }
    } else {
        jobs.extend(jobs_in(input_dir, TEXT_GROUP, false).await?);
    }

    Ok(jobs)
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}

async fn jobs_in(dir: &Path, group: &str, is_footnote: bool) -> Result<Vec<ChunkJob>> {
    let mut entries = fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to list {}", dir.display()))?;

    let mut jobs = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .with_context(|| format!("Failed to list {}", dir.display()))?
    {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        if !entry.file_type().await.is_ok_and(|t| t.is_file()) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        jobs.push(ChunkJob {
            group: group.to_string(),
            stem: stem.to_string(),
            input: path.clone(),
            is_footnote,
        });
    }

    jobs.sort_by(|a, b| a.stem.cmp(&b.stem));
    Ok(jobs)
}

/// Corrects chunks with bounded concurrency.
pub struct BatchDriver {
    engine: Arc<CorrectionEngine>,
    max_concurrent: usize,
}

impl BatchDriver {
    pub fn new(engine: Arc<CorrectionEngine>, max_concurrent: usize) -> Self {
        Self {
            engine,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Correct every chunk in `input_dir`.
    ///
    /// A failing chunk is recorded in the report and does not stop the rest.
    #[instrument(skip(self), fields(max_concurrent = self.max_concurrent))]
    pub async fn run(
        &self,
        input_dir: &Path,
        workspace_root: &Path,
        output_root: &Path,
    ) -> Result<BatchReport> {
        let jobs = discover_chunks(input_dir).await?;
        info!(chunks = jobs.len(), "starting batch");

        let mut chunks: Vec<ChunkReport> = stream::iter(jobs)
            .map(|job| self.run_chunk(job, workspace_root, output_root))
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;
        chunks.sort_by(|a, b| a.chunk.cmp(&b.chunk));

        let report = BatchReport { chunks };
        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "batch finished"
        );
        Ok(report)
    }

    async fn run_chunk(&self, job: ChunkJob, workspace_root: &Path, output_root: &Path) -> ChunkReport {
        let chunk = job.id();
        let output = job.output(output_root);

        let status = match self.correct_chunk(&job, workspace_root, &output).await {
            Ok(outcome) => ChunkStatus::Corrected {
                quality: outcome.quality(),
                rounds_run: outcome.rounds_run,
                recovered_rounds: outcome.recovered_rounds,
                remain_steps: outcome.state.remain_steps,
            },
            Err(err) => {
                error!(chunk = %chunk, "chunk failed: {:#}", err);
                ChunkStatus::Failed {
                    error: format!("{err:#}"),
                }
            }
        };

        ChunkReport {
            chunk,
            output,
            status,
        }
    }

    async fn correct_chunk(
        &self,
        job: &ChunkJob,
        workspace_root: &Path,
        output: &Path,
    ) -> Result<CorrectionOutcome> {
        let original = read_document(&job.input).await?;
        let outcome = self
            .engine
            .correct_in_workspace(&job.id(), &job.workspace(workspace_root), &original, job.is_footnote)
            .await?;
        write_document(output, &outcome.document).await?;
        Ok(outcome)
    }
}
