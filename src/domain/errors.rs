//! Domain errors for the correction engine.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use super::models::quality::{CorrectionState, Quality};

/// Errors raised by a step journal backend.
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("Journal I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed step record {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Step record index out of range: {}", path.display())]
    InvalidIndex { path: PathBuf },

    #[error("Step {0} already exists in the journal")]
    IndexExists(u32),
}

/// Errors raised by a correction oracle.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("Oracle transport error: {0}")]
    Transport(String),

    #[error("Oracle response could not be parsed: {0}")]
    Parse(String),

    #[error("Oracle returned an empty response")]
    EmptyResponse,
}

impl OracleError {
    /// Parse and empty-response failures are never worth retrying.
    pub const fn is_parse_failure(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::EmptyResponse)
    }

    /// Only transport failures may succeed on a later attempt.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Where in a chunk's correction a failure happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkContext {
    pub chunk: String,
    pub round: u32,
    pub quality: Option<Quality>,
    pub remain_steps: i32,
}

impl ChunkContext {
    pub fn new(chunk: impl Into<String>, state: &CorrectionState) -> Self {
        Self {
            chunk: chunk.into(),
            round: state.next_index,
            quality: state.quality,
            remain_steps: state.remain_steps,
        }
    }
}

impl fmt::Display for ChunkContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "chunk '{}' round {} (quality: {}, remaining steps: {})",
            self.chunk,
            self.round,
            self.quality.map_or("none", |q| q.as_str()),
            self.remain_steps
        )
    }
}

/// Errors surfaced by the correction loop.
#[derive(Debug, Error)]
pub enum CorrectionError {
    #[error("Oracle failed for {context}: {source}")]
    Oracle {
        context: ChunkContext,
        #[source]
        source: OracleError,
    },

    #[error("Journal failed for {context}: {source}")]
    Journal {
        context: ChunkContext,
        #[source]
        source: JournalError,
    },

    #[error("Chunk workspace {} is unusable: {source}", path.display())]
    Workspace {
        path: PathBuf,
        #[source]
        source: JournalError,
    },

    #[error("Duplicate layout id '{id}' in chunk '{chunk}'")]
    DuplicateLayoutId { chunk: String, id: String },

    #[error("Invalid step schedule: {0}")]
    InvalidSchedule(String),
}

impl CorrectionError {
    /// Context of the failing round, when the failure happened inside the loop.
    pub const fn context(&self) -> Option<&ChunkContext> {
        match self {
            Self::Oracle { context, .. } | Self::Journal { context, .. } => Some(context),
            Self::Workspace { .. } | Self::DuplicateLayoutId { .. } | Self::InvalidSchedule(_) => {
                None
            }
        }
    }
}

pub type CorrectionResult<T> = Result<T, CorrectionError>;
