//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::batch::BatchArgs;
use super::commands::correct::CorrectArgs;
use super::commands::status::StatusArgs;

#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(about = "Folio - quality-gated OCR layout correction", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file to use instead of .folio/config.yaml and .folio/local.yaml
    #[arg(short, long, global = true, env = "FOLIO_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Correct a single chunk, resuming from its workspace journal
    Correct(CorrectArgs),

    /// Correct every chunk in a directory
    Batch(BatchArgs),

    /// Show the recorded progress of a chunk workspace
    Status(StatusArgs),
}
