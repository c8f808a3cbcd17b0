//! Command-line interface

pub mod commands;
pub mod output;
pub mod types;

pub use types::{Cli, Commands};

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use crate::adapters::oracle::LlmOracle;
use crate::application::{CorrectionEngine, CorrectionSettings};
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;

/// Load configuration from `path`, or the project's `.folio/` files.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// Correction engine talking to the configured LLM oracle.
pub fn build_engine(config: &Config) -> Result<CorrectionEngine> {
    let settings = CorrectionSettings::from_config(&config.correction)
        .context("Invalid correction settings")?;
    let oracle = LlmOracle::from_config(config)
        .context("Failed to set up the correction oracle (is ANTHROPIC_API_KEY set?)")?;

    Ok(CorrectionEngine::new(Arc::new(oracle), settings))
}

/// Report a command failure and exit with a non-zero status.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({ "error": format!("{err:#}") });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
