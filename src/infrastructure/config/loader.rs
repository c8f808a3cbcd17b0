use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid max_concurrent_chunks: {0}. Must be between 1 and 64")]
    InvalidMaxConcurrentChunks(usize),

    #[error("Invalid initial_budget: {0}. Cannot be negative")]
    InvalidInitialBudget(i32),

    #[error("Invalid layouts_count: {0}. Must be at least 1")]
    InvalidLayoutsCount(usize),

    #[error("Invalid quality deltas: {0}")]
    InvalidDeltas(String),

    #[error("Invalid rate limit: {0}. Must be positive")]
    InvalidRateLimit(f64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),

    #[error("Invalid burst_size: {0}. Must be at least 1")]
    InvalidBurstSize(u32),

    #[error("Invalid max_retries: {0}. Cannot be 0")]
    InvalidMaxRetries(u32),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must not exceed max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for the current directory
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .folio/config.yaml (project config)
    /// 3. .folio/local.yaml (project local overrides, optional)
    /// 4. Environment variables (FOLIO_* prefix, `__` separates nested keys)
    pub fn load() -> Result<Config> {
        Self::load_from_dir(".")
    }

    /// Load configuration rooted at `dir` instead of the current directory
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Config> {
        let folio_dir = dir.as_ref().join(".folio");
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(folio_dir.join("config.yaml")))
            .merge(Yaml::file(folio_dir.join("local.yaml")))
            .merge(Env::prefixed("FOLIO_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring env overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("FOLIO_").split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.max_concurrent_chunks == 0 || config.max_concurrent_chunks > 64 {
            return Err(ConfigError::InvalidMaxConcurrentChunks(
                config.max_concurrent_chunks,
            ));
        }

        // Correction loop
        if config.correction.initial_budget < 0 {
            return Err(ConfigError::InvalidInitialBudget(
                config.correction.initial_budget,
            ));
        }

        if config.correction.layouts_count == 0 {
            return Err(ConfigError::InvalidLayoutsCount(
                config.correction.layouts_count,
            ));
        }

        config
            .correction
            .deltas
            .to_schedule()
            .map_err(|e| ConfigError::InvalidDeltas(e.to_string()))?;

        // Oracle
        if config.oracle.model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "oracle.model cannot be empty".to_string(),
            ));
        }

        if config.oracle.max_tokens == 0 {
            return Err(ConfigError::ValidationFailed(
                "oracle.max_tokens must be at least 1".to_string(),
            ));
        }

        if config.oracle.timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "oracle.timeout_secs must be at least 1".to_string(),
            ));
        }

        // Logging
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidLogRotation(
                config.logging.rotation.clone(),
            ));
        }

        // Rate limit
        if config.rate_limit.requests_per_second <= 0.0 {
            return Err(ConfigError::InvalidRateLimit(
                config.rate_limit.requests_per_second,
            ));
        }

        if config.rate_limit.burst_size == 0 {
            return Err(ConfigError::InvalidBurstSize(config.rate_limit.burst_size));
        }

        // Retry
        if config.retry.max_retries == 0 {
            return Err(ConfigError::InvalidMaxRetries(config.retry.max_retries));
        }

        if config.retry.initial_backoff_ms > config.retry.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                config.retry.initial_backoff_ms,
                config.retry.max_backoff_ms,
            ));
        }

        Ok(())
    }
}
