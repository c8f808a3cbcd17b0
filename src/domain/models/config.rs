use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::quality::{Quality, StepSchedule};
use crate::domain::errors::CorrectionError;

/// Main configuration structure for Folio
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Maximum number of chunks corrected concurrently by `folio batch` (1-64)
    #[serde(default = "default_max_concurrent_chunks")]
    pub max_concurrent_chunks: usize,

    /// Correction loop configuration
    #[serde(default)]
    pub correction: CorrectionConfig,

    /// Oracle (LLM) configuration
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Retry policy configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

const fn default_max_concurrent_chunks() -> usize {
    4
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_chunks: default_max_concurrent_chunks(),
            correction: CorrectionConfig::default(),
            oracle: OracleConfig::default(),
            logging: LoggingConfig::default(),
            rate_limit: RateLimitConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

/// Correction loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CorrectionConfig {
    /// Round budget a chunk starts with
    #[serde(default = "default_initial_budget")]
    pub initial_budget: i32,

    /// Layout-count hint passed to the oracle
    #[serde(default = "default_layouts_count")]
    pub layouts_count: usize,

    /// Number of circled-number marker glyphs passed to the oracle
    #[serde(default = "default_marks_count")]
    pub marks_count: usize,

    /// Budget deltas per grade
    #[serde(default)]
    pub deltas: QualityDeltas,
}

const fn default_initial_budget() -> i32 {
    2
}

const fn default_layouts_count() -> usize {
    4
}

const fn default_marks_count() -> usize {
    6
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            initial_budget: default_initial_budget(),
            layouts_count: default_layouts_count(),
            marks_count: default_marks_count(),
            deltas: QualityDeltas::default(),
        }
    }
}

/// Budget delta granted for each grade passed through on an improvement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct QualityDeltas {
    #[serde(default = "default_invalid_delta")]
    pub invalid: i32,
    #[serde(default = "default_poor_delta")]
    pub poor: i32,
    #[serde(default = "default_fair_delta")]
    pub fair: i32,
    #[serde(default)]
    pub good: i32,
    #[serde(default)]
    pub perfect: i32,
}

const fn default_invalid_delta() -> i32 {
    5
}

const fn default_poor_delta() -> i32 {
    4
}

const fn default_fair_delta() -> i32 {
    3
}

impl Default for QualityDeltas {
    fn default() -> Self {
        Self {
            invalid: default_invalid_delta(),
            poor: default_poor_delta(),
            fair: default_fair_delta(),
            good: 0,
            perfect: 0,
        }
    }
}

impl QualityDeltas {
    /// Build the step schedule these deltas describe.
    pub fn to_schedule(&self) -> Result<StepSchedule, CorrectionError> {
        StepSchedule::new(vec![
            (Quality::Invalid, self.invalid),
            (Quality::Poor, self.poor),
            (Quality::Fair, self.fair),
            (Quality::Good, self.good),
            (Quality::Perfect, self.perfect),
        ])
    }
}

/// Oracle configuration (Anthropic Messages API)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OracleConfig {
    /// API key (can also be set via `ANTHROPIC_API_KEY` env var)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model to use
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL for API (for testing/proxies)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Maximum tokens to generate per round
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Directory receiving one transcript file per oracle request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript_dir: Option<PathBuf>,
}

fn default_model() -> String {
    "claude-sonnet-4-5-20250929".to_string()
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

const fn default_max_tokens() -> u32 {
    8192
}

const fn default_timeout_secs() -> u64 {
    300
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            temperature: None,
            transcript_dir: None,
        }
    }
}

impl OracleConfig {
    /// Get API key from config or environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files (stdout only when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RateLimitConfig {
    /// Requests per second allowed
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: f64,

    /// Burst size for token bucket
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,
}

const fn default_requests_per_second() -> f64 {
    2.0
}

const fn default_burst_size() -> u32 {
    4
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_requests_per_second(),
            burst_size: default_burst_size(),
        }
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_max_retries() -> u32 {
    5
}

const fn default_initial_backoff_ms() -> u64 {
    6_000
}

const fn default_max_backoff_ms() -> u64 {
    120_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}
