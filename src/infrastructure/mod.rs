//! Infrastructure layer module
//!
//! - Claude API client (rate limiting, retries)
//! - Step journal backends
//! - Configuration management
//! - Logging infrastructure

pub mod claude;
pub mod config;
pub mod journal;
pub mod logging;
