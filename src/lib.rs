//! Folio - quality-gated OCR layout correction
//!
//! Folio repairs OCR'd document layouts by sending them to an LLM oracle in
//! rounds. Each round grades the chunk and returns corrections for the layouts
//! it changed; a quality-driven budget decides whether another round runs.
//! Every round is journalled so an interrupted chunk resumes where it stopped.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): layout model, quality budget rules and ports
//! - **Service Layer** (`services`): the id-keyed merge
//! - **Application Layer** (`application`): the correction loop and batch driver
//! - **Infrastructure Layer** (`infrastructure`): Claude client, journals, config, logging
//! - **Adapters** (`adapters`): correction oracle implementations
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use folio::adapters::oracle::MockOracle;
//! use folio::application::{CorrectionEngine, CorrectionSettings};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = CorrectionEngine::new(Arc::new(MockOracle::new()), CorrectionSettings::default());
//!     let document = folio::application::read_document("chunk_1.json").await?;
//!     let outcome = engine
//!         .correct_in_workspace("chunk_1", std::path::Path::new("work/chunk_1"), &document, false)
//!         .await?;
//!     println!("{:?}", outcome.quality());
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::{CorrectionEngine, CorrectionOutcome, CorrectionSettings};
pub use domain::errors::{CorrectionError, JournalError, OracleError};
pub use domain::models::{
    Config, CorrectionResponse, CorrectionState, LayoutElement, Line, PartialLayout, Quality,
    RequestDocument, StepRecord, StepSchedule,
};
pub use domain::ports::{CorrectionOracle, StepJournal};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::merge;
