//! Domain layer for the Folio correction engine
//!
//! This module contains the data model, the quality/budget rules and the
//! port traits the engine depends on.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{ChunkContext, CorrectionError, CorrectionResult, JournalError, OracleError};
