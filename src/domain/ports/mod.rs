//! Port trait definitions (Hexagonal Architecture)
//!
//! - CorrectionOracle: one correction round against an LLM
//! - StepJournal: append-only round log used for crash recovery

pub mod correction_oracle;
pub mod step_journal;

pub use correction_oracle::CorrectionOracle;
pub use step_journal::StepJournal;
