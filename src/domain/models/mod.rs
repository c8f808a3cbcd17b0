//! Domain models

pub mod config;
pub mod correction;
pub mod layout;
pub mod quality;

pub use config::{
    Config, CorrectionConfig, LoggingConfig, OracleConfig, QualityDeltas, RateLimitConfig,
    RetryConfig,
};
pub use correction::{
    circled_marks, CorrectionParams, CorrectionResponse, Overview, PartialLayout, StepRecord,
};
pub use layout::{LayoutElement, Line, RequestDocument};
pub use quality::{CorrectionState, Quality, StepSchedule};
