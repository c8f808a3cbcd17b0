//! CLI command implementations.

pub mod batch;
pub mod correct;
pub mod status;
