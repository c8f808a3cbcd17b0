//! Correction oracle adapters

pub mod llm_oracle;
pub mod mock;
pub mod prompt;
pub mod response;

pub use llm_oracle::{LlmOracle, LlmOracleSettings};
pub use mock::{MockCall, MockOracle, MockReply};
