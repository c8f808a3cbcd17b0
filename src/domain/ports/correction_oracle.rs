use async_trait::async_trait;

use crate::domain::errors::OracleError;
use crate::domain::models::{CorrectionParams, CorrectionResponse, RequestDocument};

/// Port trait for the correction oracle
///
/// One call is one correction round: the oracle sees the full request
/// document and answers with a grade and a sparse set of corrected layouts.
///
/// Implementations own any transport concerns (rate limiting, retrying
/// transient failures). A response that cannot be decoded into an overview
/// and updation must surface as [`OracleError::Parse`]; the correction loop
/// treats it as fatal for the chunk.
#[async_trait]
pub trait CorrectionOracle: Send + Sync {
    /// Request one round of corrections for `request`.
    async fn request_correction(
        &self,
        request: &RequestDocument,
        params: &CorrectionParams,
    ) -> Result<CorrectionResponse, OracleError>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}
