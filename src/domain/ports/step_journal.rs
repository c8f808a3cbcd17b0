use async_trait::async_trait;

use crate::domain::errors::JournalError;
use crate::domain::models::StepRecord;

/// Append-only, indexed log of correction rounds for one chunk
///
/// The correction loop only needs two operations: replay everything that was
/// written before, in index order, and append the next round. Any storage
/// that can keep records immutable once written can back it.
#[async_trait]
pub trait StepJournal: Send + Sync {
    /// Every recorded step as `(index, record)`, sorted by ascending index.
    ///
    /// Entries that are not step records are skipped. A step record that
    /// cannot be decoded is an error.
    async fn scan(&self) -> Result<Vec<(u32, StepRecord)>, JournalError>;

    /// Durably write the record for `index`.
    ///
    /// Fails with [`JournalError::IndexExists`] rather than overwrite.
    async fn append(&self, index: u32, record: &StepRecord) -> Result<(), JournalError>;

    /// Human-readable location, used in logs and error context
    fn describe(&self) -> String;
}
