//! In-memory step journal for ephemeral runs and tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::errors::JournalError;
use crate::domain::models::StepRecord;
use crate::domain::ports::StepJournal;

/// Step journal kept in process memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryStepJournal {
    records: Mutex<BTreeMap<u32, StepRecord>>,
}

impl InMemoryStepJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Journal pre-seeded with records, as if a previous run had written them.
    pub fn with_records(records: impl IntoIterator<Item = (u32, StepRecord)>) -> Self {
        Self {
            records: Mutex::new(records.into_iter().collect()),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl StepJournal for InMemoryStepJournal {
    async fn scan(&self) -> Result<Vec<(u32, StepRecord)>, JournalError> {
        let records = self.records.lock().await;
        Ok(records
            .iter()
            .map(|(index, record)| (*index, record.clone()))
            .collect())
    }

    async fn append(&self, index: u32, record: &StepRecord) -> Result<(), JournalError> {
        let mut records = self.records.lock().await;
        if records.contains_key(&index) {
            return Err(JournalError::IndexExists(index));
        }
        records.insert(index, record.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{CorrectionResponse, Quality, RequestDocument};

    fn record(quality: Quality) -> StepRecord {
        StepRecord::new(
            &CorrectionResponse::new(quality, vec![]),
            &RequestDocument::default(),
        )
    }

    #[tokio::test]
    async fn test_scan_is_ordered_by_index() {
        let journal = InMemoryStepJournal::with_records([
            (3, record(Quality::Good)),
            (1, record(Quality::Poor)),
        ]);

        let steps = journal.scan().await.unwrap();
        assert_eq!(steps.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[tokio::test]
    async fn test_append_rejects_existing_index() {
        let journal = InMemoryStepJournal::new();
        journal.append(1, &record(Quality::Fair)).await.unwrap();

        let result = journal.append(1, &record(Quality::Good)).await;
        assert!(matches!(result, Err(JournalError::IndexExists(1))));
        assert_eq!(journal.len().await, 1);
    }
}
