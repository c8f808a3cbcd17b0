//! Quality-gated correction loop for a single chunk.
//!
//! A chunk is corrected in rounds. Each round sends the current document to
//! the oracle, folds the returned grade into the [`CorrectionState`], persists
//! the round to the chunk's [`StepJournal`] and merges the returned updates.
//! The loop stops once the budget is spent or a round is graded perfect.
//!
//! Recovery replays the journal through the same state transitions, so a
//! chunk interrupted at any point resumes exactly where it stopped.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::domain::errors::{ChunkContext, CorrectionError, CorrectionResult};
use crate::domain::models::{
    circled_marks, CorrectionConfig, CorrectionParams, CorrectionState, Quality,
    RequestDocument, StepRecord, StepSchedule,
};
use crate::domain::ports::{CorrectionOracle, StepJournal};
use crate::infrastructure::journal::FileStepJournal;
use crate::services::merge;

/// Fixed knobs of the correction loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionSettings {
    /// Budget a chunk without history starts with
    pub initial_budget: i32,
    /// Layout-count hint passed to the oracle
    pub layouts_count: usize,
    /// Number of marker glyphs passed to the oracle
    pub marks_count: usize,
    /// Grade → budget delta schedule
    pub schedule: StepSchedule,
}

impl Default for CorrectionSettings {
    fn default() -> Self {
        Self {
            initial_budget: 2,
            layouts_count: 4,
            marks_count: 6,
            schedule: StepSchedule::default(),
        }
    }
}

impl CorrectionSettings {
    pub fn from_config(config: &CorrectionConfig) -> CorrectionResult<Self> {
        Ok(Self {
            initial_budget: config.initial_budget,
            layouts_count: config.layouts_count,
            marks_count: config.marks_count,
            schedule: config.deltas.to_schedule()?,
        })
    }

    /// Oracle parameters for a chunk.
    pub fn params(&self, is_footnote: bool) -> CorrectionParams {
        CorrectionParams {
            layouts_count: self.layouts_count,
            is_footnote,
            marks: circled_marks(self.marks_count),
        }
    }

    fn fresh_state(&self) -> CorrectionState {
        CorrectionState::new(self.initial_budget)
    }
}

/// State and document rebuilt from a journal.
#[derive(Debug, Clone, PartialEq)]
pub struct Recovered {
    pub state: CorrectionState,
    pub document: RequestDocument,
    /// Number of records replayed
    pub rounds: usize,
}

/// Result of correcting one chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionOutcome {
    /// Final corrected document
    pub document: RequestDocument,
    /// Terminal state
    pub state: CorrectionState,
    /// Rounds executed against the oracle in this invocation
    pub rounds_run: usize,
    /// Rounds replayed from the journal before the loop started
    pub recovered_rounds: usize,
}

impl CorrectionOutcome {
    /// Final grade, `None` when no round was ever graded.
    pub const fn quality(&self) -> Option<Quality> {
        self.state.quality
    }
}

/// Replay journal records on top of `original`.
///
/// Each record restores the document it was sent with, when it has one;
/// otherwise the last known document is kept. The record's grade and
/// updates are then applied exactly as a live round would apply them.
pub fn replay(
    settings: &CorrectionSettings,
    records: Vec<(u32, StepRecord)>,
    original: &RequestDocument,
) -> Recovered {
    let mut state = settings.fresh_state();
    let mut document = original.clone();
    let rounds = records.len();

    for (index, record) in records {
        if index != state.next_index {
            warn!(
                expected = state.next_index,
                found = index,
                "gap in step numbering, continuing from the recorded index"
            );
        }

        let grade = record.grade();
        let StepRecord {
            updation, request, ..
        } = record;

        match request {
            Some(request) => document = request,
            None => warn!(index, "step record has no request snapshot, keeping last document"),
        }

        state = state.report(&settings.schedule, grade);
        document = merge(&document, updation.as_deref().unwrap_or_default());
        state = state.advanced_past(index);

        debug!(
            index,
            grade = %grade,
            quality = ?state.quality,
            remain_steps = state.remain_steps,
            "replayed step"
        );
    }

    Recovered {
        state,
        document,
        rounds,
    }
}

/// Drives correction rounds for chunks against one oracle.
pub struct CorrectionEngine {
    oracle: Arc<dyn CorrectionOracle>,
    settings: CorrectionSettings,
}

impl CorrectionEngine {
    pub fn new(oracle: Arc<dyn CorrectionOracle>, settings: CorrectionSettings) -> Self {
        Self { oracle, settings }
    }

    pub const fn settings(&self) -> &CorrectionSettings {
        &self.settings
    }

    /// Rebuild the chunk's state from its journal without calling the oracle.
    #[instrument(skip(self, journal, original), fields(store = %journal.describe()))]
    pub async fn recover(
        &self,
        chunk: &str,
        journal: &dyn StepJournal,
        original: &RequestDocument,
    ) -> CorrectionResult<Recovered> {
        recover_with(&self.settings, chunk, journal, original).await
    }

    /// Correct `original` until the budget is spent or a round is perfect.
    ///
    /// Rounds already in `journal` are replayed first and not re-sent.
    #[instrument(skip(self, journal, original), fields(store = %journal.describe(), oracle = self.oracle.name()))]
    pub async fn correct(
        &self,
        chunk: &str,
        journal: &dyn StepJournal,
        original: &RequestDocument,
        is_footnote: bool,
    ) -> CorrectionResult<CorrectionOutcome> {
        if let Some(id) = original.duplicate_id() {
            return Err(CorrectionError::DuplicateLayoutId {
                chunk: chunk.to_string(),
                id: id.to_string(),
            });
        }

        let Recovered {
            mut state,
            mut document,
            rounds: recovered_rounds,
        } = recover_with(&self.settings, chunk, journal, original).await?;

        if recovered_rounds > 0 {
            info!(
                recovered_rounds,
                quality = ?state.quality,
                remain_steps = state.remain_steps,
                next_index = state.next_index,
                "resuming chunk from journal"
            );
        }

        let params = self.settings.params(is_footnote);
        let mut rounds_run = 0;

        while state.should_continue() {
            let index = state.next_index;

            let response = self
                .oracle
                .request_correction(&document, &params)
                .await
                .map_err(|source| CorrectionError::Oracle {
                    context: ChunkContext::new(chunk, &state),
                    source,
                })?;

            let grade = response.grade();
            let record = StepRecord::new(&response, &document);
            let graded_state = state.report(&self.settings.schedule, grade);

            journal
                .append(index, &record)
                .await
                .map_err(|source| CorrectionError::Journal {
                    context: ChunkContext::new(chunk, &state),
                    source,
                })?;

            document = merge(&document, &response.updation);
            state = graded_state.advanced_past(index);
            rounds_run += 1;

            info!(
                round = index,
                grade = %grade,
                quality = ?state.quality,
                remain_steps = state.remain_steps,
                updated = response.updation.len(),
                "correction round complete"
            );
        }

        info!(
            rounds_run,
            recovered_rounds,
            quality = ?state.quality,
            remain_steps = state.remain_steps,
            "chunk correction finished"
        );

        Ok(CorrectionOutcome {
            document,
            state,
            rounds_run,
            recovered_rounds,
        })
    }

    /// Correct a chunk whose journal lives in `workspace`, creating it if absent.
    pub async fn correct_in_workspace(
        &self,
        chunk: &str,
        workspace: &Path,
        original: &RequestDocument,
        is_footnote: bool,
    ) -> CorrectionResult<CorrectionOutcome> {
        let journal =
            FileStepJournal::open(workspace)
                .await
                .map_err(|source| CorrectionError::Workspace {
                    path: workspace.to_path_buf(),
                    source,
                })?;

        self.correct(chunk, &journal, original, is_footnote).await
    }

    /// Replay an existing chunk workspace without an oracle.
    ///
    /// The original document is unknown here, so records without a request
    /// snapshot fall back to an empty document.
    pub async fn inspect(
        settings: &CorrectionSettings,
        workspace: &Path,
    ) -> CorrectionResult<Recovered> {
        let journal = FileStepJournal::open_existing(workspace)
            .await
            .map_err(|source| CorrectionError::Workspace {
                path: workspace.to_path_buf(),
                source,
            })?;

        let chunk = workspace.display().to_string();
        recover_with(settings, &chunk, &journal, &RequestDocument::default()).await
    }
}

async fn recover_with(
    settings: &CorrectionSettings,
    chunk: &str,
    journal: &dyn StepJournal,
    original: &RequestDocument,
) -> CorrectionResult<Recovered> {
    let records = journal
        .scan()
        .await
        .map_err(|source| CorrectionError::Journal {
            context: ChunkContext::new(chunk, &settings.fresh_state()),
            source,
        })?;

    Ok(replay(settings, records, original))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::oracle::{MockOracle, MockReply};
    use crate::domain::models::{CorrectionResponse, LayoutElement, Line, PartialLayout};
    use crate::infrastructure::journal::InMemoryStepJournal;

    fn document() -> RequestDocument {
        RequestDocument::new(vec![
            LayoutElement::new("1/1", vec![Line::new("Tbe first paragraph")]),
            LayoutElement::new("1/2", vec![Line::new("tbe second paragraph")]),
        ])
    }

    fn engine(oracle: MockOracle) -> (Arc<MockOracle>, CorrectionEngine) {
        let oracle = Arc::new(oracle);
        let engine = CorrectionEngine::new(oracle.clone(), CorrectionSettings::default());
        (oracle, engine)
    }

    #[tokio::test]
    async fn test_perfect_first_round_stops() {
        let (oracle, engine) = engine(MockOracle::with_grades([Quality::Perfect]));
        let journal = InMemoryStepJournal::new();

        let outcome = engine
            .correct("c", &journal, &document(), false)
            .await
            .unwrap();

        assert_eq!(outcome.rounds_run, 1);
        assert_eq!(outcome.quality(), Some(Quality::Perfect));
        assert_eq!(outcome.state.remain_steps, 1);
        assert_eq!(outcome.state.next_index, 2);
        assert_eq!(oracle.call_count().await, 1);
        assert_eq!(journal.len().await, 1);
    }

    #[tokio::test]
    async fn test_updates_are_merged_between_rounds() {
        let (oracle, engine) = engine(MockOracle::with_script([
            MockReply::graded(
                Quality::Fair,
                vec![PartialLayout::new("1/1", vec![Line::new("The first paragraph")])],
            ),
            MockReply::graded(Quality::Perfect, vec![]),
        ]));
        let journal = InMemoryStepJournal::new();

        let outcome = engine
            .correct("c", &journal, &document(), true)
            .await
            .unwrap();

        let calls = oracle.calls().await;
        assert_eq!(calls.len(), 2);
        assert!(calls[0].params.is_footnote);
        assert_eq!(calls[0].params.marks.len(), 6);
        assert_eq!(calls[1].request.layouts[0].content[0].text, "The first paragraph");
        assert_eq!(outcome.document, calls[1].request);
    }

    #[tokio::test]
    async fn test_budget_exhaustion_ends_without_perfect() {
        let (oracle, engine) = engine(MockOracle::new().with_default_reply(MockReply::graded(
            Quality::Good,
            vec![],
        )));
        let journal = InMemoryStepJournal::new();

        let outcome = engine
            .correct("c", &journal, &document(), false)
            .await
            .unwrap();

        // Good → Good earns nothing, so the budget of 2 buys two rounds.
        assert_eq!(outcome.rounds_run, 2);
        assert_eq!(outcome.state.remain_steps, 0);
        assert_eq!(outcome.quality(), Some(Quality::Good));
        assert_eq!(oracle.call_count().await, 2);
    }

    #[tokio::test]
    async fn test_duplicate_ids_are_rejected() {
        let (oracle, engine) = engine(MockOracle::new());
        let mut doc = document();
        doc.layouts.push(LayoutElement::new("1/2", vec![]));

        let err = engine
            .correct("c", &InMemoryStepJournal::new(), &doc, false)
            .await
            .unwrap_err();

        assert!(matches!(err, CorrectionError::DuplicateLayoutId { ref id, .. } if id == "1/2"));
        assert_eq!(oracle.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_record_without_request_keeps_previous_document() {
        let settings = CorrectionSettings::default();
        let record = StepRecord {
            request: None,
            ..StepRecord::new(
                &CorrectionResponse::new(
                    Quality::Poor,
                    vec![PartialLayout::new("1/2", vec![Line::new("the second paragraph")])],
                ),
                &RequestDocument::default(),
            )
        };

        let recovered = replay(&settings, vec![(1, record)], &document());

        assert_eq!(recovered.document.layouts[0], document().layouts[0]);
        assert_eq!(
            recovered.document.layouts[1].content,
            vec![Line::new("the second paragraph")]
        );
        assert_eq!(recovered.state.quality, Some(Quality::Poor));
        assert_eq!(recovered.state.next_index, 2);
    }

    #[test]
    fn test_settings_from_config() {
        let settings = CorrectionSettings::from_config(&CorrectionConfig::default()).unwrap();
        assert_eq!(settings, CorrectionSettings::default());

        let mut config = CorrectionConfig::default();
        config.deltas.poor = -1;
        assert!(CorrectionSettings::from_config(&config).is_err());
    }
}
