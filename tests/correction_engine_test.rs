//! End-to-end tests of the correction loop against scripted oracles and
//! both journal backends.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use folio::adapters::oracle::{MockOracle, MockReply};
use folio::application::{replay, CorrectionEngine, CorrectionSettings};
use folio::domain::errors::{CorrectionError, JournalError, OracleError};
use folio::domain::models::{Line, PartialLayout, Quality, RequestDocument, StepRecord};
use folio::domain::ports::StepJournal;
use folio::infrastructure::journal::{FileStepJournal, InMemoryStepJournal};

fn engine(oracle: Arc<MockOracle>) -> CorrectionEngine {
    CorrectionEngine::new(oracle, CorrectionSettings::default())
}

fn fix(id: &str, text: &str) -> PartialLayout {
    PartialLayout::new(id, vec![Line::with_id("1", text)])
}

/// Journal that reads fine but refuses every write.
struct ReadOnlyJournal;

#[async_trait]
impl StepJournal for ReadOnlyJournal {
    async fn scan(&self) -> Result<Vec<(u32, StepRecord)>, JournalError> {
        Ok(Vec::new())
    }

    async fn append(&self, index: u32, _record: &StepRecord) -> Result<(), JournalError> {
        Err(JournalError::Io {
            path: format!("read-only/step_{index}.json").into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }

    fn describe(&self) -> String {
        "read-only".to_string()
    }
}

#[tokio::test]
async fn test_fair_good_perfect_runs_three_rounds() {
    common::setup_test_logging();
    let oracle = Arc::new(MockOracle::with_grades([
        Quality::Fair,
        Quality::Good,
        Quality::Perfect,
    ]));
    let journal = InMemoryStepJournal::new();

    let outcome = engine(oracle.clone())
        .correct("c1", &journal, &common::sample_document(), false)
        .await
        .unwrap();

    assert_eq!(outcome.rounds_run, 3);
    assert_eq!(outcome.recovered_rounds, 0);
    assert_eq!(outcome.quality(), Some(Quality::Perfect));
    assert_eq!(outcome.state.remain_steps, 2);
    assert_eq!(outcome.state.next_index, 4);
    assert_eq!(oracle.call_count().await, 3);
    assert_eq!(journal.len().await, 3);
}

#[tokio::test]
async fn test_regression_keeps_best_grade() {
    // Good (2 -> 1), Fair is a regression (1 -> 0): stop with Good.
    let oracle = Arc::new(MockOracle::with_grades([Quality::Good, Quality::Fair]));
    let journal = InMemoryStepJournal::new();

    let outcome = engine(oracle.clone())
        .correct("c1", &journal, &common::sample_document(), false)
        .await
        .unwrap();

    assert_eq!(outcome.rounds_run, 2);
    assert_eq!(outcome.quality(), Some(Quality::Good));
    assert_eq!(outcome.state.remain_steps, 0);
    assert_eq!(oracle.call_count().await, 2);
}

#[tokio::test]
async fn test_first_perfect_round_stops_immediately() {
    let oracle = Arc::new(MockOracle::new());
    let journal = InMemoryStepJournal::new();

    let outcome = engine(oracle.clone())
        .correct("c1", &journal, &common::sample_document(), false)
        .await
        .unwrap();

    assert_eq!(outcome.rounds_run, 1);
    assert_eq!(outcome.state.remain_steps, 1);
    assert_eq!(outcome.document, common::sample_document());
}

#[tokio::test]
async fn test_updates_are_merged_and_each_round_sees_previous_fixes() {
    let oracle = Arc::new(MockOracle::with_script([
        MockReply::graded(Quality::Poor, vec![fix("1/2", "in Mainz, c. 1440.")]),
        MockReply::graded(
            Quality::Perfect,
            vec![PartialLayout::new(
                "1/1",
                vec![
                    Line::with_id("1", "The history of the"),
                    Line::with_id("2", "printing press begins"),
                ],
            )],
        ),
    ]));
    let journal = InMemoryStepJournal::new();
    let original = common::sample_document();

    let outcome = engine(oracle.clone())
        .correct("c1", &journal, &original, true)
        .await
        .unwrap();

    let calls = oracle.calls().await;
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].request, original);
    assert!(calls[0].params.is_footnote);
    assert_eq!(calls[0].params.marks.len(), 6);
    assert_eq!(
        calls[1].request.get("1/2").unwrap().content[0].text,
        "in Mainz, c. 1440."
    );

    let document = &outcome.document;
    assert_eq!(document.ids(), vec!["1/1", "1/2", "1/3"]);
    assert_eq!(document.layouts[0].content[0].text, "The history of the");
    assert_eq!(document.layouts[0].attributes["page"], 1);
    assert_eq!(document.layouts[2].kind, "footnote");
}

#[tokio::test]
async fn test_records_snapshot_the_request_of_each_round() {
    let oracle = Arc::new(MockOracle::with_script([
        MockReply::graded(Quality::Fair, vec![fix("1/2", "in Mainz, c. 1440.")]),
        MockReply::graded(Quality::Perfect, vec![]),
    ]));
    let journal = InMemoryStepJournal::new();
    let original = common::sample_document();

    engine(oracle)
        .correct("c1", &journal, &original, false)
        .await
        .unwrap();

    let records = journal.scan().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].0, 1);
    assert_eq!(records[0].1.request.as_ref(), Some(&original));
    assert_eq!(records[0].1.updation().len(), 1);
    assert_eq!(
        records[1].1.request.as_ref().unwrap().layouts[1].content[0].text,
        "in Mainz, c. 1440."
    );
    assert!(records[1].1.updation.is_none());
}

#[tokio::test]
async fn test_resume_from_file_journal_matches_uninterrupted_run() {
    let script = || {
        vec![
            MockReply::graded(Quality::Poor, vec![fix("1/1", "The history of the")]),
            MockReply::graded(Quality::Fair, vec![fix("1/2", "in Mainz, c. 1440.")]),
            MockReply::graded(Quality::Perfect, vec![]),
        ]
    };
    let original = common::sample_document();

    // Uninterrupted run.
    let full_dir = common::temp_dir();
    let full = engine(Arc::new(MockOracle::with_script(script())))
        .correct_in_workspace("c1", full_dir.path(), &original, false)
        .await
        .unwrap();

    // Interrupted after the second round: the transport fails on round 3.
    let resumed_dir = common::temp_dir();
    let mut interrupted_script = script();
    interrupted_script.truncate(2);
    interrupted_script.push(MockReply::TransportFailure("connection reset".to_string()));
    let err = engine(Arc::new(MockOracle::with_script(interrupted_script)))
        .correct_in_workspace("c1", resumed_dir.path(), &original, false)
        .await
        .unwrap_err();
    assert_eq!(err.context().map(|c| c.round), Some(3));

    // Resume with an oracle that only knows the last reply.
    let oracle = Arc::new(MockOracle::with_script(script().split_off(2)));
    let resumed = engine(oracle.clone())
        .correct_in_workspace("c1", resumed_dir.path(), &original, false)
        .await
        .unwrap();

    assert_eq!(resumed.recovered_rounds, 2);
    assert_eq!(resumed.rounds_run, 1);
    assert_eq!(oracle.call_count().await, 1);
    assert_eq!(resumed.state, full.state);
    assert_eq!(resumed.document, full.document);
}

#[tokio::test]
async fn test_finished_chunk_is_not_sent_again() {
    let dir = common::temp_dir();
    let original = common::sample_document();

    engine(Arc::new(MockOracle::with_grades([Quality::Good, Quality::Perfect])))
        .correct_in_workspace("c1", dir.path(), &original, false)
        .await
        .unwrap();

    let oracle = Arc::new(MockOracle::new());
    let outcome = engine(oracle.clone())
        .correct_in_workspace("c1", dir.path(), &original, false)
        .await
        .unwrap();

    assert_eq!(oracle.call_count().await, 0);
    assert_eq!(outcome.rounds_run, 0);
    assert_eq!(outcome.recovered_rounds, 2);
    assert_eq!(outcome.quality(), Some(Quality::Perfect));
}

#[tokio::test]
async fn test_gap_in_journal_resumes_after_highest_index() {
    let original = common::sample_document();
    let journal = InMemoryStepJournal::with_records([
        (
            1,
            StepRecord::new(
                &folio::CorrectionResponse::new(Quality::Poor, vec![]),
                &original,
            ),
        ),
        (
            3,
            StepRecord::new(
                &folio::CorrectionResponse::new(Quality::Fair, vec![]),
                &original,
            ),
        ),
    ]);

    let oracle = Arc::new(MockOracle::new());
    let outcome = engine(oracle)
        .correct("c1", &journal, &original, false)
        .await
        .unwrap();

    assert_eq!(outcome.recovered_rounds, 2);
    assert_eq!(outcome.rounds_run, 1);
    assert_eq!(outcome.state.next_index, 5);
    let indices: Vec<u32> = journal
        .scan()
        .await
        .unwrap()
        .into_iter()
        .map(|(index, _)| index)
        .collect();
    assert_eq!(indices, vec![1, 3, 4]);
}

#[test]
fn test_replay_without_snapshot_keeps_last_document() {
    let original = common::sample_document();
    let record = StepRecord {
        overview: None,
        updation: Some(vec![fix("1/2", "in Mainz, c. 1440.")]),
        request: None,
    };

    let recovered = replay(&CorrectionSettings::default(), vec![(1, record)], &original);

    // Missing overview counts as perfect.
    assert_eq!(recovered.state.quality, Some(Quality::Perfect));
    assert_eq!(recovered.state.next_index, 2);
    assert_eq!(
        recovered.document.layouts[1].content[0].text,
        "in Mainz, c. 1440."
    );
    assert_eq!(recovered.document.layouts[0], original.layouts[0]);
}

#[tokio::test]
async fn test_parse_failure_carries_round_context() {
    let oracle = Arc::new(MockOracle::with_script([
        MockReply::graded(Quality::Poor, vec![]),
        MockReply::ParseFailure("no JSON block found".to_string()),
    ]));
    let journal = InMemoryStepJournal::new();

    let err = engine(oracle)
        .correct("text/chunk_7", &journal, &common::sample_document(), false)
        .await
        .unwrap_err();

    match &err {
        CorrectionError::Oracle { context, source } => {
            assert_eq!(context.chunk, "text/chunk_7");
            assert_eq!(context.round, 2);
            assert_eq!(context.quality, Some(Quality::Poor));
            assert_eq!(context.remain_steps, 1);
            assert!(matches!(source, OracleError::Parse(_)));
        }
        other => panic!("Expected oracle error, got {other:?}"),
    }
    // The failed round left nothing behind.
    assert_eq!(journal.len().await, 1);
}

#[tokio::test]
async fn test_journal_failure_stops_the_loop() {
    let oracle = Arc::new(MockOracle::with_grades([Quality::Poor, Quality::Fair]));

    let err = engine(oracle.clone())
        .correct("c1", &ReadOnlyJournal, &common::sample_document(), false)
        .await
        .unwrap_err();

    assert!(matches!(err, CorrectionError::Journal { .. }));
    assert_eq!(err.context().map(|c| c.round), Some(1));
    assert_eq!(oracle.call_count().await, 1);
}

#[tokio::test]
async fn test_duplicate_layout_ids_are_rejected_before_any_round() {
    let mut document = common::sample_document();
    document.layouts[2].id = "1/1".to_string();
    let oracle = Arc::new(MockOracle::new());

    let err = engine(oracle.clone())
        .correct("c1", &InMemoryStepJournal::new(), &document, false)
        .await
        .unwrap_err();

    assert!(matches!(err, CorrectionError::DuplicateLayoutId { ref id, .. } if id == "1/1"));
    assert_eq!(oracle.call_count().await, 0);
}

#[tokio::test]
async fn test_empty_document_still_gets_graded() {
    let oracle = Arc::new(MockOracle::with_grades([Quality::Fair]));
    let journal = InMemoryStepJournal::new();

    let outcome = engine(oracle.clone())
        .correct("empty", &journal, &RequestDocument::default(), false)
        .await
        .unwrap();

    assert!(outcome.document.is_empty());
    assert_eq!(oracle.call_count().await, 2);
}

#[tokio::test]
async fn test_inspect_reports_progress_without_oracle() {
    let dir = common::temp_dir();
    let original = common::sample_document();
    engine(Arc::new(MockOracle::with_grades([Quality::Poor, Quality::Good])))
        .correct_in_workspace("c1", dir.path(), &original, false)
        .await
        .unwrap();

    let recovered = CorrectionEngine::inspect(&CorrectionSettings::default(), dir.path())
        .await
        .unwrap();

    assert_eq!(recovered.rounds, 3);
    assert_eq!(recovered.document, original);

    let journal = FileStepJournal::open_existing(dir.path()).await.unwrap();
    assert_eq!(journal.scan().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_inspect_rejects_step_at_last_representable_index() {
    let dir = common::temp_dir();
    let record = StepRecord::new(
        &folio::CorrectionResponse::new(Quality::Fair, vec![]),
        &common::sample_document(),
    );
    std::fs::write(
        dir.path().join("step_4294967295.json"),
        serde_json::to_string(&record).unwrap(),
    )
    .unwrap();

    let err = CorrectionEngine::inspect(&CorrectionSettings::default(), dir.path())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CorrectionError::Journal {
            source: JournalError::InvalidIndex { .. },
            ..
        }
    ));
}

#[tokio::test]
async fn test_inspect_missing_workspace_fails() {
    let dir = common::temp_dir();
    let err = CorrectionEngine::inspect(&CorrectionSettings::default(), &dir.path().join("nope"))
        .await
        .unwrap_err();

    assert!(matches!(err, CorrectionError::Workspace { .. }));
}
