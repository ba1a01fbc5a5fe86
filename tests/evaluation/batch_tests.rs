// Batch evaluation: failure isolation and cancellation between stories.

#[path = "../common/mod.rs"]
mod common;

use common::{ScriptedJudge, criteria};
use std::fs;
use std::sync::Arc;
use storyjudge_core::application::read_story_ids;
use storyjudge_core::repository::{InMemoryRepository, RepositoryError, TrialRepository};
use storyjudge_core::{CancellationToken, EvaluationError, EvaluationRunner, Evaluator, Story};
use tempfile::tempdir;

fn repository() -> Arc<InMemoryRepository> {
    Arc::new(
        InMemoryRepository::new(criteria())
            .with_story(Story::new("S1", "First story."))
            .with_story(Story::new("S3", "Third story.")),
    )
}

fn runner(repo: &Arc<InMemoryRepository>, judge: Arc<ScriptedJudge>) -> EvaluationRunner {
    EvaluationRunner::new(
        Evaluator::new(judge),
        repo.clone(),
        repo.clone(),
        repo.clone(),
    )
}

fn ids(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|id| id.to_string()).collect()
}

#[tokio::test]
async fn missing_story_is_reported_and_others_succeed() {
    let repo = repository();
    let judge = Arc::new(ScriptedJudge::new(&[
        ("coherence", &["4", "5"]),
        ("creativity", &["3", "2"]),
    ]));

    let report = runner(&repo, judge.clone())
        .run_batch(&ids(&["S1", "S2", "S3"]), "T1", &CancellationToken::new())
        .await;

    assert_eq!(report.succeeded, ["S1", "S3"]);
    assert_eq!(report.failed_ids(), ["S2"]);
    assert!(matches!(
        report.failed[0].1,
        EvaluationError::Repository(RepositoryError::NotFound { .. })
    ));
    assert!(report.skipped.is_empty());
    assert!(!report.is_success());
    assert_eq!(judge.calls(), 4);

    assert_eq!(repo.list("T1", "S1").expect("S1 trials").len(), 2);
    assert_eq!(repo.list("T1", "S3").expect("S3 trials").len(), 2);
}

#[tokio::test]
async fn unparseable_reply_fails_only_that_story() {
    let repo = repository();
    let judge = Arc::new(ScriptedJudge::new(&[
        ("coherence", &["no idea", "4"]),
        ("creativity", &["3", "3"]),
    ]));

    let report = runner(&repo, judge)
        .run_batch(&ids(&["S1", "S3"]), "T1", &CancellationToken::new())
        .await;

    assert_eq!(report.failed_ids(), ["S1"]);
    assert!(matches!(
        report.failed[0].1,
        EvaluationError::UnparseableScore { .. }
    ));
    assert_eq!(report.succeeded, ["S3"]);
}

#[tokio::test]
async fn cancelled_batch_skips_remaining_stories() {
    let repo = repository();
    let judge = Arc::new(ScriptedJudge::new(&[]));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = runner(&repo, judge.clone())
        .run_batch(&ids(&["S1", "S3"]), "T1", &cancel)
        .await;

    assert!(report.succeeded.is_empty());
    assert!(report.failed.is_empty());
    assert_eq!(report.skipped, ["S1", "S3"]);
    assert_eq!(judge.calls(), 0);
}

#[test]
fn story_id_file_ignores_blank_lines() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("stories.txt");
    fs::write(&path, "S1\n\nS2\n   \nS3").expect("write ids");

    assert_eq!(read_story_ids(&path).expect("read"), ["S1", "S2", "S3"]);
}
