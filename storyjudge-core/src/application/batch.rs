//! Batch evaluation over a list of story ids.
//!
//! A failing story is recorded against its id and the batch moves on.

use std::fs;
use std::io;
use std::path::Path;
use tracing::{error, info, warn};

use super::evaluation::{EvaluationError, EvaluationRunner};
use crate::cancel::CancellationToken;

/// Outcome of a batch run, attributable per story id.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, EvaluationError)>,
    /// Ids not attempted because the batch was cancelled
    pub skipped: Vec<String>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }

    pub fn failed_ids(&self) -> Vec<&str> {
        self.failed.iter().map(|(id, _)| id.as_str()).collect()
    }
}

/// Story ids from newline-delimited text; blank lines are ignored.
pub fn parse_story_ids(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

pub fn read_story_ids(path: &Path) -> io::Result<Vec<String>> {
    fs::read_to_string(path).map(|content| parse_story_ids(&content))
}

impl EvaluationRunner {
    /// Evaluates each story in order. Cancellation stops the batch between
    /// stories; the remaining ids are reported as skipped.
    pub async fn run_batch(
        &self,
        story_ids: &[String],
        trial_id: &str,
        cancel: &CancellationToken,
    ) -> BatchReport {
        info!(stories = story_ids.len(), trial_id, "Running batch evaluation");
        let mut report = BatchReport::default();

        for (position, story_id) in story_ids.iter().enumerate() {
            if cancel.is_cancelled() {
                warn!(remaining = story_ids.len() - position, "Batch cancelled");
                report.skipped.extend(story_ids[position..].iter().cloned());
                break;
            }

            info!(story_id = story_id.as_str(), "Running evaluation for story");
            match self.run(story_id, trial_id).await {
                Ok(_) => {
                    info!(story_id = story_id.as_str(), "Finished evaluation for story");
                    report.succeeded.push(story_id.clone());
                }
                Err(EvaluationError::Cancelled) => {
                    warn!(story_id = story_id.as_str(), "Evaluation cancelled mid-story");
                    report.skipped.extend(story_ids[position..].iter().cloned());
                    break;
                }
                Err(err) => {
                    error!(story_id = story_id.as_str(), error = %err, "Evaluation failed for story");
                    report.failed.push((story_id.clone(), err));
                }
            }
        }

        info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            "Batch evaluation finished"
        );
        report
    }
}
