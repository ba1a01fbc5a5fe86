//! Human-readable output for analysis and batch runs.

use std::fmt::Write;

use storyjudge_core::{AnalysisSummary, BatchReport, TrialResult};

pub fn render_summary(story_id: &str, summary: &AnalysisSummary) -> String {
    let mut out = format!("Results for story {story_id}:\n");
    for score in &summary.scores {
        let _ = writeln!(out, "{}: {:.2} ± {:.2}", score.criterion_id, score.mean, score.sd);
    }
    let _ = writeln!(
        out,
        "Average: {:.2} ± {:.2}",
        summary.average_mean, summary.average_sd
    );
    out
}

pub fn render_trials(story_id: &str, results: &[TrialResult]) -> String {
    let mut out = format!("Scores for story {story_id}:\n");
    for result in results {
        let _ = writeln!(out, "{}: {}", result.criterion_id, result.score);
    }
    out
}

pub fn render_batch(report: &BatchReport) -> String {
    let mut out = format!(
        "Batch finished: {} succeeded, {} failed, {} skipped\n",
        report.succeeded.len(),
        report.failed.len(),
        report.skipped.len()
    );
    for (story_id, err) in &report.failed {
        let _ = writeln!(out, "  failed {story_id}: {err}");
    }
    for story_id in &report.skipped {
        let _ = writeln!(out, "  skipped {story_id}");
    }
    out
}
