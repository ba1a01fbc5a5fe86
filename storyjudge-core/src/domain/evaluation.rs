//! Evaluation records: criteria, stories, per-call trial results and aggregates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A quality criterion a judge scores a story against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    /// Stable identifier used to group trial results (e.g. "coherence")
    pub id: String,
    /// Human-readable name shown to the judge
    #[serde(default)]
    pub name: Option<String>,
    /// Rubric fragment describing what the criterion measures
    pub description: String,
}

impl Criterion {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            description: description.into(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// A story payload loaded from the story repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub id: String,
    pub text: String,
}

impl Story {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// One judged score for one (story, criterion) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    /// Evaluation run that produced this result
    pub run_id: Uuid,
    pub story_id: String,
    pub trial_id: String,
    pub criterion_id: String,
    pub score: f64,
    /// Raw judged text the score was parsed from
    pub response: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
}

/// Mean and population standard deviation for one criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateScore {
    pub criterion_id: String,
    pub mean: f64,
    pub sd: f64,
    pub trials: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub scores: Vec<AggregateScore>,
    /// Arithmetic mean of the per-criterion means
    pub average_mean: f64,
    /// Arithmetic mean of the per-criterion standard deviations
    pub average_sd: f64,
}
