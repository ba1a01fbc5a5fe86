//! Aggregates recorded trials into per-criterion statistics.
//!
//! The standard deviation is the population statistic (divide by n), so a
//! criterion with a single trial reports sd = 0.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{AggregateScore, AnalysisSummary, Criterion, TrialResult};
use crate::infrastructure::repository::{CriterionRepository, RepositoryError, TrialRepository};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no trial data recorded for criterion '{criterion_id}'")]
    NoTrialData { criterion_id: String },
    #[error("criterion set is empty")]
    EmptyCriterionSet,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Mean and population standard deviation of `scores`.
pub fn aggregate(criterion_id: &str, scores: &[f64]) -> Result<AggregateScore, AnalysisError> {
    if scores.is_empty() {
        return Err(AnalysisError::NoTrialData {
            criterion_id: criterion_id.to_string(),
        });
    }
    let n = scores.len() as f64;
    let mean = scores.iter().sum::<f64>() / n;
    let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;

    Ok(AggregateScore {
        criterion_id: criterion_id.to_string(),
        mean,
        sd: variance.sqrt(),
        trials: scores.len(),
    })
}

/// Groups trials by criterion and aggregates each, in criterion-set order.
pub fn analyze(
    criteria: &[Criterion],
    trials: &[TrialResult],
) -> Result<AnalysisSummary, AnalysisError> {
    if criteria.is_empty() {
        return Err(AnalysisError::EmptyCriterionSet);
    }

    let mut grouped: HashMap<&str, Vec<f64>> = HashMap::new();
    for trial in trials {
        grouped
            .entry(trial.criterion_id.as_str())
            .or_default()
            .push(trial.score);
    }

    let scores = criteria
        .iter()
        .map(|criterion| {
            let samples = grouped
                .get(criterion.id.as_str())
                .map(Vec::as_slice)
                .unwrap_or_default();
            aggregate(&criterion.id, samples)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let stray: Vec<&str> = grouped
        .keys()
        .copied()
        .filter(|id| !criteria.iter().any(|c| c.id == *id))
        .collect();
    if !stray.is_empty() {
        debug!(?stray, "Ignoring trials for criteria outside the criterion set");
    }

    let count = scores.len() as f64;
    let average_mean = scores.iter().map(|s| s.mean).sum::<f64>() / count;
    let average_sd = scores.iter().map(|s| s.sd).sum::<f64>() / count;

    Ok(AnalysisSummary {
        scores,
        average_mean,
        average_sd,
    })
}

/// Loads criteria and recorded trials, then aggregates them.
pub struct Analyzer {
    criteria: Arc<dyn CriterionRepository>,
    trials: Arc<dyn TrialRepository>,
}

impl Analyzer {
    pub fn new(criteria: Arc<dyn CriterionRepository>, trials: Arc<dyn TrialRepository>) -> Self {
        Self { criteria, trials }
    }

    pub fn run(&self, story_id: &str, trial_id: &str) -> Result<AnalysisSummary, AnalysisError> {
        let criteria = self.criteria.list()?;
        let trials = self.trials.list(trial_id, story_id)?;
        info!(
            story_id,
            trial_id,
            criteria = criteria.len(),
            trials = trials.len(),
            "Running analysis"
        );
        analyze(&criteria, &trials)
    }
}
