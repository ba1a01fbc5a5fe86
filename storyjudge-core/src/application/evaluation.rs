//! Evaluation orchestrator: one judge call per criterion for a story.

use chrono::Utc;
use futures::{StreamExt, TryStreamExt, stream};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use super::score::parse_score;
use crate::cancel::CancellationToken;
use crate::domain::{ChatMessage, Conversation, Criterion, Story, TrialResult};
use crate::infrastructure::model::{GenerativeModel, ModelError};
use crate::infrastructure::repository::{
    CriterionRepository, RepositoryError, StoryDataRepository, TrialRepository,
};

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("judging criterion '{criterion_id}' failed: {source}")]
    Model {
        criterion_id: String,
        #[source]
        source: ModelError,
    },
    #[error("no score found in judge reply for criterion '{criterion_id}': {response:?}")]
    UnparseableScore {
        criterion_id: String,
        response: String,
    },
    #[error("no criteria configured")]
    NoCriteria,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("evaluation cancelled")]
    Cancelled,
}

const JUDGE_INSTRUCTIONS: &str = "You are an expert literary critic judging a machine-generated story. \
Evaluate the story strictly on the single criterion below and ignore every other quality.";

const RESPONSE_FORMAT: &str = "Score the story on an integer scale from 1 (very poor) to 5 (excellent). \
Respond with a JSON object only, in the form {\"score\": <1-5>, \"reasoning\": \"<one short paragraph>\"}.";

/// System turn describing the criterion and rubric, user turn carrying the story.
pub fn judging_conversation(criterion: &Criterion, story: &Story) -> Conversation {
    let system = format!(
        "{JUDGE_INSTRUCTIONS}\n\nCriterion: {}\n{}\n\n{RESPONSE_FORMAT}",
        criterion.display_name(),
        criterion.description.trim(),
    );
    Conversation::new(vec![
        ChatMessage::system(system),
        ChatMessage::user(format!("Story:\n\n{}", story.text.trim())),
    ])
}

/// Judges a story once per criterion.
pub struct Evaluator {
    model: Arc<dyn GenerativeModel>,
    max_concurrency: usize,
    cancel: CancellationToken,
}

impl Evaluator {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            model,
            max_concurrency: 1,
            cancel: CancellationToken::new(),
        }
    }

    /// Criteria judged at the same time for one story. Results keep criterion order.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn model(&self) -> &dyn GenerativeModel {
        self.model.as_ref()
    }

    /// Produces one `TrialResult` per criterion, all tagged with a fresh run id.
    pub async fn evaluate(
        &self,
        trial_id: &str,
        story: &Story,
        criteria: &[Criterion],
    ) -> Result<Vec<TrialResult>, EvaluationError> {
        if criteria.is_empty() {
            return Err(EvaluationError::NoCriteria);
        }
        let run_id = Uuid::new_v4();
        debug!(
            story_id = story.id.as_str(),
            %run_id,
            criteria = criteria.len(),
            concurrency = self.max_concurrency,
            "Judging story"
        );

        stream::iter(
            criteria
                .iter()
                .map(|criterion| self.judge(run_id, trial_id, story, criterion)),
        )
        .buffered(self.max_concurrency)
        .try_collect()
        .await
    }

    async fn judge(
        &self,
        run_id: Uuid,
        trial_id: &str,
        story: &Story,
        criterion: &Criterion,
    ) -> Result<TrialResult, EvaluationError> {
        if self.cancel.is_cancelled() {
            return Err(EvaluationError::Cancelled);
        }
        let conversation = judging_conversation(criterion, story);
        let response = self
            .model
            .generate(&conversation)
            .await
            .map_err(|source| match source {
                ModelError::Cancelled => EvaluationError::Cancelled,
                source => EvaluationError::Model {
                    criterion_id: criterion.id.clone(),
                    source,
                },
            })?;

        let score = parse_score(&response).ok_or_else(|| EvaluationError::UnparseableScore {
            criterion_id: criterion.id.clone(),
            response: response.clone(),
        })?;
        debug!(
            story_id = story.id.as_str(),
            criterion = criterion.id.as_str(),
            score,
            "Criterion judged"
        );

        Ok(TrialResult {
            run_id,
            story_id: story.id.clone(),
            trial_id: trial_id.to_string(),
            criterion_id: criterion.id.clone(),
            score,
            response,
            model: self.model.model_name().to_string(),
            created_at: Utc::now(),
        })
    }
}

/// Loads inputs from the repositories, evaluates, and records the results.
pub struct EvaluationRunner {
    evaluator: Evaluator,
    criteria: Arc<dyn CriterionRepository>,
    stories: Arc<dyn StoryDataRepository>,
    trials: Arc<dyn TrialRepository>,
}

impl EvaluationRunner {
    pub fn new(
        evaluator: Evaluator,
        criteria: Arc<dyn CriterionRepository>,
        stories: Arc<dyn StoryDataRepository>,
        trials: Arc<dyn TrialRepository>,
    ) -> Self {
        Self {
            evaluator,
            criteria,
            stories,
            trials,
        }
    }

    pub async fn run(
        &self,
        story_id: &str,
        trial_id: &str,
    ) -> Result<Vec<TrialResult>, EvaluationError> {
        let criteria = self.criteria.list()?;
        let story = self.stories.get(story_id)?;
        info!(
            story_id,
            trial_id,
            model = self.evaluator.model().model_name(),
            criteria = criteria.len(),
            "Running evaluation"
        );

        let results = self.evaluator.evaluate(trial_id, &story, &criteria).await?;
        self.trials.append(trial_id, story_id, &results)?;
        info!(story_id, trial_id, results = results.len(), "Evaluation recorded");
        Ok(results)
    }
}
