use super::{CriterionRepository, RepositoryError, StoryDataRepository, TrialRepository};
use crate::domain::{Criterion, Story, TrialResult};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

type TrialKey = (String, String);

/// In-process store implementing every repository trait.
#[derive(Default)]
pub struct InMemoryRepository {
    criteria: Vec<Criterion>,
    stories: HashMap<String, Story>,
    trials: Mutex<HashMap<TrialKey, Vec<TrialResult>>>,
}

impl InMemoryRepository {
    pub fn new(criteria: Vec<Criterion>) -> Self {
        Self {
            criteria,
            ..Self::default()
        }
    }

    pub fn with_story(mut self, story: Story) -> Self {
        self.stories.insert(story.id.clone(), story);
        self
    }

    fn trials(&self) -> MutexGuard<'_, HashMap<TrialKey, Vec<TrialResult>>> {
        self.trials
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CriterionRepository for InMemoryRepository {
    fn list(&self) -> Result<Vec<Criterion>, RepositoryError> {
        Ok(self.criteria.clone())
    }
}

impl StoryDataRepository for InMemoryRepository {
    fn get(&self, story_id: &str) -> Result<Story, RepositoryError> {
        self.stories
            .get(story_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound {
                kind: "story",
                id: story_id.to_string(),
            })
    }
}

impl TrialRepository for InMemoryRepository {
    fn append(
        &self,
        trial_id: &str,
        story_id: &str,
        results: &[TrialResult],
    ) -> Result<(), RepositoryError> {
        self.trials()
            .entry((trial_id.to_string(), story_id.to_string()))
            .or_default()
            .extend_from_slice(results);
        Ok(())
    }

    fn list(&self, trial_id: &str, story_id: &str) -> Result<Vec<TrialResult>, RepositoryError> {
        Ok(self
            .trials()
            .get(&(trial_id.to_string(), story_id.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}
