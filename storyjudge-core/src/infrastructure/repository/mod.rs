//! Storage collaborators: criteria, story payloads and recorded trials.
//!
//! The orchestrators only see these traits. `file` backs them with a data
//! directory; `memory` serves tests and embedding callers.

mod file;
mod memory;

pub use file::{FileCriterionRepository, FileStoryRepository, FileTrialRepository};
pub use memory::InMemoryRepository;

use crate::domain::{Criterion, Story, TrialResult};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },
    #[error("invalid identifier '{id}': {reason}")]
    InvalidId { id: String, reason: &'static str },
    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub trait CriterionRepository: Send + Sync {
    /// All criteria in their stored order.
    fn list(&self) -> Result<Vec<Criterion>, RepositoryError>;
}

pub trait StoryDataRepository: Send + Sync {
    fn get(&self, story_id: &str) -> Result<Story, RepositoryError>;
}

pub trait TrialRepository: Send + Sync {
    /// Appends results of one evaluation run under `(trial_id, story_id)`.
    fn append(
        &self,
        trial_id: &str,
        story_id: &str,
        results: &[TrialResult],
    ) -> Result<(), RepositoryError>;

    /// Every recorded result for `(trial_id, story_id)`, across runs.
    fn list(&self, trial_id: &str, story_id: &str) -> Result<Vec<TrialResult>, RepositoryError>;
}

/// Rejects identifiers that would escape the data directory.
pub(crate) fn validate_id(id: &str) -> Result<(), RepositoryError> {
    let reason = if id.trim().is_empty() {
        Some("must not be empty")
    } else if id.contains(['/', '\\']) || id.contains("..") {
        Some("must not contain path separators")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(RepositoryError::InvalidId {
            id: id.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
