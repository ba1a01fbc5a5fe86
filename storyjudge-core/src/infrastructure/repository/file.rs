//! Data-directory backed repositories.
//!
//! Layout under the data directory:
//! - `criteria.json` - JSON array of criteria
//! - `stories/<story_id>.txt` - story text
//! - `trials/<trial_id>/<story_id>.jsonl` - one `TrialResult` per line

use super::{
    CriterionRepository, RepositoryError, StoryDataRepository, TrialRepository, validate_id,
};
use crate::domain::{Criterion, Story, TrialResult};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> RepositoryError + '_ {
    move |source| RepositoryError::Io {
        path: path.to_path_buf(),
        source,
    }
}

pub struct FileCriterionRepository {
    path: PathBuf,
}

impl FileCriterionRepository {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join("criteria.json"),
        }
    }
}

impl CriterionRepository for FileCriterionRepository {
    fn list(&self) -> Result<Vec<Criterion>, RepositoryError> {
        let content = fs::read_to_string(&self.path).map_err(io_error(&self.path))?;
        let criteria: Vec<Criterion> =
            serde_json::from_str(&content).map_err(|source| RepositoryError::Parse {
                path: self.path.clone(),
                source,
            })?;
        debug!(path = %self.path.display(), count = criteria.len(), "Loaded criteria");
        Ok(criteria)
    }
}

pub struct FileStoryRepository {
    dir: PathBuf,
}

impl FileStoryRepository {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: data_dir.as_ref().join("stories"),
        }
    }
}

impl StoryDataRepository for FileStoryRepository {
    fn get(&self, story_id: &str) -> Result<Story, RepositoryError> {
        validate_id(story_id)?;
        let path = self.dir.join(format!("{story_id}.txt"));
        let text = fs::read_to_string(&path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                RepositoryError::NotFound {
                    kind: "story",
                    id: story_id.to_string(),
                }
            } else {
                RepositoryError::Io {
                    path: path.clone(),
                    source,
                }
            }
        })?;
        Ok(Story::new(story_id, text))
    }
}

pub struct FileTrialRepository {
    dir: PathBuf,
    // Serialises appends from concurrent batch workers.
    write_lock: Mutex<()>,
}

impl FileTrialRepository {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: data_dir.as_ref().join("trials"),
            write_lock: Mutex::new(()),
        }
    }

    fn path_for(&self, trial_id: &str, story_id: &str) -> Result<PathBuf, RepositoryError> {
        validate_id(trial_id)?;
        validate_id(story_id)?;
        Ok(self.dir.join(trial_id).join(format!("{story_id}.jsonl")))
    }
}

impl TrialRepository for FileTrialRepository {
    fn append(
        &self,
        trial_id: &str,
        story_id: &str,
        results: &[TrialResult],
    ) -> Result<(), RepositoryError> {
        let path = self.path_for(trial_id, story_id)?;
        let mut buffer = String::new();
        for result in results {
            let line = serde_json::to_string(result).map_err(|source| RepositoryError::Parse {
                path: path.clone(),
                source,
            })?;
            buffer.push_str(&line);
            buffer.push('\n');
        }

        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_error(&path))?;
        file.write_all(buffer.as_bytes()).map_err(io_error(&path))?;

        debug!(path = %path.display(), count = results.len(), "Recorded trial results");
        Ok(())
    }

    fn list(&self, trial_id: &str, story_id: &str) -> Result<Vec<TrialResult>, RepositoryError> {
        let path = self.path_for(trial_id, story_id)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(RepositoryError::Io { path, source }),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line).map_err(|source| RepositoryError::Parse {
                    path: path.clone(),
                    source,
                })
            })
            .collect()
    }
}
