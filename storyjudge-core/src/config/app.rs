//! # Application Configuration
//!
//! Settings shared by the factory and orchestrators. Every field has a
//! default, so running without a config file is valid.
//!
//! ```toml
//! default_model = "gemini-2.5-pro"
//! data_dir = "data"
//! request_timeout_secs = 60
//! max_concurrency = 2
//!
//! [retry]
//! max_attempts = 5
//! backoff_secs = 3
//!
//! [endpoints]
//! gemini = "https://generativelanguage.googleapis.com"
//! ```

use super::error::ConfigError;
use crate::constants::{
    DEFAULT_ANTHROPIC_ENDPOINT, DEFAULT_BACKOFF_SECS, DEFAULT_DATA_DIR, DEFAULT_GEMINI_ENDPOINT,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_CONCURRENCY, DEFAULT_MODEL, DEFAULT_OPENAI_ENDPOINT,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::infrastructure::model::RetryPolicy;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub backoff_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_secs: DEFAULT_BACKOFF_SECS,
        }
    }
}

/// Provider base URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    pub gemini: String,
    pub anthropic: String,
    pub openai: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            gemini: DEFAULT_GEMINI_ENDPOINT.to_string(),
            anthropic: DEFAULT_ANTHROPIC_ENDPOINT.to_string(),
            openai: DEFAULT_OPENAI_ENDPOINT.to_string(),
        }
    }
}

/// Application configuration loaded from storyjudge.toml
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub default_model: String,
    pub data_dir: PathBuf,
    pub retry: RetryConfig,
    pub request_timeout_secs: u64,
    pub max_concurrency: usize,
    pub endpoints: EndpointConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_model: DEFAULT_MODEL.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            retry: RetryConfig::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            endpoints: EndpointConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a file path (or default path if None)
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        super::loader::load_config(path)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_attempts,
            Duration::from_secs(self.retry.backoff_secs),
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
