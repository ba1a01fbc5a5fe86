use super::app::{AppConfig, EndpointConfig, RetryConfig};
use super::error::ConfigError;
use crate::constants::{CONFIG_PATH, ENV_PATH};
use dotenvy::from_filename;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::debug;

static ENV_LOADER: Once = Once::new();

/// Raw configuration structure for deserialization from TOML
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    default_model: Option<String>,
    data_dir: Option<PathBuf>,
    request_timeout_secs: Option<u64>,
    max_concurrency: Option<usize>,
    #[serde(default)]
    retry: RawRetry,
    #[serde(default)]
    endpoints: RawEndpoints,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawRetry {
    max_attempts: Option<u32>,
    backoff_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawEndpoints {
    gemini: Option<String>,
    anthropic: Option<String>,
    openai: Option<String>,
}

/// Ensures environment variables are loaded from `.env`
pub fn ensure_env_loaded() {
    ENV_LOADER.call_once(|| {
        if from_filename(ENV_PATH).is_ok() {
            debug!(path = ENV_PATH, "Loaded environment file");
        }
    });
}

/// Load and validate configuration.
///
/// Without an explicit path a missing default file yields defaults; an
/// explicit path that does not exist is an error.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    ensure_env_loaded();
    match path {
        Some(path) => read_config(path),
        None => match read_config(Path::new(CONFIG_PATH)) {
            Err(ConfigError::NotFound { .. }) => {
                debug!(path = CONFIG_PATH, "No configuration file, using defaults");
                Ok(AppConfig::default())
            }
            other => other,
        },
    }
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    debug!(path = %path.display(), "Reading configuration file");

    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    parse_config(path, &content)
}

fn parse_config(path: &Path, content: &str) -> Result<AppConfig, ConfigError> {
    let parsed: RawConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    validate_and_build(parsed)
}

fn validate_and_build(parsed: RawConfig) -> Result<AppConfig, ConfigError> {
    let defaults = AppConfig::default();

    let default_model = match parsed.default_model {
        Some(model) if model.trim().is_empty() => {
            return Err(ConfigError::Invalid {
                field: "default_model",
                reason: "must not be empty".into(),
            });
        }
        Some(model) => model.trim().to_string(),
        None => defaults.default_model,
    };

    let max_attempts = parsed
        .retry
        .max_attempts
        .unwrap_or(defaults.retry.max_attempts);
    if max_attempts == 0 {
        return Err(ConfigError::Invalid {
            field: "retry.max_attempts",
            reason: "must be at least 1".into(),
        });
    }

    let max_concurrency = parsed.max_concurrency.unwrap_or(defaults.max_concurrency);
    if max_concurrency == 0 {
        return Err(ConfigError::Invalid {
            field: "max_concurrency",
            reason: "must be at least 1".into(),
        });
    }

    let request_timeout_secs = parsed
        .request_timeout_secs
        .unwrap_or(defaults.request_timeout_secs);
    if request_timeout_secs == 0 {
        return Err(ConfigError::Invalid {
            field: "request_timeout_secs",
            reason: "must be at least 1".into(),
        });
    }

    let endpoints = EndpointConfig {
        gemini: parsed.endpoints.gemini.unwrap_or(defaults.endpoints.gemini),
        anthropic: parsed
            .endpoints
            .anthropic
            .unwrap_or(defaults.endpoints.anthropic),
        openai: parsed.endpoints.openai.unwrap_or(defaults.endpoints.openai),
    };

    Ok(AppConfig {
        default_model,
        data_dir: parsed.data_dir.unwrap_or(defaults.data_dir),
        retry: RetryConfig {
            max_attempts,
            backoff_secs: parsed
                .retry
                .backoff_secs
                .unwrap_or(defaults.retry.backoff_secs),
        },
        request_timeout_secs,
        max_concurrency,
        endpoints,
    })
}
