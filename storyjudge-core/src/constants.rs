//! Application constants
//!
//! Single source of truth for paths, provider defaults and retry tuning.

/// Default configuration file path
pub const CONFIG_PATH: &str = "config/storyjudge.toml";

/// Default environment file path
pub const ENV_PATH: &str = ".env";

/// Default data directory for criteria, stories and stored trials
pub const DEFAULT_DATA_DIR: &str = "data";

/// Judge model used when neither the CLI nor the config names one
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// Attempts per `generate` call, including the first one
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Fixed wait between attempts
pub const DEFAULT_BACKOFF_SECS: u64 = 3;

/// Per-request HTTP timeout
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Criteria judged concurrently for a single story
pub const DEFAULT_MAX_CONCURRENCY: usize = 1;

/// Comma-separated list of Gemini API keys
pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_API_KEY";

pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Default Gemini API path (models live under it)
pub const DEFAULT_GEMINI_API_PATH: &str = "v1beta/models";

pub const DEFAULT_ANTHROPIC_ENDPOINT: &str = "https://api.anthropic.com";

pub const ANTHROPIC_API_VERSION: &str = "2023-06-01";

pub const ANTHROPIC_MAX_TOKENS: u32 = 4096;

pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com";
