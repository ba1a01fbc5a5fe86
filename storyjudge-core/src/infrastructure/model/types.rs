//! Model types - provider identity, failure classification and error types

use reqwest::StatusCode;
use std::fmt;
use thiserror::Error;

/// Provider family behind a judge model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Gemini,
    Anthropic,
    OpenAI,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenAI => "openai",
        }
    }

    /// Only Gemini accepts a comma-separated key pool that rotates on quota errors.
    pub fn rotates_keys(self) -> bool {
        matches!(self, ProviderKind::Gemini)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider-neutral classification of a failed provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Timeouts, connection failures, provider-side 5xx/overload
    Transient,
    /// Quota or rate limit; transient, and triggers key rotation
    RateLimited,
    /// Bad request, unexpected payload; never retried
    Fatal,
    /// Credential rejected or endpoint missing; never retried
    Configuration,
}

impl FailureClass {
    pub fn is_transient(self) -> bool {
        matches!(self, FailureClass::Transient | FailureClass::RateLimited)
    }

    /// Classifies an HTTP status returned by a provider.
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            429 => FailureClass::RateLimited,
            408 | 409 | 425 => FailureClass::Transient,
            401 | 403 | 404 => FailureClass::Configuration,
            // 529 is Anthropic's "overloaded"
            500..=599 => FailureClass::Transient,
            _ => FailureClass::Fatal,
        }
    }

    /// Classifies a transport-level reqwest error.
    ///
    /// Body and decode errors come from reading the raw body (JSON parsing
    /// happens separately), so they mean the connection broke mid-response.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_status(status);
        }
        if err.is_timeout()
            || err.is_connect()
            || err.is_request()
            || err.is_body()
            || err.is_decode()
        {
            FailureClass::Transient
        } else {
            FailureClass::Fatal
        }
    }
}

/// Error from a single provider call, already classified.
#[derive(Debug, Clone, Error)]
#[error("{provider} call failed ({class:?}): {message}")]
pub struct ProviderError {
    pub provider: ProviderKind,
    pub class: FailureClass,
    pub message: String,
}

impl ProviderError {
    pub fn new(provider: ProviderKind, class: FailureClass, message: impl Into<String>) -> Self {
        Self {
            provider,
            class,
            message: message.into(),
        }
    }

    pub fn transient(provider: ProviderKind, message: impl Into<String>) -> Self {
        Self::new(provider, FailureClass::Transient, message)
    }

    pub fn rate_limited(provider: ProviderKind, message: impl Into<String>) -> Self {
        Self::new(provider, FailureClass::RateLimited, message)
    }

    pub fn fatal(provider: ProviderKind, message: impl Into<String>) -> Self {
        Self::new(provider, FailureClass::Fatal, message)
    }

    pub fn network(provider: ProviderKind, source: &reqwest::Error) -> Self {
        Self::new(provider, FailureClass::from_reqwest(source), source.to_string())
    }

    pub fn status(provider: ProviderKind, status: StatusCode, body: &str) -> Self {
        let snippet: String = body.chars().take(300).collect();
        Self::new(
            provider,
            FailureClass::from_status(status),
            format!("HTTP {}: {snippet}", status.as_u16()),
        )
    }
}

/// Errors surfaced by `GenerativeModel::generate`.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("malformed conversation: {reason}")]
    MalformedConversation { reason: String },
    #[error("provider '{provider}' still failing after {attempts} attempts: {last_error}")]
    TransientFailureExhausted {
        provider: ProviderKind,
        attempts: u32,
        #[source]
        last_error: ProviderError,
    },
    #[error("provider '{provider}' rejected the request: {source}")]
    Provider {
        provider: ProviderKind,
        #[source]
        source: ProviderError,
    },
    #[error("provider '{provider}' is misconfigured: {source}")]
    Configuration {
        provider: ProviderKind,
        #[source]
        source: ProviderError,
    },
    #[error("provider '{provider}' returned invalid response: {reason}")]
    InvalidResponse {
        provider: ProviderKind,
        reason: String,
    },
    #[error("generation cancelled")]
    Cancelled,
}

impl ModelError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedConversation {
            reason: reason.into(),
        }
    }

    pub fn invalid_response(provider: ProviderKind, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider,
            reason: reason.into(),
        }
    }

    /// Wraps a non-transient provider error.
    pub fn from_provider(err: ProviderError) -> Self {
        let provider = err.provider;
        match err.class {
            FailureClass::Configuration => Self::Configuration {
                provider,
                source: err,
            },
            _ => Self::Provider {
                provider,
                source: err,
            },
        }
    }
}
