//! Model factory - resolves a model name to a ready adapter

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use super::clients::{AnthropicClient, GeminiClient, OpenAIClient};
use super::generative::ModelAdapter;
use super::rotation::KeyRotation;
use super::traits::{GenerativeModel, ProviderClient};
use super::types::ProviderKind;
use crate::cancel::CancellationToken;
use crate::config::{AppConfig, CredentialSource};
use crate::constants::{ANTHROPIC_API_KEY_ENV, GOOGLE_API_KEY_ENV, OPENAI_API_KEY_ENV};

#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("unknown model '{name}': expected a gemini-*, claude-* or gpt-* name, or a provider/ prefix")]
    UnknownModel { name: String },
    #[error("provider '{provider}' requires environment variable {env_var}")]
    MissingCredential {
        provider: ProviderKind,
        env_var: &'static str,
    },
    #[error("failed to build HTTP client for '{provider}': {source}")]
    HttpClient {
        provider: ProviderKind,
        #[source]
        source: reqwest::Error,
    },
}

impl FactoryError {
    pub fn unknown_model(name: impl Into<String>) -> Self {
        Self::UnknownModel { name: name.into() }
    }
}

/// Environment variable holding credentials for a provider.
pub fn credential_env(provider: ProviderKind) -> &'static str {
    match provider {
        ProviderKind::Gemini => GOOGLE_API_KEY_ENV,
        ProviderKind::Anthropic => ANTHROPIC_API_KEY_ENV,
        ProviderKind::OpenAI => OPENAI_API_KEY_ENV,
    }
}

/// Maps a model name to its provider and the model id sent on the wire.
///
/// An explicit `provider/` prefix wins and is stripped; otherwise the
/// provider is inferred from the model family name.
pub fn infer_provider(model_name: &str) -> Result<(ProviderKind, String), FactoryError> {
    let name = model_name.trim();
    if let Some((prefix, model)) = name.split_once('/') {
        let provider = match prefix.to_lowercase().as_str() {
            "gemini" | "google" => Some(ProviderKind::Gemini),
            "anthropic" | "claude" => Some(ProviderKind::Anthropic),
            "openai" => Some(ProviderKind::OpenAI),
            _ => None,
        };
        return match provider {
            Some(provider) if !model.trim().is_empty() => Ok((provider, model.trim().to_string())),
            _ => Err(FactoryError::unknown_model(model_name)),
        };
    }

    let lower = name.to_lowercase();
    let provider = if lower.starts_with("gemini") {
        ProviderKind::Gemini
    } else if lower.starts_with("claude") {
        ProviderKind::Anthropic
    } else if lower.starts_with("gpt-")
        || lower.starts_with("chatgpt")
        || ["o1", "o3", "o4"].iter().any(|p| lower.starts_with(p))
    {
        ProviderKind::OpenAI
    } else {
        return Err(FactoryError::unknown_model(model_name));
    };
    Ok((provider, name.to_string()))
}

/// Builds retrying adapters from a model name.
///
/// Credentials are read eagerly inside `resolve`: a missing key fails at
/// resolution time rather than on the first `generate`. No network calls
/// are made.
pub struct ModelFactory {
    config: AppConfig,
    credentials: Arc<dyn CredentialSource>,
    cancel: CancellationToken,
}

impl ModelFactory {
    pub fn new(config: AppConfig, credentials: Arc<dyn CredentialSource>) -> Self {
        Self {
            config,
            credentials,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn resolve(&self, model_name: &str) -> Result<Arc<dyn GenerativeModel>, FactoryError> {
        let (provider, model) = infer_provider(model_name)?;
        let keys = self.load_keys(provider)?;
        debug!(
            provider = provider.as_str(),
            model = model.as_str(),
            keys = keys.len(),
            "Resolved judge model"
        );

        let timeout = self.config.request_timeout();
        let endpoints = &self.config.endpoints;
        let http_err = |source| FactoryError::HttpClient { provider, source };
        let adapter: Arc<dyn GenerativeModel> = match provider {
            ProviderKind::Gemini => self.wrap(
                GeminiClient::new(endpoints.gemini.as_str(), timeout).map_err(http_err)?,
                model,
                keys,
            ),
            ProviderKind::Anthropic => self.wrap(
                AnthropicClient::new(endpoints.anthropic.as_str(), timeout).map_err(http_err)?,
                model,
                keys,
            ),
            ProviderKind::OpenAI => self.wrap(
                OpenAIClient::new(endpoints.openai.as_str(), timeout).map_err(http_err)?,
                model,
                keys,
            ),
        };
        info!(
            provider = provider.as_str(),
            model = adapter.model_name(),
            "Judge model ready"
        );
        Ok(adapter)
    }

    fn wrap<C>(&self, client: C, model: String, keys: KeyRotation) -> Arc<dyn GenerativeModel>
    where
        C: ProviderClient + 'static,
    {
        Arc::new(
            ModelAdapter::new(client, model, keys)
                .with_retry(self.config.retry_policy())
                .with_cancellation(self.cancel.clone()),
        )
    }

    fn load_keys(&self, provider: ProviderKind) -> Result<KeyRotation, FactoryError> {
        let env_var = credential_env(provider);
        let missing = || FactoryError::MissingCredential { provider, env_var };
        let raw = self.credentials.get(env_var).ok_or_else(missing)?;
        let keys = if provider.rotates_keys() {
            KeyRotation::from_csv(&raw)
        } else {
            KeyRotation::new(vec![raw.trim().to_string()])
        };
        keys.ok_or_else(missing)
    }
}
