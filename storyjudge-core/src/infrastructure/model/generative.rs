//! Retrying model adapter shared by every provider.
//!
//! A `ProviderClient` knows the wire protocol; `ModelAdapter` owns the
//! bounded retry loop, credential rotation and cancellation so that every
//! provider behaves the same from the caller's side.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::adapter::require_trailing_user;
use super::retry::RetryPolicy;
use super::rotation::KeyRotation;
use super::traits::{GenerativeModel, ProviderClient};
use super::types::{FailureClass, ModelError, ProviderKind};
use crate::cancel::CancellationToken;
use crate::domain::Conversation;

pub struct ModelAdapter<C> {
    client: C,
    model: String,
    keys: KeyRotation,
    retry: RetryPolicy,
    cancel: CancellationToken,
}

impl<C: ProviderClient> ModelAdapter<C> {
    pub fn new(client: C, model: impl Into<String>, keys: KeyRotation) -> Self {
        Self {
            client,
            model: model.into(),
            keys,
            retry: RetryPolicy::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn keys(&self) -> &KeyRotation {
        &self.keys
    }
}

#[async_trait]
impl<C: ProviderClient> GenerativeModel for ModelAdapter<C> {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider(&self) -> ProviderKind {
        self.client.provider()
    }

    async fn generate(&self, conversation: &Conversation) -> Result<String, ModelError> {
        require_trailing_user(conversation)?;
        let provider = self.client.provider();
        let payload = self.client.build_payload(&self.model, conversation)?;

        let mut attempt = 0u32;
        loop {
            if self.cancel.is_cancelled() {
                return Err(ModelError::Cancelled);
            }
            attempt += 1;
            let (key_index, api_key) = self.keys.current();

            debug!(
                provider = provider.as_str(),
                model = self.model.as_str(),
                attempt,
                key_index,
                messages = conversation.len(),
                "Starting chat completion"
            );

            let outcome = tokio::select! {
                outcome = self.client.send(&self.model, &payload, &api_key) => outcome,
                _ = self.cancel.cancelled() => return Err(ModelError::Cancelled),
            };
            let err = match outcome {
                Ok(text) => return Ok(text.trim().to_string()),
                Err(err) => err,
            };

            if !err.class.is_transient() {
                warn!(
                    provider = provider.as_str(),
                    model = self.model.as_str(),
                    error = %err,
                    "Provider call failed permanently"
                );
                return Err(ModelError::from_provider(err));
            }

            if err.class == FailureClass::RateLimited {
                let next = self.keys.advance_from(key_index);
                info!(
                    provider = provider.as_str(),
                    from = key_index,
                    to = next,
                    keys = self.keys.len(),
                    "Switched API key after rate limit"
                );
            }

            if !self.retry.allows_retry_after(attempt) {
                warn!(
                    provider = provider.as_str(),
                    model = self.model.as_str(),
                    attempts = attempt,
                    error = %err,
                    "Giving up after repeated transient failures"
                );
                return Err(ModelError::TransientFailureExhausted {
                    provider,
                    attempts: attempt,
                    last_error: err,
                });
            }

            let delay = self.retry.delay_after(attempt);
            warn!(
                provider = provider.as_str(),
                attempt,
                max_attempts = self.retry.max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Transient provider error, retrying"
            );
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = self.cancel.cancelled() => return Err(ModelError::Cancelled),
            }
        }
    }
}
