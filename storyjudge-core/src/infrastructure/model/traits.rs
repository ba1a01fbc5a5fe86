//! Model traits

use super::types::{ModelError, ProviderError, ProviderKind};
use crate::domain::Conversation;
use async_trait::async_trait;
use serde_json::Value;

/// Uniform judge interface. Implementations hide provider selection,
/// retry and credential rotation from callers.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Model identifier sent to the provider
    fn model_name(&self) -> &str;

    fn provider(&self) -> ProviderKind;

    /// Returns the trimmed reply text for a conversation ending in a user turn.
    async fn generate(&self, conversation: &Conversation) -> Result<String, ModelError>;
}

/// One provider's wire protocol: translation plus a single HTTP round-trip.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    fn provider(&self) -> ProviderKind;

    /// Translates the conversation into the provider's request body.
    /// Pure; runs once per `generate`, before any network call.
    fn build_payload(&self, model: &str, conversation: &Conversation) -> Result<Value, ModelError>;

    /// Sends a prepared payload using `api_key` and returns the raw reply text.
    async fn send(&self, model: &str, payload: &Value, api_key: &str)
    -> Result<String, ProviderError>;
}
