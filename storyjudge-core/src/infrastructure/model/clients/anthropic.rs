//! Anthropic Messages API client implementation

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info};

use super::base::HttpClientBase;
use crate::constants::{ANTHROPIC_API_VERSION, ANTHROPIC_MAX_TOKENS};
use crate::domain::Conversation;
use crate::infrastructure::model::adapter::MessageAdapter;
use crate::infrastructure::model::traits::ProviderClient;
use crate::infrastructure::model::types::{ModelError, ProviderError, ProviderKind};

#[derive(Clone)]
pub struct AnthropicClient {
    base: HttpClientBase,
    max_tokens: u32,
}

impl AnthropicClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            base: HttpClientBase::new(ProviderKind::Anthropic, endpoint, timeout)?,
            max_tokens: ANTHROPIC_MAX_TOKENS,
        })
    }
}

#[async_trait]
impl ProviderClient for AnthropicClient {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn build_payload(&self, model: &str, conversation: &Conversation) -> Result<Value, ModelError> {
        let history = MessageAdapter::to_anthropic_format(conversation)?;

        let mut payload = json!({
            "model": model,
            "messages": history.messages,
            "max_tokens": self.max_tokens,
        });
        if let Some(system) = history.system_text() {
            payload["system"] = Value::String(system);
        }
        Ok(payload)
    }

    async fn send(
        &self,
        model: &str,
        payload: &Value,
        api_key: &str,
    ) -> Result<String, ProviderError> {
        let url = self.base.build_url("/v1/messages");

        info!(provider = "anthropic", model, "Sending request to Anthropic");

        let headers = [
            ("x-api-key", api_key),
            ("anthropic-version", ANTHROPIC_API_VERSION),
        ];
        let response: AnthropicResponse = self.base.post_with_headers(&url, &headers, payload).await?;
        debug!(stop_reason = ?response.stop_reason, "Received response from Anthropic");

        response
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .ok_or_else(|| ProviderError::fatal(ProviderKind::Anthropic, "missing text content"))
    }
}

#[derive(Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicContentBlock>,
    stop_reason: Option<String>,
}

#[derive(Deserialize)]
struct AnthropicContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}
