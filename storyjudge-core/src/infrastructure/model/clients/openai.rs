//! OpenAI-compatible client implementation

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info};

use super::base::HttpClientBase;
use crate::domain::Conversation;
use crate::infrastructure::model::adapter::MessageAdapter;
use crate::infrastructure::model::traits::ProviderClient;
use crate::infrastructure::model::types::{ModelError, ProviderError, ProviderKind};

const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// OpenAI-compatible client (OpenAI, and any endpoint speaking chat completions)
#[derive(Clone)]
pub struct OpenAIClient {
    base: HttpClientBase,
}

impl OpenAIClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            base: HttpClientBase::new(ProviderKind::OpenAI, endpoint, timeout)?,
        })
    }
}

#[async_trait]
impl ProviderClient for OpenAIClient {
    fn provider(&self) -> ProviderKind {
        ProviderKind::OpenAI
    }

    fn build_payload(&self, model: &str, conversation: &Conversation) -> Result<Value, ModelError> {
        Ok(json!({
            "model": model,
            "messages": MessageAdapter::to_openai_format(conversation),
            "stream": false,
        }))
    }

    async fn send(
        &self,
        model: &str,
        payload: &Value,
        api_key: &str,
    ) -> Result<String, ProviderError> {
        let url = self.base.build_url(CHAT_COMPLETIONS_PATH);

        info!(provider = "openai", model, "Sending request to OpenAI-compatible provider");

        let response: OpenAIResponse = self.base.post_with_bearer(&url, api_key, payload).await?;
        debug!("Received response from OpenAI-compatible provider");

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or_else(|| ProviderError::fatal(ProviderKind::OpenAI, "missing content"))
    }
}

#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: Option<OpenAIMessage>,
}

#[derive(Deserialize)]
struct OpenAIMessage {
    content: Option<String>,
}
