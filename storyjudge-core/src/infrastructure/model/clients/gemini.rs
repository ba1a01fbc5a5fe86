//! Gemini client implementation

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info};

use super::base::HttpClientBase;
use crate::constants::DEFAULT_GEMINI_API_PATH;
use crate::domain::Conversation;
use crate::infrastructure::model::adapter::MessageAdapter;
use crate::infrastructure::model::traits::ProviderClient;
use crate::infrastructure::model::types::{ModelError, ProviderError, ProviderKind};

/// Harm categories whose blocking is switched off for judging.
const SAFETY_CATEGORIES: [&str; 5] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
    "HARM_CATEGORY_CIVIC_INTEGRITY",
];

/// Gemini client for Google AI
#[derive(Clone)]
pub struct GeminiClient {
    base: HttpClientBase,
}

impl GeminiClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            base: HttpClientBase::new(ProviderKind::Gemini, endpoint, timeout)?,
        })
    }

    fn build_model_url(&self, model: &str) -> String {
        let base = self.base.endpoint.trim_end_matches('/');
        format!("{base}/{DEFAULT_GEMINI_API_PATH}/{model}:generateContent")
    }
}

/// Deterministic judging: temperature 0 and no safety blocking.
fn generation_settings() -> (Value, Vec<Value>) {
    let config = json!({ "temperature": 0.0 });
    let safety = SAFETY_CATEGORIES
        .iter()
        .map(|category| json!({ "category": category, "threshold": "OFF" }))
        .collect();
    (config, safety)
}

#[async_trait]
impl ProviderClient for GeminiClient {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn build_payload(&self, _model: &str, conversation: &Conversation) -> Result<Value, ModelError> {
        let history = MessageAdapter::to_gemini_format(conversation)?;
        let (generation_config, safety_settings) = generation_settings();

        let mut payload = json!({
            "contents": history.contents,
            "generationConfig": generation_config,
            "safetySettings": safety_settings,
        });
        if let Some(system) = history.system_instruction_value() {
            payload["systemInstruction"] = system;
        }
        Ok(payload)
    }

    async fn send(
        &self,
        model: &str,
        payload: &Value,
        api_key: &str,
    ) -> Result<String, ProviderError> {
        let url = self.build_model_url(model);

        info!(provider = "gemini", model, "Sending request to Gemini");

        let response: GeminiResponse = self.base.post_with_query_key(&url, api_key, payload).await?;
        debug!("Received response from Gemini");

        let text: String = response
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "missing text".to_string());
            return Err(ProviderError::fatal(ProviderKind::Gemini, reason));
        }
        Ok(text)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}
