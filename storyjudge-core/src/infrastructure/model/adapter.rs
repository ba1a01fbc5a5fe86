//! History translators - convert the neutral conversation into each
//! provider's native request shape.
//!
//! Every translator builds a fresh structure from a borrowed conversation.
//! System messages are never dropped: providers without an in-line system
//! turn receive them, in order, in their dedicated system slot.

use crate::domain::{Conversation, MessageRole};
use crate::infrastructure::model::types::ModelError;
use serde_json::{Value, json};

/// Anthropic Messages API history: top-level system prompt plus turns.
#[derive(Debug, Clone, PartialEq)]
pub struct AnthropicHistory {
    pub system: Vec<String>,
    pub messages: Vec<Value>,
}

impl AnthropicHistory {
    /// System field as sent on the wire.
    pub fn system_text(&self) -> Option<String> {
        if self.system.is_empty() {
            None
        } else {
            Some(self.system.join("\n\n"))
        }
    }
}

/// Gemini `generateContent` history: system instruction parts plus contents.
#[derive(Debug, Clone, PartialEq)]
pub struct GeminiHistory {
    pub system_instruction: Vec<String>,
    pub contents: Vec<Value>,
}

impl GeminiHistory {
    pub fn system_instruction_value(&self) -> Option<Value> {
        if self.system_instruction.is_empty() {
            return None;
        }
        let parts: Vec<Value> = self
            .system_instruction
            .iter()
            .map(|text| json!({ "text": text }))
            .collect();
        Some(json!({ "parts": parts }))
    }
}

/// Adapter for converting messages to different API formats
pub struct MessageAdapter;

impl MessageAdapter {
    /// Convert messages to OpenAI-style format
    /// Returns: [{"role": "...", "content": "..."}]
    pub fn to_openai_format(conversation: &Conversation) -> Vec<Value> {
        conversation
            .iter()
            .map(|msg| {
                json!({
                    "role": msg.role.as_str(),
                    "content": msg.content.as_str()
                })
            })
            .collect()
    }

    /// Convert messages to Anthropic format. Requires a trailing user turn.
    pub fn to_anthropic_format(conversation: &Conversation) -> Result<AnthropicHistory, ModelError> {
        require_trailing_user(conversation)?;

        let mut system = Vec::new();
        let mut messages = Vec::new();
        for message in conversation.iter() {
            match message.role {
                MessageRole::System => system.push(message.content.clone()),
                MessageRole::User | MessageRole::Assistant => messages.push(json!({
                    "role": message.role.as_str(),
                    "content": message.content.as_str()
                })),
            }
        }

        Ok(AnthropicHistory { system, messages })
    }

    /// Convert messages to Gemini format. Requires a trailing user turn.
    pub fn to_gemini_format(conversation: &Conversation) -> Result<GeminiHistory, ModelError> {
        require_trailing_user(conversation)?;

        let mut system_instruction = Vec::new();
        let mut contents = Vec::new();
        for message in conversation.iter() {
            match message.role {
                MessageRole::System => system_instruction.push(message.content.clone()),
                MessageRole::User => contents.push(json!({
                    "role": "user",
                    "parts": [{"text": message.content.as_str()}]
                })),
                MessageRole::Assistant => contents.push(json!({
                    "role": "model",
                    "parts": [{"text": message.content.as_str()}]
                })),
            }
        }

        Ok(GeminiHistory {
            system_instruction,
            contents,
        })
    }
}

/// Fails unless the conversation is non-empty and ends with a user turn.
pub fn require_trailing_user(conversation: &Conversation) -> Result<(), ModelError> {
    match conversation.last() {
        None => Err(ModelError::malformed("conversation is empty")),
        Some(last) if last.role != MessageRole::User => Err(ModelError::malformed(format!(
            "last message role is not user: {}",
            last.role.as_str()
        ))),
        Some(_) => Ok(()),
    }
}
