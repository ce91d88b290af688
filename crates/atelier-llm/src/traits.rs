use crate::types::Message;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Trait for chat-based completion endpoints
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Non-streaming chat completion
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub options: ChatOptions,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: ChatOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl ChatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }
}

/// Raw completion response
///
/// Upstream services answer in several shapes: OpenAI chat
/// (`choices[0].message.content`), legacy completion (`choices[0].text`)
/// or a flat object with `reply` / `content`.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub raw: Value,
}

impl ChatResponse {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    /// `true` when `choices` is a non-empty array
    pub fn has_choices(&self) -> bool {
        self.raw
            .get("choices")
            .and_then(Value::as_array)
            .is_some_and(|choices| !choices.is_empty())
    }

    /// Text of the first choice, a non-empty `message.content` before `text`
    pub fn choice_text(&self) -> Option<&str> {
        let choice = self.raw.get("choices")?.as_array()?.first()?;
        choice
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(Value::as_str)
            .filter(|content| !content.is_empty())
            .or_else(|| choice.get("text").and_then(Value::as_str))
    }

    /// Reply text across all known shapes
    ///
    /// A response with choices but no readable text yields an empty reply.
    /// `None` means the shape was not recognised at all.
    pub fn reply(&self) -> Option<&str> {
        if self.has_choices() {
            return Some(self.choice_text().unwrap_or(""));
        }
        self.raw
            .get("reply")
            .and_then(Value::as_str)
            .or_else(|| self.raw.get("content").and_then(Value::as_str))
    }
}
