use atelier_llm::{ChatClient, ChatOptions, ChatRequest, Message};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{ChatError, Result};
use crate::models::resolve_model;
use crate::styles::ResponseStyle;

pub const NO_REPLY: &str = "No reply received.";
pub const CHAT_MAX_TOKENS: u32 = 500;
pub const CHAT_TEMPERATURE: f32 = 1.0;

/// Chat turn as received from a client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatInput {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
}

impl ChatInput {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }
}

/// Builds the styled completion request and extracts the reply
#[derive(Clone)]
pub struct ChatOrchestrator {
    client: Arc<dyn ChatClient>,
}

impl ChatOrchestrator {
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        Self { client }
    }

    pub fn build_request(&self, input: ChatInput) -> Result<ChatRequest> {
        if input.messages.is_empty() {
            return Err(ChatError::BadRequest("messages are required".to_string()));
        }

        let model = resolve_model(input.model.as_deref());
        let style = ResponseStyle::resolve(input.style.as_deref());

        let mut messages = Vec::with_capacity(input.messages.len() + 1);
        messages.push(Message::system(style.system_prompt()));
        messages.extend(input.messages);

        Ok(ChatRequest::new(model, messages).with_options(
            ChatOptions::new()
                .max_tokens(CHAT_MAX_TOKENS)
                .temperature(CHAT_TEMPERATURE),
        ))
    }

    pub async fn reply(&self, input: ChatInput) -> Result<String> {
        let request = self.build_request(input)?;
        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Sending chat request"
        );

        let response = self
            .client
            .chat(request)
            .await
            .map_err(ChatError::Completion)?;

        match response.reply() {
            Some(reply) => Ok(reply.to_string()),
            None => {
                tracing::warn!(response = %response.raw, "Unexpected completion response shape");
                Ok(NO_REPLY.to_string())
            }
        }
    }
}
