use async_trait::async_trait;
use atelier_context::TitleSource;
use atelier_llm::{ChatClient, ChatRequest, ChatResponse, Content, Message};
use atelier_persist::ChatMessage;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{ChatError, Result};

pub const TITLE_MODEL: &str = "openai-reasoning";
pub const FALLBACK_TITLE: &str = "New chat";

const TITLE_SYSTEM_PROMPT: &str = "Create a short title (max. 5 words):";
const TITLE_PROMPT_HEADER: &str =
    "Create a short, concise title for the following conversation (at most 5 words):";

/// Transcript line for titling; any role is accepted and shown as-is
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TitleMessage {
    pub role: String,
    pub content: Content,
}

impl TitleMessage {
    pub fn new(role: impl Into<String>, content: impl Into<Content>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

impl From<Message> for TitleMessage {
    fn from(message: Message) -> Self {
        Self::new(message.role(), message.content().clone())
    }
}

/// Summarises a conversation into a short thread title
#[derive(Clone)]
pub struct TitleGenerator {
    client: Arc<dyn ChatClient>,
}

impl TitleGenerator {
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        Self { client }
    }

    pub fn build_prompt(messages: &[TitleMessage]) -> String {
        let lines: Vec<String> = messages
            .iter()
            .map(|message| {
                let speaker = match message.role.as_str() {
                    "user" => "User",
                    "assistant" => "Assistant",
                    other => other,
                };
                format!("{}: {}", speaker, message.content.to_plain_text())
            })
            .collect();
        format!("{}\n{}", TITLE_PROMPT_HEADER, lines.join("\n"))
    }

    pub fn build_request(messages: &[TitleMessage]) -> ChatRequest {
        ChatRequest::new(
            TITLE_MODEL,
            vec![
                Message::system(TITLE_SYSTEM_PROMPT),
                Message::human(Self::build_prompt(messages)),
            ],
        )
    }

    /// First line of the first choice, or the fallback title
    pub fn extract_title(response: &ChatResponse) -> String {
        response
            .choice_text()
            .and_then(|text| text.trim().lines().next())
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .unwrap_or(FALLBACK_TITLE)
            .to_string()
    }

    pub async fn title_for(&self, messages: &[TitleMessage]) -> Result<String> {
        if messages.is_empty() {
            return Err(ChatError::BadRequest("messages are required".to_string()));
        }

        let response = self
            .client
            .chat(Self::build_request(messages))
            .await
            .map_err(ChatError::Title)?;

        let title = Self::extract_title(&response);
        tracing::debug!(%title, "Generated thread title");
        Ok(title)
    }
}

#[async_trait]
impl TitleSource for TitleGenerator {
    async fn generate_title(&self, messages: &[ChatMessage]) -> anyhow::Result<String> {
        let messages: Vec<TitleMessage> = messages
            .iter()
            .cloned()
            .map(|m| TitleMessage::from(Message::from(m)))
            .collect();
        Ok(self.title_for(&messages).await?)
    }
}
