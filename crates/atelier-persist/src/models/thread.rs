use atelier_llm::Content;
use chrono::Utc;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "openai";
pub const DEFAULT_STYLE: &str = "normal";
pub const DEFAULT_PERSONA: &str = "default";
pub const DEFAULT_TOOL: &str = "chatbot";

/// Persisted conversation thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatThread {
    pub id: String,
    pub title: String,
    pub model: String,
    pub style: String,
    pub messages: Vec<ChatMessage>,
    /// Milliseconds since the Unix epoch
    pub updated_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<Vec<ChatMessage>>,
}

impl ChatThread {
    /// Empty thread with the default model, style, persona and tool
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            model: DEFAULT_MODEL.to_string(),
            style: DEFAULT_STYLE.to_string(),
            messages: Vec::new(),
            updated_at: now_millis(),
            persona: Some(DEFAULT_PERSONA.to_string()),
            tool: Some(DEFAULT_TOOL.to_string()),
            memory: Some(Vec::new()),
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now_millis();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: Content,
}

impl ChatMessage {
    pub fn user(content: impl Into<Content>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<Content>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// Partial update of a thread; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreadPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub persona: Option<String>,
    #[serde(default)]
    pub tool: Option<String>,
    #[serde(default)]
    pub memory: Option<Vec<ChatMessage>>,
    #[serde(default)]
    pub messages: Option<Vec<ChatMessage>>,
}

impl ThreadPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn model(model: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            ..Self::default()
        }
    }

    pub fn style(style: impl Into<String>) -> Self {
        Self {
            style: Some(style.into()),
            ..Self::default()
        }
    }

    /// Merge into `thread` and bump its timestamp
    pub fn apply_to(self, thread: &mut ChatThread) {
        if let Some(title) = self.title {
            thread.title = title;
        }
        if let Some(model) = self.model {
            thread.model = model;
        }
        if let Some(style) = self.style {
            thread.style = style;
        }
        if let Some(persona) = self.persona {
            thread.persona = Some(persona);
        }
        if let Some(tool) = self.tool {
            thread.tool = Some(tool);
        }
        if let Some(memory) = self.memory {
            thread.memory = Some(memory);
        }
        if let Some(messages) = self.messages {
            thread.messages = messages;
        }
        thread.touch();
    }
}

// Conversion: ChatMessage → atelier_llm::Message
impl From<ChatMessage> for atelier_llm::Message {
    fn from(msg: ChatMessage) -> Self {
        match msg.role {
            MessageRole::User => atelier_llm::Message::human(msg.content),
            MessageRole::Assistant => atelier_llm::Message::ai(msg.content),
        }
    }
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
