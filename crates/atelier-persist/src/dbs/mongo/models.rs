use serde::{Deserialize, Serialize};

use crate::models::{ChatMessage, ChatThread};

/// MongoDB document for a thread (thread id stored as `_id`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct MongoThread {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub model: String,
    pub style: String,
    pub messages: Vec<ChatMessage>,
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<Vec<ChatMessage>>,
}

impl From<ChatThread> for MongoThread {
    fn from(thread: ChatThread) -> Self {
        Self {
            id: thread.id,
            title: thread.title,
            model: thread.model,
            style: thread.style,
            messages: thread.messages,
            updated_at: thread.updated_at,
            persona: thread.persona,
            tool: thread.tool,
            memory: thread.memory,
        }
    }
}

impl From<MongoThread> for ChatThread {
    fn from(thread: MongoThread) -> Self {
        Self {
            id: thread.id,
            title: thread.title,
            model: thread.model,
            style: thread.style,
            messages: thread.messages,
            updated_at: thread.updated_at,
            persona: thread.persona,
            tool: thread.tool,
            memory: thread.memory,
        }
    }
}
