use serde::Serialize;

/// Completion model offered to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChatModel {
    pub id: &'static str,
    pub label: &'static str,
}

pub const DEFAULT_CHAT_MODEL: &str = "openai";

pub const SUPPORTED_MODELS: &[ChatModel] = &[
    ChatModel { id: "openai", label: "OpenAI GPT-4.1-nano" },
    ChatModel { id: "openai-large", label: "OpenAI GPT-4.1-mini" },
    ChatModel { id: "openai-reasoning", label: "OpenAI o4-mini" },
    ChatModel { id: "qwen-coder", label: "Qwen 2.5 Coder 32B" },
    ChatModel { id: "llama", label: "Llama 3.3 70B" },
    ChatModel { id: "llamascout", label: "Llama 4 Scout 17B" },
    ChatModel { id: "mistral", label: "Mistral Small 3" },
    ChatModel { id: "unity", label: "Unity Mistral Large" },
];

/// Supported model id for `requested`, `openai` for anything else
pub fn resolve_model(requested: Option<&str>) -> &'static str {
    requested
        .and_then(|id| SUPPORTED_MODELS.iter().find(|m| m.id == id))
        .map(|m| m.id)
        .unwrap_or(DEFAULT_CHAT_MODEL)
}
