mod thread;

pub use thread::{
    now_millis, ChatMessage, ChatThread, MessageRole, ThreadPatch, DEFAULT_MODEL, DEFAULT_PERSONA,
    DEFAULT_STYLE, DEFAULT_TOOL,
};
