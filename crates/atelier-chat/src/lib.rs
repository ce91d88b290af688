pub mod error;
pub mod models;
pub mod styles;
pub mod orchestrator;
pub mod title;
pub mod session;

pub use error::{ChatError, Result};
pub use models::{resolve_model, ChatModel, SUPPORTED_MODELS};
pub use styles::ResponseStyle;
pub use orchestrator::{ChatInput, ChatOrchestrator, NO_REPLY};
pub use title::{TitleGenerator, TitleMessage, FALLBACK_TITLE, TITLE_MODEL};
pub use session::{ChatSession, SendOutcome, IMAGE_ONLY_PROMPT};
