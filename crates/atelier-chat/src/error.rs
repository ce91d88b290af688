use atelier_context::ContextError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Chat request failed: {0}")]
    Completion(anyhow::Error),

    #[error("Title generation failed: {0}")]
    Title(anyhow::Error),

    #[error("No active thread")]
    NoActiveThread,

    #[error("Message is empty")]
    EmptyMessage,

    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error(transparent)]
    Context(#[from] ContextError),
}

pub type Result<T> = std::result::Result<T, ChatError>;
