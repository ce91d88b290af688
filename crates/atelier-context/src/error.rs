use atelier_persist::PersistError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContextError {
    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),

    #[error("Thread not found: {0}")]
    ThreadNotFound(String),
}

pub type Result<T> = std::result::Result<T, ContextError>;
