use atelier_chat::ChatError;
use atelier_context::ContextError;
use atelier_image::ImageError;
use atelier_persist::PersistError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Chat request failed: {0}")]
    Chat(String),

    #[error("Title generation failed")]
    Title(String),

    #[error("Image generation failed")]
    ImageGeneration(String),

    #[error("Failed to fetch models")]
    Models(String),

    #[error("Image job did not finish in time")]
    Timeout(String),

    #[error("Persistence error: {0}")]
    Persist(PersistError),

    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::ThreadNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Bad input and timeouts keep their own status, the rest go to `fallback`
    pub fn from_image(err: ImageError, fallback: fn(String) -> ApiError) -> Self {
        match err {
            ImageError::BadRequest(msg) => ApiError::BadRequest(msg),
            timeout @ ImageError::Timeout { .. } => ApiError::Timeout(timeout.to_string()),
            other => fallback(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Chat(detail) => {
                tracing::error!(error = %detail, "Chat error");
                self.to_string()
            }
            ApiError::Title(detail)
            | ApiError::ImageGeneration(detail)
            | ApiError::Models(detail)
            | ApiError::Timeout(detail)
            | ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "{}", self);
                self.to_string()
            }
            ApiError::Persist(e) => {
                tracing::error!("Persistence error: {}", e);
                "Storage error".to_string()
            }
            ApiError::ThreadNotFound(_) | ApiError::BadRequest(_) => self.to_string(),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PersistError> for ApiError {
    fn from(err: PersistError) -> Self {
        match err {
            err @ PersistError::InvalidId(_) => ApiError::BadRequest(err.to_string()),
            other => ApiError::Persist(other),
        }
    }
}

impl From<ContextError> for ApiError {
    fn from(err: ContextError) -> Self {
        match err {
            ContextError::ThreadNotFound(id) => ApiError::ThreadNotFound(id),
            ContextError::Persist(e) => e.into(),
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::BadRequest(msg) => ApiError::BadRequest(msg),
            err @ (ChatError::EmptyMessage | ChatError::NoActiveThread) => {
                ApiError::BadRequest(err.to_string())
            }
            ChatError::ThreadNotFound(id) => ApiError::ThreadNotFound(id),
            ChatError::Completion(e) => ApiError::Chat(format!("{:#}", e)),
            ChatError::Title(e) => ApiError::Title(format!("{:#}", e)),
            ChatError::Context(e) => e.into(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
