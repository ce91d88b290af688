use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("BFL_API_KEY not configured")]
    MissingApiKey,

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream error ({status}) during {stage}: {body}")]
    Upstream {
        stage: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("Image job failed: {0}")]
    JobFailed(String),

    #[error("Image job not ready after {attempts} polls")]
    Timeout { attempts: u32 },

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, ImageError>;
