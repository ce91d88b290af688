use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

use crate::error::{ImageError, Result};
use crate::output::{strip_data_url, GeneratedImage};

pub const BFL_API_BASE: &str = "https://api.bfl.ai/v1";
pub const KONTEXT_MODEL: &str = "flux-kontext-pro";

/// Polling cadence for job status checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 30,
        }
    }
}

impl PollConfig {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }
}

/// Job request; unknown fields (aspect_ratio, steps, ...) are forwarded untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KontextRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl KontextRequest {
    fn has_prompt(&self) -> bool {
        self.prompt.as_deref().is_some_and(|p| !p.is_empty())
    }

    fn has_input_image(&self) -> bool {
        self.input_image.as_deref().is_some_and(|i| !i.is_empty())
    }

    /// Endpoint path: editing always goes to the kontext model
    fn endpoint(&self) -> &str {
        if self.has_input_image() {
            KONTEXT_MODEL
        } else {
            self.model
                .as_deref()
                .filter(|m| !m.is_empty())
                .unwrap_or(KONTEXT_MODEL)
        }
    }

    /// Body sent to the job API: `{prompt, ...extra}` plus the input image
    /// reduced to raw base64 when it came in as a `data:` URL
    fn payload(&self) -> Value {
        let mut payload = self.extra.clone();
        if let Some(prompt) = &self.prompt {
            payload.insert("prompt".to_string(), Value::String(prompt.clone()));
        }
        if let Some(image) = self.input_image.as_deref().filter(|i| !i.is_empty()) {
            let image = strip_data_url(image).unwrap_or(image);
            payload.insert("input_image".to_string(), Value::String(image.to_string()));
        }
        Value::Object(payload)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobHandle {
    pub id: String,
    #[serde(default)]
    pub polling_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Ready,
    Failed,
    Error,
    Pending(String),
}

impl From<&str> for JobStatus {
    fn from(status: &str) -> Self {
        match status {
            "Ready" => JobStatus::Ready,
            "Failed" => JobStatus::Failed,
            "Error" => JobStatus::Error,
            other => JobStatus::Pending(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct PollResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    result: Option<Value>,
}

pub struct BflClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    poll: PollConfig,
}

impl BflClient {
    pub fn new(api_key: Option<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder().build()?;
        Ok(Self {
            http_client,
            base_url: BFL_API_BASE.to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            poll: PollConfig::default(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Where to ask for the status of `job`
    pub fn poll_url(&self, job: &JobHandle) -> String {
        match job.polling_url.as_deref().filter(|u| !u.is_empty()) {
            Some(url) if url.contains("?id=") => url.to_string(),
            Some(url) => format!("{}?id={}", url, job.id),
            None => format!("{}/get_result?id={}", self.base_url, job.id),
        }
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or(ImageError::MissingApiKey)
    }

    /// Submit, poll until ready and return the image as a data URL
    pub async fn generate(&self, request: &KontextRequest) -> Result<String> {
        let image = self.generate_image(request).await?;
        Ok(image.to_data_url())
    }

    pub async fn generate_image(&self, request: &KontextRequest) -> Result<GeneratedImage> {
        if !request.has_prompt() && !request.has_input_image() {
            return Err(ImageError::BadRequest(
                "prompt or input image is required".to_string(),
            ));
        }

        let job = self.start_job(request).await?;
        let sample_url = self.wait_for_result(&job).await?;
        self.download(&sample_url).await
    }

    pub async fn start_job(&self, request: &KontextRequest) -> Result<JobHandle> {
        let api_key = self.api_key()?;
        let url = format!("{}/{}", self.base_url, request.endpoint());
        tracing::info!(%url, editing = request.has_input_image(), "Starting image job");

        let response = self
            .http_client
            .post(&url)
            .header(ACCEPT, "application/json")
            .header("x-key", api_key)
            .json(&request.payload())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, %body, "Image job start rejected");
            return Err(ImageError::Upstream {
                stage: "job start",
                status,
                body,
            });
        }

        let job: JobHandle = response.json().await?;
        tracing::debug!(job_id = %job.id, polling_url = ?job.polling_url, "Image job accepted");
        Ok(job)
    }

    /// Poll at a fixed interval; returns the sample URL once the job is ready
    pub async fn wait_for_result(&self, job: &JobHandle) -> Result<String> {
        let api_key = self.api_key()?;
        let url = self.poll_url(job);

        for attempt in 1..=self.poll.max_attempts {
            tokio::time::sleep(self.poll.interval).await;
            tracing::debug!(%url, attempt, "Polling image job");

            let response = self
                .http_client
                .get(&url)
                .header(ACCEPT, "application/json")
                .header("x-key", api_key)
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                tracing::error!(%status, %body, "Image job status request failed");
                return Err(ImageError::Upstream {
                    stage: "status poll",
                    status,
                    body,
                });
            }

            let poll: PollResponse = response.json().await?;
            match JobStatus::from(poll.status.as_str()) {
                JobStatus::Ready => {
                    return poll
                        .result
                        .as_ref()
                        .and_then(|r| r.get("sample"))
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .ok_or_else(|| {
                            ImageError::InvalidResponse("ready job without result.sample".to_string())
                        });
                }
                JobStatus::Failed | JobStatus::Error => {
                    let detail = poll
                        .result
                        .map(|r| r.to_string())
                        .unwrap_or_else(|| poll.status.clone());
                    tracing::error!(job_id = %job.id, %detail, "Image job failed");
                    return Err(ImageError::JobFailed(detail));
                }
                JobStatus::Pending(status) => {
                    tracing::debug!(job_id = %job.id, %status, "Image job pending");
                }
            }
        }

        Err(ImageError::Timeout {
            attempts: self.poll.max_attempts,
        })
    }

    async fn download(&self, sample_url: &str) -> Result<GeneratedImage> {
        let response = self.http_client.get(sample_url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ImageError::Upstream {
                stage: "image download",
                status,
                body,
            });
        }
        Ok(GeneratedImage::from_response(response).await?)
    }
}
