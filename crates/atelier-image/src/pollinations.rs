use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ImageError, Result};
use crate::output::GeneratedImage;

pub const POLLINATIONS_IMAGE_BASE: &str = "https://image.pollinations.ai";
pub const DEFAULT_DIMENSION: u32 = 1024;

/// Query-parameterised text-to-image request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub seed: Option<i64>,
    #[serde(default)]
    pub nologo: bool,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub enhance: bool,
    #[serde(default)]
    pub safe: bool,
    #[serde(default)]
    pub transparent: bool,
    #[serde(default)]
    pub referrer: Option<String>,
}

impl ImageRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Query pairs in the order the image service documents them
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(model) = self.model.as_deref().filter(|m| !m.is_empty()) {
            pairs.push(("model", model.to_string()));
        }
        let width = self.width.unwrap_or(DEFAULT_DIMENSION);
        if width > 0 {
            pairs.push(("width", width.to_string()));
        }
        let height = self.height.unwrap_or(DEFAULT_DIMENSION);
        if height > 0 {
            pairs.push(("height", height.to_string()));
        }
        if let Some(seed) = self.seed {
            pairs.push(("seed", seed.to_string()));
        }
        for (name, enabled) in [
            ("nologo", self.nologo),
            ("private", self.private),
            ("enhance", self.enhance),
            ("safe", self.safe),
            ("transparent", self.transparent),
        ] {
            if enabled {
                pairs.push((name, "true".to_string()));
            }
        }
        if let Some(referrer) = self.referrer.as_deref().filter(|r| !r.is_empty()) {
            pairs.push(("referrer", referrer.to_string()));
        }
        pairs
    }
}

/// Result of a batch run: images produced before the first failure
#[derive(Debug)]
pub struct BatchOutcome {
    pub images: Vec<GeneratedImage>,
    pub error: Option<ImageError>,
}

/// Seed for item `index` of a batch of `count`
///
/// Seeds past `i64::MAX` wrap around instead of overflowing.
pub fn batch_seed(base: Option<i64>, index: usize, count: usize) -> Option<i64> {
    match base {
        Some(base) => Some(base.wrapping_add(index as i64)),
        None if count > 1 => Some(rand::thread_rng().gen_range(0..100_000)),
        None => None,
    }
}

pub struct PollinationsImageClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl PollinationsImageClient {
    pub fn new(api_token: Option<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = api_token.as_deref().filter(|t| !t.is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ImageError::BadRequest(format!("invalid API token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        let http_client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            http_client,
            base_url: POLLINATIONS_IMAGE_BASE.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// `<base>/prompt/<encoded prompt>?<params>`
    pub fn build_url(&self, request: &ImageRequest) -> Result<Url> {
        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            return Err(ImageError::BadRequest("prompt is required".to_string()));
        }
        // URL parsing collapses `.` and `..` segments, even percent-encoded ones
        if matches!(prompt, "." | "..") {
            return Err(ImageError::BadRequest(format!(
                "prompt cannot be a bare `{}`",
                prompt
            )));
        }

        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| ImageError::InvalidBaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push("prompt")
            .push(prompt);

        let pairs = request.query_pairs();
        if !pairs.is_empty() {
            let mut query = url.query_pairs_mut();
            for (name, value) in &pairs {
                query.append_pair(name, value);
            }
        }
        Ok(url)
    }

    pub async fn generate(&self, request: &ImageRequest) -> Result<GeneratedImage> {
        let url = self.build_url(request)?;
        tracing::debug!(%url, "Requesting image");

        let response = self.http_client.get(url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, %body, "Image generation failed");
            return Err(ImageError::Upstream {
                stage: "image generation",
                status,
                body,
            });
        }

        Ok(GeneratedImage::from_response(response).await?)
    }

    /// Generate `count` variations, stopping at the first failure
    pub async fn generate_batch(&self, request: &ImageRequest, count: usize) -> BatchOutcome {
        let mut images = Vec::with_capacity(count);
        for index in 0..count {
            let mut item = request.clone();
            item.seed = batch_seed(request.seed, index, count);
            match self.generate(&item).await {
                Ok(image) => images.push(image),
                Err(e) => {
                    return BatchOutcome {
                        images,
                        error: Some(e),
                    };
                }
            }
        }
        BatchOutcome { images, error: None }
    }

    /// Model ids offered by the image service
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let response = self
            .http_client
            .get(format!("{}/models", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, %body, "Failed to fetch image models");
            return Err(ImageError::Upstream {
                stage: "model listing",
                status,
                body,
            });
        }

        Ok(response.json().await?)
    }
}
