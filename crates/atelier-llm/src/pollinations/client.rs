// Pollinations text client (OpenAI-compatible chat endpoint)

use crate::traits::{ChatClient, ChatOptions, ChatRequest, ChatResponse};
use crate::types::Message;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::{Map, Value};

pub const POLLINATIONS_TEXT_BASE: &str = "https://text.pollinations.ai";

/// Pollinations client (HTTP direct, no SDK)
pub struct PollinationsClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl PollinationsClient {
    /// Create new client; the token is optional for Pollinations
    pub fn new(api_token: Option<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        match api_token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => {
                headers.insert(
                    AUTHORIZATION,
                    HeaderValue::from_str(&format!("Bearer {}", token))
                        .context("Invalid API token format")?,
                );
            }
            None => {
                tracing::warn!("POLLINATIONS_API_TOKEN not set, requests may be rate limited");
            }
        }

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: POLLINATIONS_TEXT_BASE.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build chat completion request payload
    pub fn build_chat_request(
        &self,
        model: &str,
        messages: &[Message],
        options: &ChatOptions,
    ) -> Result<Value> {
        let mut request = Map::new();
        request.insert("messages".to_string(), serde_json::to_value(messages)?);
        request.insert("model".to_string(), Value::String(model.to_string()));

        if let Some(max_tokens) = options.max_tokens {
            request.insert("max_tokens".to_string(), serde_json::json!(max_tokens));
        }
        if let Some(temp) = options.temperature {
            request.insert("temperature".to_string(), serde_json::json!(temp));
        }

        Ok(Value::Object(request))
    }
}

#[async_trait]
impl ChatClient for PollinationsClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let payload = self.build_chat_request(&request.model, &request.messages, &request.options)?;
        tracing::debug!(model = %request.model, messages = request.messages.len(), "Sending chat completion");

        let response = self
            .http_client
            .post(format!("{}/openai", self.base_url))
            .json(&payload)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Pollinations API error ({}): {}", status, error_text);
        }

        let raw: Value = response
            .json()
            .await
            .context("Failed to parse response")?;

        Ok(ChatResponse::new(raw))
    }
}
