// Configuration layer for completion client creation

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::pollinations::PollinationsClient;
use crate::traits::ChatClient;

/// Configuration for the Pollinations text provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PollinationsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Base URL (optional, defaults to https://text.pollinations.ai)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl PollinationsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// Factory for creating completion clients from configuration
pub struct ClientFactory;

impl ClientFactory {
    pub fn create_chat_client(config: PollinationsConfig) -> Result<Arc<dyn ChatClient>> {
        let mut client = PollinationsClient::new(config.api_token)?;
        if let Some(base_url) = config.base_url {
            client = client.with_base_url(base_url);
        }
        Ok(Arc::new(client))
    }
}
