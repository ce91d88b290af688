use anyhow::Result;
use async_trait::async_trait;
use atelier_persist::ChatMessage;

/// Produces a short thread title from the opening exchange
#[async_trait]
pub trait TitleSource: Send + Sync {
    async fn generate_title(&self, messages: &[ChatMessage]) -> Result<String>;
}
