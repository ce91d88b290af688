use atelier_context::{ContextError, ThreadContext};
use atelier_llm::{Content, Message};
use atelier_persist::{ChatMessage, ChatThread, ThreadPatch};
use std::sync::Arc;

use crate::error::{ChatError, Result};
use crate::orchestrator::{ChatInput, ChatOrchestrator};
use crate::title::{TitleGenerator, TitleMessage};

/// Text sent along with an image when the user typed nothing
pub const IMAGE_ONLY_PROMPT: &str = "Please describe this image.";

#[derive(Debug, Clone, PartialEq)]
pub struct SendOutcome {
    pub thread_id: String,
    pub reply: String,
    /// Thread after both messages (and a possible new title) were stored
    pub thread: Option<ChatThread>,
}

/// User-facing chat flow over the thread context
pub struct ChatSession {
    context: Arc<ThreadContext>,
    orchestrator: ChatOrchestrator,
    titles: TitleGenerator,
}

impl ChatSession {
    pub fn new(
        context: Arc<ThreadContext>,
        orchestrator: ChatOrchestrator,
        titles: TitleGenerator,
    ) -> Self {
        Self {
            context,
            orchestrator,
            titles,
        }
    }

    pub fn context(&self) -> &Arc<ThreadContext> {
        &self.context
    }

    /// Send to the active thread
    pub async fn send(&self, text: &str, attachment: Option<&str>) -> Result<SendOutcome> {
        let thread_id = self
            .context
            .active_thread_id()
            .await
            .ok_or(ChatError::NoActiveThread)?;
        self.send_to(&thread_id, text, attachment).await
    }

    /// Send one user message to `thread_id` and store the exchange
    ///
    /// Nothing is written when the completion call fails.
    pub async fn send_to(
        &self,
        thread_id: &str,
        text: &str,
        attachment: Option<&str>,
    ) -> Result<SendOutcome> {
        let text = text.trim();
        let attachment = attachment.filter(|a| !a.is_empty());
        if text.is_empty() && attachment.is_none() {
            return Err(ChatError::EmptyMessage);
        }

        let thread = self
            .context
            .store()
            .get(thread_id)
            .await
            .map_err(ContextError::from)?
            .ok_or_else(|| ChatError::ThreadNotFound(thread_id.to_string()))?;

        let content = match attachment {
            Some(image) => {
                let prompt = if text.is_empty() { IMAGE_ONLY_PROMPT } else { text };
                Content::text_with_image(prompt, image)
            }
            None => Content::text(text),
        };
        let user_message = ChatMessage::user(content);

        let mut history: Vec<Message> =
            thread.messages.iter().cloned().map(Message::from).collect();
        history.push(Message::from(user_message.clone()));

        let input = ChatInput {
            messages: history.clone(),
            model: Some(thread.model.clone()),
            style: Some(thread.style.clone()),
        };
        let reply = self.orchestrator.reply(input).await?;

        self.context.add_message(thread_id, user_message).await?;
        self.context
            .add_message(thread_id, ChatMessage::assistant(reply.as_str()))
            .await?;

        if thread.title.starts_with("Thread") && !text.is_empty() {
            let transcript: Vec<TitleMessage> =
                history.iter().cloned().map(TitleMessage::from).collect();
            match self.titles.title_for(&transcript).await {
                Ok(title) if !title.trim().is_empty() => {
                    self.context
                        .update_thread(thread_id, ThreadPatch::title(title.trim()))
                        .await?;
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(thread_id = %thread_id, error = %e, "Title update failed"),
            }
        }

        tracing::info!(thread_id = %thread_id, "Message exchange stored");

        let thread = self
            .context
            .store()
            .get(thread_id)
            .await
            .map_err(ContextError::from)?;
        Ok(SendOutcome {
            thread_id: thread_id.to_string(),
            reply,
            thread,
        })
    }

    pub async fn set_model(&self, model: &str) -> Result<()> {
        self.patch_active(ThreadPatch::model(model)).await
    }

    pub async fn set_style(&self, style: &str) -> Result<()> {
        self.patch_active(ThreadPatch::style(style)).await
    }

    async fn patch_active(&self, patch: ThreadPatch) -> Result<()> {
        let thread_id = self
            .context
            .active_thread_id()
            .await
            .ok_or(ChatError::NoActiveThread)?;
        if !self.context.update_thread(&thread_id, patch).await? {
            return Err(ChatError::ThreadNotFound(thread_id));
        }
        Ok(())
    }
}
