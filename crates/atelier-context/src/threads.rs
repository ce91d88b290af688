use std::sync::Arc;
use tokio::sync::{watch, RwLock};

use atelier_persist::{ChatMessage, ChatThread, ThreadPatch, ThreadStore};

use crate::error::{ContextError, Result};
use crate::title::TitleSource;

/// Thread list plus the active thread id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThreadsSnapshot {
    pub threads: Vec<ChatThread>,
    pub active_thread_id: Option<String>,
}

impl ThreadsSnapshot {
    pub fn active_thread(&self) -> Option<&ChatThread> {
        let id = self.active_thread_id.as_deref()?;
        self.threads.iter().find(|t| t.id == id)
    }

    /// Post-load rules for the active id: keep it while its thread exists,
    /// otherwise fall back to the first thread (or none)
    fn settle_active(&mut self) {
        let still_present = self
            .active_thread_id
            .as_deref()
            .is_some_and(|id| self.threads.iter().any(|t| t.id == id));
        if !still_present {
            self.active_thread_id = self.threads.first().map(|t| t.id.clone());
        }
    }
}

/// In-memory cache over a [`ThreadStore`]
///
/// Mutations go to the store first and then refresh the cache. Every change
/// is published to [`ThreadContext::subscribe`] receivers.
pub struct ThreadContext {
    store: Arc<dyn ThreadStore>,
    title_source: Option<Arc<dyn TitleSource>>,
    state: RwLock<ThreadsSnapshot>,
    updates: watch::Sender<ThreadsSnapshot>,
}

impl ThreadContext {
    /// Create the context and perform the initial load
    pub async fn load(
        store: Arc<dyn ThreadStore>,
        title_source: Option<Arc<dyn TitleSource>>,
    ) -> Result<Self> {
        let (updates, _) = watch::channel(ThreadsSnapshot::default());
        let context = Self {
            store,
            title_source,
            state: RwLock::new(ThreadsSnapshot::default()),
            updates,
        };
        context.reload().await?;
        Ok(context)
    }

    pub fn store(&self) -> &Arc<dyn ThreadStore> {
        &self.store
    }

    /// Receiver that observes every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<ThreadsSnapshot> {
        self.updates.subscribe()
    }

    pub async fn snapshot(&self) -> ThreadsSnapshot {
        self.state.read().await.clone()
    }

    pub async fn threads(&self) -> Vec<ChatThread> {
        self.state.read().await.threads.clone()
    }

    pub async fn active_thread_id(&self) -> Option<String> {
        self.state.read().await.active_thread_id.clone()
    }

    pub async fn active_thread(&self) -> Option<ChatThread> {
        self.state.read().await.active_thread().cloned()
    }

    /// Refresh the cache from the store
    pub async fn reload(&self) -> Result<()> {
        let mut state = self.state.write().await;
        self.reload_locked(&mut state).await
    }

    async fn reload_locked(&self, state: &mut ThreadsSnapshot) -> Result<()> {
        state.threads = self.store.list().await?;
        state.settle_active();
        tracing::debug!(
            threads = state.threads.len(),
            active = ?state.active_thread_id,
            "Thread cache reloaded"
        );
        self.publish(state);
        Ok(())
    }

    fn publish(&self, state: &ThreadsSnapshot) {
        self.updates.send_replace(state.clone());
    }

    /// Create a thread, make it active and return its id
    ///
    /// A non-blank first message is summarised into the title; when that
    /// fails the positional default (`Thread N`) is kept.
    pub async fn create_thread(&self, first_message: Option<&str>) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let position = self.state.read().await.threads.len() + 1;
        let mut title = format!("Thread {}", position);

        let first_message = first_message.map(str::trim).filter(|m| !m.is_empty());
        if let (Some(message), Some(source)) = (first_message, &self.title_source) {
            match source.generate_title(&[ChatMessage::user(message)]).await {
                Ok(generated) if !generated.trim().is_empty() => {
                    title = generated.trim().to_string();
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Title generation failed"),
            }
        }

        let thread = ChatThread::new(id.clone(), title);

        let mut state = self.state.write().await;
        self.store.add(thread.clone()).await?;
        state.threads.push(thread);
        state.active_thread_id = Some(id.clone());
        self.publish(&state);

        tracing::info!(thread_id = %id, "Thread created");
        Ok(id)
    }

    pub async fn set_active_thread(&self, thread_id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.threads.iter().any(|t| t.id == thread_id) {
            return Err(ContextError::ThreadNotFound(thread_id.to_string()));
        }
        state.active_thread_id = Some(thread_id.to_string());
        self.publish(&state);
        Ok(())
    }

    /// Append a message; returns `false` when the thread does not exist
    pub async fn add_message(&self, thread_id: &str, message: ChatMessage) -> Result<bool> {
        let mut state = self.state.write().await;
        let Some(mut thread) = self.store.get(thread_id).await? else {
            return Ok(false);
        };

        thread.messages.push(message);
        thread.touch();
        self.store.put(thread).await?;
        self.reload_locked(&mut state).await?;
        Ok(true)
    }

    /// Merge `patch` into a thread; returns `false` when the thread does not exist
    pub async fn update_thread(&self, thread_id: &str, patch: ThreadPatch) -> Result<bool> {
        let mut state = self.state.write().await;
        let Some(mut thread) = self.store.get(thread_id).await? else {
            return Ok(false);
        };

        patch.apply_to(&mut thread);
        self.store.put(thread).await?;
        self.reload_locked(&mut state).await?;
        Ok(true)
    }

    pub async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        let was_active = state.active_thread_id.as_deref() == Some(thread_id);

        self.store.delete(thread_id).await?;
        if was_active {
            let remaining = self.store.list().await?;
            state.active_thread_id = remaining.first().map(|t| t.id.clone());
        }

        self.reload_locked(&mut state).await?;
        tracing::info!(thread_id = %thread_id, "Thread deleted");
        Ok(())
    }
}
