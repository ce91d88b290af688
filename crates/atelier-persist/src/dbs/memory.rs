use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::error::{PersistError, Result};
use crate::models::ChatThread;
use crate::store::ThreadStore;

/// In-memory store for testing and local development
#[derive(Default)]
pub struct MemoryThreadStore {
    // BTreeMap keeps `list` in id order
    threads: RwLock<BTreeMap<String, ChatThread>>,
}

impl MemoryThreadStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ThreadStore for MemoryThreadStore {
    async fn add(&self, thread: ChatThread) -> Result<()> {
        let mut threads = self.threads.write().await;
        if threads.contains_key(&thread.id) {
            return Err(PersistError::AlreadyExists(thread.id));
        }
        threads.insert(thread.id.clone(), thread);
        Ok(())
    }

    async fn get(&self, thread_id: &str) -> Result<Option<ChatThread>> {
        Ok(self.threads.read().await.get(thread_id).cloned())
    }

    async fn put(&self, thread: ChatThread) -> Result<()> {
        self.threads.write().await.insert(thread.id.clone(), thread);
        Ok(())
    }

    async fn delete(&self, thread_id: &str) -> Result<()> {
        self.threads.write().await.remove(thread_id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ChatThread>> {
        Ok(self.threads.read().await.values().cloned().collect())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
