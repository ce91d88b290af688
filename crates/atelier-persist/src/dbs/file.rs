use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::error::{PersistError, Result};
use crate::models::ChatThread;
use crate::store::ThreadStore;

/// One JSON document per thread under a base directory
pub struct FileThreadStore {
    base_path: PathBuf,
}

impl FileThreadStore {
    /// Open (and create if needed) the store directory
    pub async fn open(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        tokio::fs::create_dir_all(&base_path).await?;
        tracing::debug!(path = %base_path.display(), "Opened file thread store");
        Ok(Self { base_path })
    }

    fn thread_path(&self, thread_id: &str) -> Result<PathBuf> {
        validate_thread_id(thread_id)?;
        Ok(self.base_path.join(format!("{}.json", thread_id)))
    }

    async fn read_thread(path: &Path) -> Result<Option<ChatThread>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_thread(&self, thread: &ChatThread) -> Result<()> {
        let path = self.thread_path(&thread.id)?;
        let tmp_path = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(thread)?;

        let mut file = tokio::fs::File::create(&tmp_path).await?;
        file.write_all(&body).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp_path, &path).await?;
        Ok(())
    }
}

/// Thread ids become file names: reject separators, `..` and control characters
fn validate_thread_id(thread_id: &str) -> Result<()> {
    if thread_id.is_empty() {
        return Err(PersistError::InvalidId("thread id cannot be empty".to_string()));
    }
    if thread_id.contains('/') || thread_id.contains('\\') || thread_id.contains("..") {
        return Err(PersistError::InvalidId(format!(
            "thread id contains invalid characters: {thread_id:?}"
        )));
    }
    if thread_id.chars().any(|c| c.is_control()) {
        return Err(PersistError::InvalidId(format!(
            "thread id contains control characters: {thread_id:?}"
        )));
    }
    Ok(())
}

#[async_trait]
impl ThreadStore for FileThreadStore {
    async fn add(&self, thread: ChatThread) -> Result<()> {
        let path = self.thread_path(&thread.id)?;
        if tokio::fs::try_exists(&path).await? {
            return Err(PersistError::AlreadyExists(thread.id));
        }
        self.write_thread(&thread).await
    }

    async fn get(&self, thread_id: &str) -> Result<Option<ChatThread>> {
        let path = self.thread_path(thread_id)?;
        Self::read_thread(&path).await
    }

    async fn put(&self, thread: ChatThread) -> Result<()> {
        self.write_thread(&thread).await
    }

    async fn delete(&self, thread_id: &str) -> Result<()> {
        let path = self.thread_path(thread_id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self) -> Result<Vec<ChatThread>> {
        let mut threads = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.base_path).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                match Self::read_thread(&path).await {
                    Ok(Some(thread)) => threads.push(thread),
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable thread file");
                    }
                }
            }
        }

        threads.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(threads)
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}
