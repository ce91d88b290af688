use async_trait::async_trait;

use crate::error::Result;
use crate::models::ChatThread;

/// Keyed table of thread records
///
/// Implementations provide backend-specific CRUD operations
#[async_trait]
pub trait ThreadStore: Send + Sync {
    /// Insert a new record; fails with `AlreadyExists` if the id is taken
    async fn add(&self, thread: ChatThread) -> Result<()>;

    /// Get a record by id
    async fn get(&self, thread_id: &str) -> Result<Option<ChatThread>>;

    /// Insert or replace a record
    async fn put(&self, thread: ChatThread) -> Result<()>;

    /// Delete a record; deleting a missing id is not an error
    async fn delete(&self, thread_id: &str) -> Result<()>;

    /// All records ordered by id
    async fn list(&self) -> Result<Vec<ChatThread>>;

    /// Short backend name for health reporting
    fn backend(&self) -> &'static str;
}
