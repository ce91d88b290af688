pub mod models;
pub mod store;
pub mod dbs;
pub mod error;
pub mod builder;

pub use models::{ChatMessage, ChatThread, MessageRole, ThreadPatch};
pub use store::ThreadStore;
pub use dbs::{FileThreadStore, MemoryThreadStore};
#[cfg(feature = "mongodb")]
pub use dbs::MongoThreadStore;
pub use error::PersistError;
pub use builder::{StoreBackend, StoreBuilder};
