pub mod file;
pub mod memory;
#[cfg(feature = "mongodb")]
pub mod mongo;

pub use file::FileThreadStore;
pub use memory::MemoryThreadStore;
#[cfg(feature = "mongodb")]
pub use mongo::MongoThreadStore;
