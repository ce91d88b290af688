pub mod error;
pub mod threads;
pub mod title;

pub use error::ContextError;
pub use threads::{ThreadContext, ThreadsSnapshot};
pub use title::TitleSource;
