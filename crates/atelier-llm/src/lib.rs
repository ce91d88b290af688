pub mod types;
pub mod traits;
pub mod config;
pub mod pollinations;

pub use traits::{ChatClient, ChatRequest, ChatResponse, ChatOptions};

pub use config::{ClientFactory, PollinationsConfig};
pub use pollinations::PollinationsClient;
pub use types::{Message, Content, ContentPart, ImageUrl};
