mod client;

pub use client::{PollinationsClient, POLLINATIONS_TEXT_BASE};
