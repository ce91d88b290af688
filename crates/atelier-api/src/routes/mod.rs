pub mod chat;
pub mod health;
pub mod images;
pub mod threads;
