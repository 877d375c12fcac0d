pub mod chat;
pub mod library;
