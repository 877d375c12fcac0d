/// FinQA - Financial document Q&A
///
/// Relay endpoints that forward questions, uploads and feedback to a RAG
/// backend, plus a terminal client that talks to the relay.

pub mod client;
pub mod config;
pub mod core;
pub mod relay;
pub mod tui;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
