//! OpenAI-compatible chat completions client.
//!
//! Serves OpenAI itself and any endpoint speaking the same protocol, such as
//! Gemini's OpenAI-compatible API.

mod chat;
mod client;
mod config;
mod types;

pub use client::OpenAI;
pub use config::OpenAIConfig;
