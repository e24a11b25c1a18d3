//! Gptwrap - structured multi-modal chat completions with cost accounting
//!
//! This crate sends a system message, an optional image and optional text to
//! an OpenAI-compatible chat endpoint (OpenAI or Gemini), parses the reply
//! into a caller-supplied type through structured outputs, and keeps a running
//! tally of token usage and cost per model.
//!
//! - [`registry`]: known models, their prices and endpoints
//! - [`message`]: conversation and content-part construction
//! - [`cost`]: the per-model cost ledger
//! - [`wrapper`]: the [`GptWrapper`](wrapper::GptWrapper) orchestrator

pub mod chat;
pub mod cost;
pub mod error;
pub mod llms;
pub mod message;
pub mod multimodal;
pub mod prelude;
pub mod registry;
pub mod usage;
pub mod wrapper;

pub use error::{Error, LlmError, Result};
