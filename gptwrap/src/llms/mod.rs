//! Chat provider implementations.
//!
//! - [`openai`] - OpenAI-compatible HTTP endpoints (OpenAI, Gemini)
//! - [`mock`] - scripted responses for tests and offline runs

pub mod error;
pub mod mock;
pub mod openai;

pub use mock::MockProvider;
pub use openai::{OpenAI, OpenAIConfig};
