//! Prelude module for convenient imports.
//!
//! This module re-exports commonly used types and traits for easy access.
//!
//! # Usage
//!
//! ```rust,ignore
//! use gptwrap::prelude::*;
//! ```

pub use crate::chat::{ChatProvider, ChatRequest, ChatResponse, ResponseFormat};
pub use crate::cost::CostLedger;
pub use crate::error::{Error, LlmError, Result};
pub use crate::llms::{MockProvider, OpenAI, OpenAIConfig};
pub use crate::message::{ContentPart, Conversation, Message, Role};
pub use crate::multimodal::{ImageFormat, ImageSource};
pub use crate::registry::{ModelDescriptor, ModelRates, ModelRegistry};
pub use crate::usage::Usage;
pub use crate::wrapper::{GptWrapper, Prompt};

pub use async_trait::async_trait;
pub use schemars::JsonSchema;
pub use serde::{Deserialize, Serialize};
