//! Structured chat requests with running cost accounting.
//!
//! [`GptWrapper`] binds one resolved model to a [`ChatProvider`]. Each call to
//! [`GptWrapper::ask`] builds a fresh conversation, requests a response shaped
//! like the caller's type, and folds the reported token usage into the
//! wrapper's [`CostLedger`].
//!
//! # Example
//!
//! ```rust,ignore
//! use gptwrap::prelude::*;
//!
//! #[derive(Debug, Deserialize, JsonSchema)]
//! struct ObjectRecognition {
//!     name: String,
//! }
//!
//! let wrapper = GptWrapper::new("gpt-4o-mini", OpenAIConfig::from_env())?;
//! let answer: ObjectRecognition = wrapper
//!     .ask(
//!         Prompt::new()
//!             .system("You identify household objects.")
//!             .image(ImageSource::file("kettle.jpg"))
//!             .text("What is this?"),
//!     )
//!     .await?;
//!
//! println!("{}", wrapper.total_cost());
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::chat::{ChatProvider, ChatRequest};
use crate::cost::CostLedger;
use crate::error::Result;
use crate::llms::openai::{OpenAI, OpenAIConfig};
use crate::message::{Conversation, Role};
use crate::multimodal::ImageSource;
use crate::registry::{self, ModelDescriptor};
use crate::usage::Usage;

/// Inputs of a single [`GptWrapper::ask`] call.
///
/// Every field is optional; empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prompt {
    /// System instructions seeding the conversation.
    pub system: Option<String>,
    /// Image attached to the user turn.
    pub image: Option<ImageSource>,
    /// Text of the user turn.
    pub text: Option<String>,
}

impl Prompt {
    /// Create an empty prompt.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the system message.
    #[must_use]
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Sets the image.
    #[must_use]
    pub fn image(mut self, image: impl Into<ImageSource>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Sets the user text.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Build the conversation sent for this prompt.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the image file cannot be read.
    pub fn to_conversation(&self) -> Result<Conversation> {
        let mut conversation = Conversation::new(self.system.as_deref());
        conversation.add_message(Role::User, self.image.as_ref(), self.text.as_deref())?;
        Ok(conversation)
    }
}

impl From<&str> for Prompt {
    fn from(text: &str) -> Self {
        Self::new().text(text)
    }
}

impl From<String> for Prompt {
    fn from(text: String) -> Self {
        Self::new().text(text)
    }
}

/// A model bound to a provider, with a running cost ledger.
#[derive(Debug)]
pub struct GptWrapper<P = OpenAI> {
    model_name: String,
    descriptor: ModelDescriptor,
    provider: P,
    params: Map<String, Value>,
    ledger: Mutex<CostLedger>,
}

impl GptWrapper<OpenAI> {
    /// Create a wrapper talking to an OpenAI-compatible endpoint.
    ///
    /// The model's registered endpoint, if any, replaces `config.base_url`.
    ///
    /// # Errors
    ///
    /// - [`Error::ModelNotFound`](crate::Error::ModelNotFound) for an
    ///   unregistered model name
    /// - [`LlmError::Internal`](crate::LlmError::Internal) if the HTTP client
    ///   cannot be built
    pub fn new(model_name: impl Into<String>, mut config: OpenAIConfig) -> Result<Self> {
        let model_name = model_name.into();
        let descriptor = registry::resolve(&model_name)?;

        if let Some(url) = &descriptor.base_url {
            config.base_url.clone_from(url);
        }
        let provider = OpenAI::new(config)?;

        Ok(Self::with_descriptor(model_name, descriptor, provider))
    }
}

impl<P: ChatProvider> GptWrapper<P> {
    /// Create a wrapper over any provider, resolving the model against the
    /// built-in registry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelNotFound`](crate::Error::ModelNotFound) for an
    /// unregistered model name.
    pub fn with_provider(model_name: impl Into<String>, provider: P) -> Result<Self> {
        let model_name = model_name.into();
        let descriptor = registry::resolve(&model_name)?;
        Ok(Self::with_descriptor(model_name, descriptor, provider))
    }

    /// Create a wrapper with an explicit descriptor.
    #[must_use]
    pub fn with_descriptor(
        model_name: impl Into<String>,
        descriptor: ModelDescriptor,
        provider: P,
    ) -> Self {
        Self {
            model_name: model_name.into(),
            ledger: Mutex::new(CostLedger::new(descriptor.clone())),
            descriptor,
            provider,
            params: Map::new(),
        }
    }

    /// Adds a named request parameter sent with every call.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// The model name as requested.
    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// The resolved model.
    #[must_use]
    pub const fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    /// The underlying provider.
    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Send one prompt and parse the answer into `T`.
    ///
    /// The ledger is only updated once the answer has parsed; on any error it
    /// is left as it was. A successful response that reports no `usage` is
    /// returned as well, but records nothing and logs a warning.
    ///
    /// # Errors
    ///
    /// - I/O errors reading the prompt's image
    /// - provider errors, passed through unchanged
    /// - [`LlmError::Refusal`](crate::LlmError::Refusal) or
    ///   [`LlmError::ResponseFormat`](crate::LlmError::ResponseFormat) for an
    ///   unusable response
    /// - [`Error::SchemaValidation`](crate::Error::SchemaValidation) if the
    ///   content does not fit `T`
    pub async fn ask<T>(&self, prompt: impl Into<Prompt>) -> Result<T>
    where
        T: JsonSchema + DeserializeOwned,
    {
        let prompt = prompt.into();
        let conversation = prompt.to_conversation()?;

        let request = ChatRequest::new(self.model_name.as_str())
            .messages(conversation.into_messages())
            .output_type::<T>()
            .params(&self.params);

        tracing::debug!(
            provider = self.provider.provider_name(),
            model = %self.descriptor,
            messages = request.messages.len(),
            "asking model"
        );

        let response = self.provider.chat(&request).await?;
        let parsed = response.parse::<T>()?;

        match response.usage {
            Some(usage) => self.record(&usage),
            None => tracing::warn!(model = %self.descriptor, "response carried no usage"),
        }

        Ok(parsed)
    }

    /// Fold usage records into the ledger, in order.
    pub fn add_cost(&self, usages: &[Usage]) {
        self.ledger().record_all(usages);
    }

    /// Snapshot of the running totals.
    #[must_use]
    pub fn total_cost(&self) -> CostLedger {
        self.ledger().clone()
    }

    /// Zero the running totals.
    pub fn reset_cost(&self) {
        self.ledger().reset();
    }

    fn record(&self, usage: &Usage) {
        let mut ledger = self.ledger();
        ledger.record(usage);
        tracing::info!(
            model = %self.descriptor,
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            total_cost = ledger.cost(),
            "recorded usage"
        );
    }

    fn ledger(&self) -> MutexGuard<'_, CostLedger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
