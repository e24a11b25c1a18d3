//! Chat request/response types and the provider trait.
//!
//! This module provides:
//! - [`ChatRequest`]: messages, model, structured output format, extra parameters
//! - [`ChatResponse`]: choices and token usage returned by the endpoint
//! - [`ChatProvider`]: the seam between the request orchestration and a transport
//!
//! # Example
//!
//! ```rust,ignore
//! use gptwrap::prelude::*;
//!
//! #[derive(Deserialize, JsonSchema)]
//! struct Country { name: String, capital: String }
//!
//! let request = ChatRequest::new("gpt-4o")
//!     .messages(vec![Message::user("Tell me about France.")])
//!     .output_type::<Country>();
//!
//! let response = provider.chat(&request).await?;
//! let country: Country = response.parse()?;
//! ```

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, LlmError, Result};
use crate::message::Message;
use crate::usage::Usage;

/// A chat completion request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatRequest {
    /// Model identifier as sent to the endpoint.
    pub model: String,

    /// Conversation messages.
    pub messages: Vec<Message>,

    /// Structured output specification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,

    /// Additional named parameters (temperature, seed, ...).
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl ChatRequest {
    /// Keys owned by the request itself; [`ChatRequest::param`] ignores them.
    pub const RESERVED_KEYS: [&'static str; 3] = ["model", "messages", "response_format"];

    /// Creates a new request with the specified model.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Sets all messages.
    #[must_use]
    pub fn messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    /// Sets response format.
    #[must_use]
    pub fn response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    /// Sets structured output by inferring the JSON Schema from a Rust type.
    #[must_use]
    pub fn output_type<T: JsonSchema>(self) -> Self {
        self.response_format(ResponseFormat::from_type::<T>())
    }

    /// Adds an extra named parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: Value) -> Self {
        let key = key.into();
        if Self::RESERVED_KEYS.contains(&key.as_str()) {
            tracing::warn!(key, "ignoring reserved request parameter");
        } else {
            self.params.insert(key, value);
        }
        self
    }

    /// Adds several extra parameters.
    #[must_use]
    pub fn params(self, params: &Map<String, Value>) -> Self {
        params
            .iter()
            .fold(self, |req, (key, value)| req.param(key.clone(), value.clone()))
    }
}

/// Response format specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    /// JSON response with schema (structured outputs).
    JsonSchema {
        /// Schema definition.
        json_schema: JsonSchemaSpec,
    },
}

impl ResponseFormat {
    /// Creates a strict JSON schema format.
    ///
    /// The schema is rewritten with [`make_strict`] first, since strict
    /// structured outputs reject open objects and optional keys.
    #[must_use]
    pub fn json_schema(name: impl Into<String>, mut schema: Value) -> Self {
        make_strict(&mut schema);
        Self::JsonSchema {
            json_schema: JsonSchemaSpec {
                name: name.into(),
                schema,
                strict: Some(true),
            },
        }
    }

    /// Creates a JSON schema format from a Rust type deriving [`JsonSchema`].
    #[must_use]
    pub fn from_type<T: JsonSchema>() -> Self {
        let (name, schema) = generate_json_schema::<T>();
        Self::json_schema(name, schema)
    }

    /// Name of the schema, if this is a schema format.
    #[must_use]
    pub fn schema_name(&self) -> &str {
        match self {
            Self::JsonSchema { json_schema } => &json_schema.name,
        }
    }
}

/// Rewrite a JSON Schema into the form strict structured outputs accept.
///
/// Every object node, including those under `$defs`, gets
/// `"additionalProperties": false` and lists all of its properties as
/// required. Optional fields stay nullable through their `["T", "null"]`
/// type, so they must be present but may be `null`.
pub fn make_strict(schema: &mut Value) {
    let Value::Object(map) = schema else {
        return;
    };

    for (key, value) in map.iter_mut() {
        match key.as_str() {
            "properties" | "$defs" | "definitions" => {
                if let Value::Object(children) = value {
                    children.values_mut().for_each(make_strict);
                }
            }
            "anyOf" | "oneOf" | "allOf" | "prefixItems" => {
                if let Value::Array(children) = value {
                    children.iter_mut().for_each(make_strict);
                }
            }
            "items" | "additionalProperties" | "not" => make_strict(value),
            _ => {}
        }
    }

    let keys: Option<Vec<Value>> = map
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| props.keys().cloned().map(Value::String).collect());
    let is_object = keys.is_some() || map.get("type").and_then(Value::as_str) == Some("object");

    if is_object {
        map.insert("additionalProperties".to_owned(), Value::Bool(false));
        map.insert("required".to_owned(), Value::Array(keys.unwrap_or_default()));
    }
}

/// Generate a JSON Schema from a Rust type.
///
/// Returns `(name, schema)` with the `$schema` meta field removed; chat APIs
/// reject it.
#[must_use]
pub fn generate_json_schema<T: JsonSchema>() -> (String, Value) {
    let root = schemars::schema_for!(T);
    let mut schema_value = serde_json::to_value(&root).unwrap_or_default();

    if let Value::Object(ref mut map) = schema_value {
        map.remove("$schema");
    }

    let name = <T as JsonSchema>::schema_name();
    (name.into_owned(), schema_value)
}

/// JSON schema specification for structured outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSchemaSpec {
    /// Schema name.
    pub name: String,
    /// JSON Schema definition.
    pub schema: Value,
    /// Whether to enforce strict validation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

/// The assistant message of a choice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceMessage {
    /// Text content; the JSON payload under structured outputs.
    #[serde(default)]
    pub content: Option<String>,
    /// Set when the model declined to answer.
    #[serde(default)]
    pub refusal: Option<String>,
}

/// One completion choice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Position of the choice.
    #[serde(default)]
    pub index: usize,
    /// The generated message.
    pub message: ChoiceMessage,
    /// Why generation stopped.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// A chat completion response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Unique completion ID.
    #[serde(default)]
    pub id: Option<String>,
    /// Model that served the request.
    #[serde(default)]
    pub model: Option<String>,
    /// Generated choices.
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Token usage for the whole request.
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl ChatResponse {
    /// Creates a single-choice response with text content.
    #[must_use]
    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            choices: vec![Choice {
                message: ChoiceMessage {
                    content: Some(content.into()),
                    refusal: None,
                },
                finish_reason: Some("stop".to_owned()),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    /// Sets usage statistics.
    #[must_use]
    pub const fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// The top choice.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ResponseFormat`] if the response has no choices.
    pub fn first_choice(&self) -> Result<&Choice> {
        self.choices
            .first()
            .ok_or_else(|| LlmError::response_format("at least one choice", "empty choices").into())
    }

    /// Text of the top choice.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.choices.first()?.message.content.as_deref()
    }

    /// Deserialize the top choice's content into the response type.
    ///
    /// # Errors
    ///
    /// - [`LlmError::ResponseFormat`] if there is no choice or no content
    /// - [`LlmError::Refusal`] if the model refused
    /// - [`Error::SchemaValidation`] if the content does not fit `T`
    pub fn parse<T: DeserializeOwned + JsonSchema>(&self) -> Result<T> {
        let message = &self.first_choice()?.message;
        if let Some(refusal) = &message.refusal {
            return Err(LlmError::refusal(refusal.clone()).into());
        }
        let content = message
            .content
            .as_deref()
            .ok_or_else(|| LlmError::response_format("message content", "none"))?;

        serde_json::from_str(content)
            .map_err(|e| Error::schema_validation(<T as JsonSchema>::schema_name(), e))
    }
}

/// Trait for chat-completions transports.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a chat completion request and receive the complete response.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// Name of this provider, used in logs and errors.
    fn provider_name(&self) -> &'static str;
}
