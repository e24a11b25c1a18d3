//! Unified error types for gptwrap.
//!
//! Every failure surfaces directly to the caller; nothing in this crate
//! retries or recovers locally. The variants split into:
//! - bookkeeping errors raised synchronously (unknown model, empty content,
//!   mismatched ledgers)
//! - provider pass-through ([`LlmError`])
//! - structured output that does not fit the requested response type

pub use crate::llms::error::LlmError;

/// Result type alias for gptwrap operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for gptwrap.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// No registered model name is a substring of the requested name.
    #[error("Model {requested} not found")]
    ModelNotFound {
        /// The model name that was asked for.
        requested: String,
    },

    /// A content part was built with neither text nor image.
    #[error("Either text or image should be provided")]
    EmptyContent,

    /// Two cost ledgers tied to different models were combined.
    #[error("Cannot combine cost ledgers for different models: {left} and {right}")]
    LedgerMismatch {
        /// Model of the left-hand ledger.
        left: String,
        /// Model of the right-hand ledger.
        right: String,
    },

    /// The model output does not deserialize into the requested response type.
    #[error("Response does not match schema {schema}: {source}")]
    SchemaValidation {
        /// Name of the schema the response was checked against.
        schema: String,
        /// The underlying deserialization failure.
        #[source]
        source: serde_json::Error,
    },

    /// LLM provider error.
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a model-not-found error.
    #[must_use]
    pub fn model_not_found(requested: impl Into<String>) -> Self {
        Self::ModelNotFound {
            requested: requested.into(),
        }
    }

    /// Create a ledger mismatch error.
    #[must_use]
    pub fn ledger_mismatch(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self::LedgerMismatch {
            left: left.into(),
            right: right.into(),
        }
    }

    /// Create a schema validation error.
    #[must_use]
    pub fn schema_validation(schema: impl Into<String>, source: serde_json::Error) -> Self {
        Self::SchemaValidation {
            schema: schema.into(),
            source,
        }
    }

    /// Check whether this error came from the remote endpoint or its transport.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Llm(_))
    }
}
