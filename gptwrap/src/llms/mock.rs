//! Scripted chat provider for testing.
//!
//! Returns queued responses in order without making API calls, and keeps
//! every request it receives so tests can assert on the wire payload.
//!
//! # Example
//!
//! ```rust,ignore
//! use gptwrap::prelude::*;
//!
//! let provider = MockProvider::new()
//!     .with_json(r#"{"name": "kettle"}"#, Usage::new(100, 20))
//!     .with_error(LlmError::rate_limited("mock"));
//! // First call answers with the JSON payload, second fails, third reports exhaustion.
//! ```

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::chat::{ChatProvider, ChatRequest, ChatResponse};
use crate::error::{Error, LlmError, Result};
use crate::usage::Usage;

/// A provider answering from a queue of scripted outcomes.
#[derive(Debug, Default)]
pub struct MockProvider {
    outcomes: Mutex<VecDeque<Result<ChatResponse>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockProvider {
    /// Create a provider with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a full response.
    #[must_use]
    pub fn with_response(self, response: ChatResponse) -> Self {
        self.push(Ok(response));
        self
    }

    /// Queue a single-choice response with JSON content and usage.
    #[must_use]
    pub fn with_json(self, content: impl Into<String>, usage: Usage) -> Self {
        self.with_response(ChatResponse::from_text(content).with_usage(usage))
    }

    /// Queue a failure.
    #[must_use]
    pub fn with_error(self, error: impl Into<Error>) -> Self {
        self.push(Err(error.into()));
        self
    }

    /// Queue an outcome on a shared provider.
    pub fn push(&self, outcome: Result<ChatResponse>) {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(outcome);
    }

    /// Number of outcomes not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Requests received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let outcome = self
            .outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        outcome.unwrap_or_else(|| Err(LlmError::internal("mock script exhausted").into()))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
