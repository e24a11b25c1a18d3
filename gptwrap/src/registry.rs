//! Registry of known chat models and their pricing.
//!
//! A requested model name resolves to the registered descriptor whose
//! canonical name is a substring of it, so dated or preview variants such as
//! `gemini-2.5-flash-preview-04-17` pick up the `gemini-2.5-flash` entry.
//!
//! When several names match, the longest one wins and ties keep declaration
//! order. This makes `gpt-4o-mini` resolve to its own entry rather than to
//! `gpt-4o`, whichever is declared first.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::usage::Usage;

/// Base URL of Gemini's OpenAI-compatible endpoint.
pub const GEMINI_OPENAI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai/";

/// Token prices for a model, in currency units per one million tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelRates {
    /// Price of one million prompt tokens.
    pub prompt: f64,
    /// Price of one million completion tokens.
    pub completion: f64,
}

impl ModelRates {
    /// Number of tokens the rates are quoted for.
    pub const TOKENS_PER_UNIT: f64 = 1_000_000.0;

    /// Create a rate pair.
    #[must_use]
    pub const fn new(prompt: f64, completion: f64) -> Self {
        Self { prompt, completion }
    }

    /// Cost of a single request's usage.
    #[must_use]
    pub fn cost(&self, usage: &Usage) -> f64 {
        (usage.prompt_tokens as f64 / Self::TOKENS_PER_UNIT) * self.prompt
            + (usage.completion_tokens as f64 / Self::TOKENS_PER_UNIT) * self.completion
    }
}

/// Identifies a remote model: its name, pricing, and endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Canonical model name, matched by substring.
    pub name: String,
    /// Human readable name.
    pub display_name: String,
    /// Token prices.
    pub rates: ModelRates,
    /// Endpoint override; `None` means the provider default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ModelDescriptor {
    /// Create a descriptor served from the default endpoint.
    #[must_use]
    pub fn new(name: impl Into<String>, display_name: impl Into<String>, rates: ModelRates) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            rates,
            base_url: None,
        }
    }

    /// Sets the endpoint override.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Check whether this descriptor serves the requested model name.
    #[must_use]
    pub fn matches(&self, requested: &str) -> bool {
        requested.contains(self.name.as_str())
    }
}

impl fmt::Display for ModelDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// An ordered table of model descriptors.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: Vec<ModelDescriptor>,
}

impl ModelRegistry {
    /// Create an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self { models: Vec::new() }
    }

    /// The built-in table of OpenAI and Gemini models.
    #[must_use]
    pub fn builtin() -> Self {
        let gemini = |name: &str, display: &str, prompt: f64, completion: f64| {
            ModelDescriptor::new(name, display, ModelRates::new(prompt, completion))
                .with_base_url(GEMINI_OPENAI_BASE_URL)
        };

        Self {
            models: vec![
                ModelDescriptor::new("gpt-4o", "GPT-4o", ModelRates::new(2.5, 10.0)),
                ModelDescriptor::new("gpt-4o-mini", "GPT-4o mini", ModelRates::new(0.15, 0.6)),
                gemini("gemini-2.5-pro", "Gemini 2.5 Pro", 1.25, 10.0),
                gemini("gemini-1.5-pro", "Gemini 1.5 Pro", 1.25, 5.0),
                gemini("gemini-2.0-flash", "Gemini 2.0 Flash", 0.1, 0.4),
                gemini("gemini-2.5-flash", "Gemini 2.5 Flash", 0.1, 0.4),
            ],
        }
    }

    /// Append a descriptor at the end of the declaration order.
    pub fn register(&mut self, descriptor: ModelDescriptor) -> &mut Self {
        self.models.push(descriptor);
        self
    }

    /// Registered descriptors in declaration order.
    #[must_use]
    pub fn models(&self) -> &[ModelDescriptor] {
        &self.models
    }

    /// Resolve a requested model name to its descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelNotFound`] when no registered name is a substring
    /// of `requested`.
    pub fn resolve(&self, requested: &str) -> Result<ModelDescriptor> {
        let mut best: Option<&ModelDescriptor> = None;
        for model in self.models.iter().filter(|m| m.matches(requested)) {
            // strictly longer only, so ties keep declaration order
            if best.is_none_or(|b| model.name.len() > b.name.len()) {
                best = Some(model);
            }
        }

        let found = best.ok_or_else(|| Error::model_not_found(requested))?;
        tracing::debug!(requested, model = %found.name, "resolved model");
        Ok(found.clone())
    }
}

/// Resolve a model name against the built-in registry.
///
/// # Errors
///
/// Returns [`Error::ModelNotFound`] for unregistered names.
pub fn resolve(requested: &str) -> Result<ModelDescriptor> {
    ModelRegistry::builtin().resolve(requested)
}
