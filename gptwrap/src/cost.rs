//! Running token and cost totals for one model.
//!
//! A [`CostLedger`] is tied to a single [`ModelDescriptor`] for its whole
//! lifetime. Each request's cost is computed from that request's raw token
//! counts and the descriptor's rates, then added to the running total.

use serde::Serialize;
use std::fmt;

use crate::error::{Error, Result};
use crate::registry::ModelDescriptor;
use crate::usage::Usage;

/// Cumulative usage and cost of requests against one model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostLedger {
    #[serde(rename = "model", serialize_with = "serialize_model_name")]
    descriptor: ModelDescriptor,
    prompt_tokens: u64,
    completion_tokens: u64,
    cost: f64,
    #[serde(skip)]
    requests: u64,
}

fn serialize_model_name<S: serde::Serializer>(
    descriptor: &ModelDescriptor,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&descriptor.name)
}

impl CostLedger {
    /// Create an empty ledger for a model.
    #[must_use]
    pub const fn new(descriptor: ModelDescriptor) -> Self {
        Self {
            descriptor,
            prompt_tokens: 0,
            completion_tokens: 0,
            cost: 0.0,
            requests: 0,
        }
    }

    /// Create a ledger holding a single request's usage.
    #[must_use]
    pub fn from_usage(descriptor: ModelDescriptor, usage: &Usage) -> Self {
        let mut ledger = Self::new(descriptor);
        ledger.record(usage);
        ledger
    }

    /// The model this ledger accounts for.
    #[must_use]
    pub const fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    /// Cumulative prompt tokens.
    #[must_use]
    pub const fn prompt_tokens(&self) -> u64 {
        self.prompt_tokens
    }

    /// Cumulative completion tokens.
    #[must_use]
    pub const fn completion_tokens(&self) -> u64 {
        self.completion_tokens
    }

    /// Cumulative cost, in the currency the rates are quoted in.
    #[must_use]
    pub const fn cost(&self) -> f64 {
        self.cost
    }

    /// Number of usage records folded in since creation or the last reset.
    #[must_use]
    pub const fn requests(&self) -> u64 {
        self.requests
    }

    /// Cumulative usage as a [`Usage`] value.
    #[must_use]
    pub const fn usage(&self) -> Usage {
        Usage::new(self.prompt_tokens, self.completion_tokens)
    }

    /// Fold one request's usage into the ledger.
    pub fn record(&mut self, usage: &Usage) {
        self.prompt_tokens += usage.prompt_tokens;
        self.completion_tokens += usage.completion_tokens;
        self.cost += self.descriptor.rates.cost(usage);
        self.requests += 1;
    }

    /// Fold a sequence of usage records, in order.
    pub fn record_all<'a, I>(&mut self, usages: I)
    where
        I: IntoIterator<Item = &'a Usage>,
    {
        for usage in usages {
            self.record(usage);
        }
    }

    /// Combine two ledgers into a new one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LedgerMismatch`] if the ledgers belong to different models.
    pub fn try_add(&self, other: &Self) -> Result<Self> {
        let mut sum = self.clone();
        sum.merge(other)?;
        Ok(sum)
    }

    /// Add another ledger's totals into this one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LedgerMismatch`] if the ledgers belong to different
    /// models; `self` is left unchanged in that case.
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        if self.descriptor != other.descriptor {
            return Err(Error::ledger_mismatch(
                &self.descriptor.name,
                &other.descriptor.name,
            ));
        }
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.cost += other.cost;
        self.requests += other.requests;
        Ok(())
    }

    /// Zero all totals, keeping the model.
    pub const fn reset(&mut self) -> &mut Self {
        self.prompt_tokens = 0;
        self.completion_tokens = 0;
        self.cost = 0.0;
        self.requests = 0;
        self
    }
}

impl fmt::Display for CostLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string_pretty(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
