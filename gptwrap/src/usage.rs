//! Token usage reported by a chat-completions endpoint.
//!
//! Maps to the `usage` object of the response:
//! ```json
//! { "prompt_tokens": 100, "completion_tokens": 50, "total_tokens": 150 }
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Token counts of one completed request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Number of tokens in the prompt.
    #[serde(default, alias = "input_tokens")]
    pub prompt_tokens: u64,

    /// Number of tokens in the completion.
    #[serde(default, alias = "output_tokens")]
    pub completion_tokens: u64,

    /// Total tokens used; some providers omit it.
    #[serde(default)]
    pub total_tokens: u64,
}

impl Usage {
    /// Create a new usage record.
    #[must_use]
    pub const fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }

    /// Total tokens, falling back to the sum when the provider left it out.
    #[must_use]
    pub const fn total(&self) -> u64 {
        if self.total_tokens == 0 {
            self.prompt_tokens + self.completion_tokens
        } else {
            self.total_tokens
        }
    }

    /// Check if usage is empty (no tokens used).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl Add for Usage {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            prompt_tokens: self.prompt_tokens + rhs.prompt_tokens,
            completion_tokens: self.completion_tokens + rhs.completion_tokens,
            total_tokens: self.total() + rhs.total(),
        }
    }
}

impl AddAssign for Usage {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::fmt::Display for Usage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Usage(prompt: {}, completion: {}, total: {})",
            self.prompt_tokens,
            self.completion_tokens,
            self.total()
        )
    }
}
