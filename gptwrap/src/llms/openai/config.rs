//! OpenAI-compatible client configuration.

/// Configuration for the OpenAI-compatible client.
///
/// Passed explicitly to the client; [`OpenAIConfig::from_env`] is only a
/// convenience for building one from the process environment.
#[derive(Clone)]
pub struct OpenAIConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Base URL for the API (defaults to OpenAI's API).
    pub base_url: String,
    /// Optional organization ID.
    pub organization: Option<String>,
    /// Request timeout in seconds; `None` leaves the transport default.
    pub timeout_secs: Option<u64>,
}

impl OpenAIConfig {
    /// Default OpenAI API base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";
    /// Environment variable holding the API key.
    pub const API_KEY_VAR: &'static str = "API_KEY";
    /// Environment variable holding the organization ID.
    pub const ORGANIZATION_VAR: &'static str = "ORGANIZATION";

    /// Creates a new configuration with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// Reads `API_KEY` and the optional `ORGANIZATION`. A missing key is not
    /// an error here; the endpoint rejects the request instead.
    #[must_use]
    pub fn from_env() -> Self {
        let api_key = std::env::var(Self::API_KEY_VAR).unwrap_or_default();
        if api_key.is_empty() {
            tracing::warn!(var = Self::API_KEY_VAR, "API key not set in environment");
        }

        Self {
            api_key,
            organization: std::env::var(Self::ORGANIZATION_VAR).ok(),
            ..Self::default()
        }
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the organization ID.
    #[must_use]
    pub fn with_organization(mut self, org: impl Into<String>) -> Self {
        self.organization = Some(org.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
            organization: None,
            timeout_secs: Some(120),
        }
    }
}

impl std::fmt::Debug for OpenAIConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("organization", &self.organization)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
