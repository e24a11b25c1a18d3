//! OpenAI-compatible API client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::error::{LlmError, Result};

use super::config::OpenAIConfig;
use super::types::OpenAIErrorResponse;

/// Client for OpenAI and OpenAI-compatible chat endpoints (e.g. Gemini).
#[derive(Debug, Clone)]
pub struct OpenAI {
    pub(crate) config: Arc<OpenAIConfig>,
    pub(crate) client: Client,
}

impl OpenAI {
    /// Create a new client with the given configuration.
    ///
    /// An empty API key is accepted; requests will fail at the endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Internal`] if the HTTP client cannot be built.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            tracing::warn!(base_url = %config.base_url, "creating client without an API key");
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        let client = builder
            .build()
            .map_err(|e| LlmError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    /// Create a client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_env() -> Result<Self> {
        Self::new(OpenAIConfig::from_env())
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Build the chat completions URL.
    pub(crate) fn chat_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Build request headers for JSON requests.
    pub(crate) fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut req = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json");

        if let Some(org) = &self.config.organization {
            req = req.header("OpenAI-Organization", org);
        }

        req
    }

    /// Parse an error response body.
    ///
    /// Accepts OpenAI's `{"error": {...}}` object and Gemini's array form.
    pub(crate) fn parse_error(status: u16, body: &str) -> LlmError {
        let error = serde_json::from_str::<OpenAIErrorResponse>(body)
            .ok()
            .or_else(|| {
                serde_json::from_str::<Vec<OpenAIErrorResponse>>(body)
                    .ok()?
                    .into_iter()
                    .next()
            })
            .map(|r| r.error);

        let Some(error) = error else {
            return LlmError::http_status(status, body.to_owned());
        };

        match status {
            401 | 403 => LlmError::auth("openai", error.message),
            429 => LlmError::rate_limited("openai"),
            _ => {
                let code = error.code().unwrap_or_else(|| status.to_string());
                LlmError::provider_code("openai", code, error.message)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::chat::{ChatRequest, ResponseFormat};
    use crate::message::Message;

    fn client(base_url: &str) -> OpenAI {
        OpenAI::new(OpenAIConfig::new("test-key").with_base_url(base_url)).unwrap()
    }

    #[test]
    fn test_chat_url_trims_trailing_slash() {
        let c = client("https://generativelanguage.googleapis.com/v1beta/openai/");
        assert_eq!(
            c.chat_url(),
            "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions"
        );
        assert_eq!(
            client(OpenAIConfig::DEFAULT_BASE_URL).chat_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_empty_key_is_accepted() {
        assert!(OpenAI::new(OpenAIConfig::default()).is_ok());
    }

    #[test]
    fn test_request_serializes_as_wire_body() {
        let request = ChatRequest::new("gemini-2.5-flash-preview-04-17")
            .messages(vec![Message::system("sys"), Message::user("hi")])
            .response_format(ResponseFormat::json_schema(
                "Answer",
                serde_json::json!({"type": "object"}),
            ))
            .param("temperature", serde_json::json!(0.0));

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["model"], "gemini-2.5-flash-preview-04-17");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"][0]["type"], "text");
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["name"], "Answer");
        assert_eq!(body["temperature"], 0.0);
    }

    #[test]
    fn test_parse_error_auth() {
        let body = r#"{"error": {"message": "Incorrect API key", "type": "invalid_request_error"}}"#;
        assert!(matches!(
            OpenAI::parse_error(401, body),
            LlmError::Auth { .. }
        ));
    }

    #[test]
    fn test_parse_error_rate_limited() {
        let body = r#"{"error": {"message": "slow down", "type": "requests"}}"#;
        assert!(matches!(
            OpenAI::parse_error(429, body),
            LlmError::RateLimited { .. }
        ));
    }

    #[test]
    fn test_parse_error_provider_code() {
        let body = r#"{"error": {"message": "no such model", "type": "invalid_request_error", "code": "model_not_found"}}"#;
        match OpenAI::parse_error(404, body) {
            LlmError::Provider { code, message, .. } => {
                assert_eq!(code.as_deref(), Some("model_not_found"));
                assert_eq!(message, "no such model");
            }
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn test_parse_error_gemini_array_body() {
        let body = r#"[{"error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}}]"#;
        assert!(matches!(
            OpenAI::parse_error(400, body),
            LlmError::Provider { code: Some(ref c), .. } if c == "400"
        ));
    }

    #[test]
    fn test_parse_error_unstructured_body() {
        assert!(matches!(
            OpenAI::parse_error(502, "Bad Gateway"),
            LlmError::HttpStatus { status: 502, .. }
        ));
    }

    #[test]
    fn test_parse_error_empty_array_body() {
        assert!(matches!(
            OpenAI::parse_error(500, "[]"),
            LlmError::HttpStatus { status: 500, .. }
        ));
    }
}
