//! Error body of the Chat Completions API.
//!
//! Requests and responses serialize straight from [`crate::chat`] types.

use serde::Deserialize;
use serde_json::Value;

/// Error response body.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIErrorResponse {
    pub error: OpenAIError,
}

/// Error details.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIError {
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub code: Option<Value>,
}

impl OpenAIError {
    /// The provider code, falling back to the error type.
    pub fn code(&self) -> Option<String> {
        match &self.code {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => self.error_type.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_deserialization() {
        let json = r#"{"error": {"message": "bad", "type": "invalid_request_error", "code": null}}"#;
        let body: OpenAIErrorResponse =
            serde_json::from_str(json).expect("deserialization should succeed");
        assert_eq!(body.error.message, "bad");
        assert_eq!(body.error.code().as_deref(), Some("invalid_request_error"));
    }

    #[test]
    fn test_gemini_style_numeric_code() {
        let json = r#"[{"error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}}]"#;
        let bodies: Vec<OpenAIErrorResponse> =
            serde_json::from_str(json).expect("deserialization should succeed");
        assert_eq!(bodies[0].error.code().as_deref(), Some("400"));
    }
}
