//! OpenAI ChatProvider implementation.

use async_trait::async_trait;

use crate::chat::{ChatProvider, ChatRequest, ChatResponse};
use crate::error::{LlmError, Result};

use super::client::OpenAI;

#[async_trait]
impl ChatProvider for OpenAI {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let url = self.chat_url();

        tracing::debug!(
            url = %url,
            model = %request.model,
            messages = request.messages.len(),
            "sending chat completion request"
        );

        let response = self
            .build_request(&url)
            .json(request)
            .send()
            .await
            .map_err(LlmError::from)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Self::parse_error(status.as_u16(), &error_text).into());
        }

        let response_text = response.text().await.map_err(LlmError::from)?;
        let parsed: ChatResponse = serde_json::from_str(&response_text).map_err(|e| {
            LlmError::response_format(
                "valid chat completion response",
                format!("parse error: {e}, response: {response_text}"),
            )
        })?;

        Ok(parsed)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}
