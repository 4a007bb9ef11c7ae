//! Adapter for OpenAI-compatible chat completion endpoints.
//!
//! OpenAI, Grok and Perplexity all speak the same `POST /chat/completions`
//! wire shape with bearer auth; only the base URL and default model differ.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use super::error::{ErrorContext, ProviderError};

/// Maximum allowed response body length (1MB).
const MAX_RESPONSE_LEN: usize = 1_024 * 1_024;

/// Adapter over one OpenAI-compatible backend.
#[derive(Debug, Clone)]
pub struct ChatCompletionsAdapter {
    backend: &'static str,
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl ChatCompletionsAdapter {
    pub fn new(
        backend: &'static str,
        api_key: &str,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let auth_value = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| ProviderError::config("Invalid API key format"))?;
        headers.insert(AUTHORIZATION, auth_value);

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ProviderError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            backend,
            client,
            base_url: base_url.into(),
            model: model.into(),
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    pub async fn answer(&self, prompt: &str) -> Result<String, ProviderError> {
        let messages = [ApiMessage {
            role: "user",
            content: prompt,
        }];
        let api_req = ChatApiRequest {
            model: &self.model,
            messages: &messages,
        };

        let response = self
            .client
            .post(self.chat_url())
            .json(&api_req)
            .send()
            .await?;

        let status = response.status();
        let body = read_body_capped(response, self.backend).await?;

        if !status.is_success() {
            return Err(error_from_body(self.backend, status.as_u16(), &body));
        }

        let parsed: ChatApiResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::provider(self.backend, format!("Invalid JSON: {e}"), false)
        })?;

        if let Some(error) = parsed.error {
            return Err(ProviderError::provider(
                self.backend,
                error.message.unwrap_or_default(),
                false,
            ));
        }

        let content = parsed
            .choices
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or_else(|| {
                ProviderError::provider(self.backend, "No choices in response", false)
            })?;

        Ok(content)
    }
}

/// Read the response body while enforcing the size cap.
pub(super) async fn read_body_capped(
    mut response: reqwest::Response,
    backend: &'static str,
) -> Result<String, ProviderError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let new_len = bytes.len() + chunk.len();
        if new_len > MAX_RESPONSE_LEN {
            return Err(ProviderError::provider(
                backend,
                format!("Response too large: {new_len} bytes"),
                false,
            ));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(String::from_utf8_lossy(&bytes).to_string())
}

/// Map a non-success HTTP response to a ProviderError, keeping the provider's
/// own error code when the body carries one.
fn error_from_body(backend: &'static str, status: u16, body: &str) -> ProviderError {
    let retryable = status >= 500 || status == 429;
    let ctx = ErrorContext::new().with_status(status);

    if let Ok(parsed) = serde_json::from_str::<ChatApiResponse>(body) {
        if let Some(error) = parsed.error {
            let ctx = if let Some(code) = error.code_str() {
                ctx.with_code(code)
            } else {
                ctx
            };
            let message = error.message.unwrap_or_default();
            return ProviderError::provider_with_context(backend, message, retryable, ctx);
        }
    }

    ProviderError::provider_with_context(backend, format!("HTTP {status}"), retryable, ctx)
}

// =============================================================================
// API TYPES
// =============================================================================

#[derive(Serialize)]
struct ChatApiRequest<'a> {
    model: &'a str,
    messages: &'a [ApiMessage<'a>],
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatApiResponse {
    choices: Option<Vec<Choice>>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    message: Option<String>,
    // String for OpenAI-style errors, but some backends send a number.
    code: Option<serde_json::Value>,
}

impl ApiError {
    fn code_str(&self) -> Option<String> {
        match self.code.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
