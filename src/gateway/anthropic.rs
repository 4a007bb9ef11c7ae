//! Adapter for the Anthropic messages endpoint.
//!
//! Anthropic does not speak the chat-completions shape: auth goes through an
//! `x-api-key` header, the API version is mandatory, and so is `max_tokens`.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use super::chat_completions::read_body_capped;
use super::error::{ErrorContext, ProviderError};

const BACKEND: &str = "anthropic";
const API_VERSION: &str = "2023-06-01";

/// Completion cap. Answers are composed to stay under ~80 words, so this
/// leaves generous headroom without letting a runaway reply grow unbounded.
const MAX_TOKENS: u32 = 512;

/// Adapter over the Anthropic messages API.
#[derive(Debug, Clone)]
pub struct AnthropicAdapter {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl AnthropicAdapter {
    pub fn new(
        api_key: &str,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));

        let key_value = HeaderValue::from_str(api_key)
            .map_err(|_| ProviderError::config("Invalid API key format"))?;
        headers.insert("x-api-key", key_value);

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ProviderError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/messages", self.base_url)
    }

    pub async fn answer(&self, prompt: &str) -> Result<String, ProviderError> {
        let messages = [ApiMessage {
            role: "user",
            content: prompt,
        }];
        let api_req = MessagesApiRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: &messages,
        };

        let response = self
            .client
            .post(self.messages_url())
            .json(&api_req)
            .send()
            .await?;

        let status = response.status();
        let body = read_body_capped(response, BACKEND).await?;

        if !status.is_success() {
            return Err(error_from_body(status.as_u16(), &body));
        }

        let parsed: MessagesApiResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::provider(BACKEND, format!("Invalid JSON: {e}"), false))?;

        if let Some(error) = parsed.error {
            return Err(ProviderError::provider(
                BACKEND,
                error.message.unwrap_or_default(),
                false,
            ));
        }

        let text = parsed
            .content
            .unwrap_or_default()
            .into_iter()
            .filter_map(|block| block.text)
            .find(|t| !t.is_empty())
            .ok_or_else(|| ProviderError::provider(BACKEND, "No text content in response", false))?;

        Ok(text)
    }
}

fn error_from_body(status: u16, body: &str) -> ProviderError {
    let retryable = status >= 500 || status == 429;
    let ctx = ErrorContext::new().with_status(status);

    if let Ok(parsed) = serde_json::from_str::<MessagesApiResponse>(body) {
        if let Some(error) = parsed.error {
            let ctx = if let Some(kind) = error.error_type {
                ctx.with_code(kind)
            } else {
                ctx
            };
            let message = error.message.unwrap_or_default();
            return ProviderError::provider_with_context(BACKEND, message, retryable, ctx);
        }
    }

    ProviderError::provider_with_context(BACKEND, format!("HTTP {status}"), retryable, ctx)
}

// =============================================================================
// API TYPES
// =============================================================================

#[derive(Serialize)]
struct MessagesApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [ApiMessage<'a>],
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesApiResponse {
    content: Option<Vec<ContentBlock>>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(rename = "type")]
    error_type: Option<String>,
    message: Option<String>,
}
