//! Provider gateway: uniform `answer(prompt) -> text` over a chosen backend.
//!
//! Backend selection, credential validation and transport setup all happen at
//! configuration time; once a [`ProviderGateway`] exists, the only thing the
//! rest of the crate can do with it is ask for an answer. The credential is
//! owned by the gateway instance and never written to process environment.

pub mod anthropic;
pub mod chat_completions;
pub mod error;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anthropic::AnthropicAdapter;
use chat_completions::ChatCompletionsAdapter;

pub use error::{ErrorContext, ProviderError};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
const GROK_BASE_URL: &str = "https://api.x.ai/v1";
const PERPLEXITY_BASE_URL: &str = "https://api.perplexity.ai";

/// The supported backend set. Unrecognized identifiers are a configuration
/// error at parse time, not at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    OpenAi,
    Anthropic,
    Grok,
    Perplexity,
}

impl Backend {
    pub const ALL: &'static [Backend] = &[
        Backend::OpenAi,
        Backend::Anthropic,
        Backend::Grok,
        Backend::Perplexity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::OpenAi => "openai",
            Backend::Anthropic => "anthropic",
            Backend::Grok => "grok",
            Backend::Perplexity => "perplexity",
        }
    }

    /// Model used when the caller does not pick a variant.
    pub fn default_model(&self) -> &'static str {
        match self {
            Backend::OpenAi => "gpt-4o",
            Backend::Anthropic => "claude-3-5-haiku-latest",
            Backend::Grok => "grok-2-latest",
            Backend::Perplexity => "sonar",
        }
    }

    fn default_base_url(&self) -> &'static str {
        match self {
            Backend::OpenAi => OPENAI_BASE_URL,
            Backend::Anthropic => ANTHROPIC_BASE_URL,
            Backend::Grok => GROK_BASE_URL,
            Backend::Perplexity => PERPLEXITY_BASE_URL,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Backend::OpenAi),
            "anthropic" => Ok(Backend::Anthropic),
            "grok" => Ok(Backend::Grok),
            "perplexity" => Ok(Backend::Perplexity),
            other => {
                let supported: Vec<&str> = Backend::ALL.iter().map(|b| b.as_str()).collect();
                Err(ProviderError::config(format!(
                    "Unsupported provider '{other}'. Must be one of: {}",
                    supported.join(", ")
                )))
            }
        }
    }
}

/// Gateway construction knobs.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Per-request transport timeout.
    pub timeout: Duration,
    /// Model variant override; each backend has a default.
    pub model: Option<String>,
    /// Base URL override, for tests and proxies.
    pub base_url: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            model: None,
            base_url: None,
        }
    }
}

/// Capability the batch core needs from a provider: one prompt in, one reply
/// text out. Stubbed freely in tests.
#[async_trait::async_trait]
pub trait AnswerGateway: Send + Sync {
    async fn answer(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// One adapter per wire protocol; the backend → adapter mapping is resolved
/// once, at configuration time.
#[derive(Debug, Clone)]
enum BackendAdapter {
    Chat(ChatCompletionsAdapter),
    Anthropic(AnthropicAdapter),
}

/// A configured gateway bound to one backend and one credential.
#[derive(Debug, Clone)]
pub struct ProviderGateway {
    backend: Backend,
    adapter: BackendAdapter,
}

impl ProviderGateway {
    /// Validate the credential and build the backend adapter.
    pub fn configure(
        backend: Backend,
        api_key: &str,
        config: GatewayConfig,
    ) -> Result<Self, ProviderError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ProviderError::config(
                "API key cannot be empty or whitespace",
            ));
        }

        let model = config
            .model
            .clone()
            .unwrap_or_else(|| backend.default_model().to_string());
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| backend.default_base_url().to_string());

        let adapter = match backend {
            Backend::Anthropic => BackendAdapter::Anthropic(AnthropicAdapter::new(
                api_key,
                base_url,
                model,
                config.timeout,
            )?),
            Backend::OpenAi | Backend::Grok | Backend::Perplexity => {
                BackendAdapter::Chat(ChatCompletionsAdapter::new(
                    backend.as_str(),
                    api_key,
                    base_url,
                    model,
                    config.timeout,
                )?)
            }
        };

        Ok(Self { backend, adapter })
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub async fn answer(&self, prompt: &str) -> Result<String, ProviderError> {
        match &self.adapter {
            BackendAdapter::Chat(adapter) => adapter.answer(prompt).await,
            BackendAdapter::Anthropic(adapter) => adapter.answer(prompt).await,
        }
    }
}

#[async_trait::async_trait]
impl AnswerGateway for ProviderGateway {
    async fn answer(&self, prompt: &str) -> Result<String, ProviderError> {
        ProviderGateway::answer(self, prompt).await
    }
}
