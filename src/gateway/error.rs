//! Error types for the provider gateway.

use thiserror::Error;

/// Additional context from provider errors for debugging.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// HTTP status code from the provider.
    pub http_status: Option<u16>,
    /// Provider-specific error code (e.g. "invalid_api_key").
    pub provider_code: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }
}

/// Errors that can occur when configuring or calling a backend.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Configuration error (unknown backend, blank credential). Fatal to the
    /// whole batch; nothing is dispatched once one of these surfaces.
    #[error("configuration error: {0}")]
    Config(String),

    /// Backend returned an error or an unusable response body.
    #[error("{backend} error: {message}")]
    Provider {
        backend: &'static str,
        message: String,
        retryable: bool,
        context: Option<ErrorContext>,
    },

    /// HTTP/network error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ProviderError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn provider(backend: &'static str, message: impl Into<String>, retryable: bool) -> Self {
        Self::Provider {
            backend,
            message: message.into(),
            retryable,
            context: None,
        }
    }

    pub fn provider_with_context(
        backend: &'static str,
        message: impl Into<String>,
        retryable: bool,
        context: ErrorContext,
    ) -> Self {
        Self::Provider {
            backend,
            message: message.into(),
            retryable,
            context: Some(context),
        }
    }

    /// Whether retrying could plausibly succeed. The batch core never retries
    /// (per-task failures are contained instead), but callers layered above it
    /// can use this hint.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Config(_) => false,
            Self::Provider { retryable, .. } => *retryable,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
        }
    }

    /// Short error code for logging.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "config_error",
            Self::Provider { .. } => "provider_error",
            Self::Http(_) => "http_error",
        }
    }

    /// Get the error context if available.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::Provider { context, .. } => context.as_ref(),
            _ => None,
        }
    }
}
