//! Task unit: one (company, question) work item and its outcome capture.

use thiserror::Error;
use tracing::warn;

use crate::gateway::{AnswerGateway, ProviderError};
use crate::prompts;
use crate::reference::{LookupError, ReferenceLookup};

/// Tagged result of one task. Every task commits to exactly one outcome;
/// nothing below this boundary propagates as a crash of the wave or batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Reply text from the provider.
    Success(String),
    /// Contained failure, message embeds the company and the underlying error.
    Failure(String),
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success(_))
    }

    /// Standard contained-failure message for a company's cell.
    pub fn failure_for(company: &str, error: &impl std::fmt::Display) -> Self {
        TaskOutcome::Failure(format!("Error processing {company}: {error}"))
    }
}

#[derive(Debug, Error)]
enum TaskError {
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Execute one task: optional reference lookup, composition, provider call.
///
/// Any error along the way is converted to a [`TaskOutcome::Failure`] here,
/// so the caller always receives exactly one outcome.
pub async fn execute_task(
    gateway: &dyn AnswerGateway,
    reference: &dyn ReferenceLookup,
    company: &str,
    question: &str,
    private_data: bool,
) -> TaskOutcome {
    match run(gateway, reference, company, question, private_data).await {
        Ok(text) => TaskOutcome::Success(text),
        Err(err) => {
            warn!(company, error = %err, "task failed; containing to its cell");
            TaskOutcome::failure_for(company, &err)
        }
    }
}

async fn run(
    gateway: &dyn AnswerGateway,
    reference: &dyn ReferenceLookup,
    company: &str,
    question: &str,
    private_data: bool,
) -> Result<String, TaskError> {
    let reference_text = if private_data {
        Some(reference.lookup(company).await?)
    } else {
        None
    };

    let prompt = prompts::compose_analyst(company, question, reference_text.as_deref());
    let answer = gateway.answer(&prompt).await?;
    Ok(answer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{InMemoryReference, NoReferenceData};
    use async_trait::async_trait;

    struct EchoGateway;

    #[async_trait]
    impl AnswerGateway for EchoGateway {
        async fn answer(&self, prompt: &str) -> Result<String, ProviderError> {
            Ok(prompt.to_string())
        }
    }

    struct FailingGateway;

    #[async_trait]
    impl AnswerGateway for FailingGateway {
        async fn answer(&self, _prompt: &str) -> Result<String, ProviderError> {
            Err(ProviderError::provider("openai", "boom", false))
        }
    }

    #[tokio::test]
    async fn success_wraps_reply_text() {
        let outcome = execute_task(&EchoGateway, &NoReferenceData, "Acme", "Revenue?", false).await;
        match outcome {
            TaskOutcome::Success(text) => {
                assert!(text.contains("Acme"));
                assert!(text.contains("Revenue?"));
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn provider_error_becomes_failure_with_company_name() {
        let outcome =
            execute_task(&FailingGateway, &NoReferenceData, "Acme", "Revenue?", false).await;
        match outcome {
            TaskOutcome::Failure(message) => {
                assert!(message.starts_with("Error processing Acme:"));
                assert!(message.contains("boom"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn lookup_failure_is_contained() {
        // NoReferenceData fails every lookup, so the private-data path must
        // produce a Failure outcome rather than an error.
        let outcome = execute_task(&EchoGateway, &NoReferenceData, "Acme", "Revenue?", true).await;
        assert!(matches!(outcome, TaskOutcome::Failure(_)));
    }

    #[tokio::test]
    async fn not_found_marker_is_interpolated_not_fatal() {
        let store = InMemoryReference::new();
        let outcome = execute_task(&EchoGateway, &store, "Acme", "Revenue?", true).await;
        match outcome {
            TaskOutcome::Success(text) => {
                assert!(text.contains("no reference records found for Acme"));
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn found_record_is_interpolated() {
        let store = InMemoryReference::new().with_record("Acme", "ARR 100M");
        let outcome = execute_task(&EchoGateway, &store, "Acme", "Revenue?", true).await;
        match outcome {
            TaskOutcome::Success(text) => assert!(text.contains("ARR 100M")),
            other => panic!("expected success, got {other:?}"),
        }
    }
}
