//! Dispatch wave: one prompt fanned out across all companies concurrently.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::gateway::AnswerGateway;
use crate::reference::ReferenceLookup;
use crate::task::{execute_task, TaskOutcome};

/// Outcomes of one wave, positionally aligned with the company list that
/// entered it: `outcomes[i]` belongs to `companies[i]`. Keying by position
/// instead of name keeps duplicate company names in distinct slots.
#[derive(Debug, Clone)]
pub struct WaveResult {
    pub outcomes: Vec<TaskOutcome>,
}

impl WaveResult {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Run one question across all companies, one spawned worker per company,
/// and block until every worker has completed.
///
/// Workers share nothing mutable; each owns its inputs and hands back exactly
/// one outcome. A worker that panics or outlives `task_timeout` degrades to a
/// `Failure` in its own slot, so the wave always completes with one outcome
/// per input row.
pub async fn run_wave(
    gateway: Arc<dyn AnswerGateway>,
    reference: Arc<dyn ReferenceLookup>,
    companies: &[String],
    question: &str,
    private_data: bool,
    task_timeout: Option<Duration>,
) -> WaveResult {
    debug!(
        question,
        companies = companies.len(),
        "dispatching wave"
    );

    let mut handles = Vec::with_capacity(companies.len());
    for company in companies {
        let gateway = gateway.clone();
        let reference = reference.clone();
        let company = company.clone();
        let question = question.to_string();

        handles.push(tokio::spawn(async move {
            let task = execute_task(
                gateway.as_ref(),
                reference.as_ref(),
                &company,
                &question,
                private_data,
            );
            match task_timeout {
                Some(limit) => match tokio::time::timeout(limit, task).await {
                    Ok(outcome) => outcome,
                    Err(_) => TaskOutcome::failure_for(
                        &company,
                        &format!("timed out after {:.1}s", limit.as_secs_f64()),
                    ),
                },
                None => task.await,
            }
        }));
    }

    // Barrier join: the wave has no partial-completion exit. Joined results
    // come back in spawn order, which is what pins outcome i to company i.
    let joined = futures::future::join_all(handles).await;
    let outcomes: Vec<TaskOutcome> = joined
        .into_iter()
        .zip(companies)
        .map(|(result, company)| match result {
            Ok(outcome) => outcome,
            Err(join_err) => TaskOutcome::failure_for(company, &join_err),
        })
        .collect();

    let failures = outcomes.iter().filter(|o| !o.is_success()).count();
    debug!(
        question,
        completed = outcomes.len(),
        failures,
        "wave complete"
    );

    WaveResult { outcomes }
}
