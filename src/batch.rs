//! Batch aggregator: one dispatch wave per prompt, reassembled into a grid.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::gateway::{AnswerGateway, ProviderError};
use crate::prompts;
use crate::reference::ReferenceLookup;
use crate::task::TaskOutcome;
use crate::wave::run_wave;

/// One grid row: a company and its outcomes in prompt order.
#[derive(Debug, Clone)]
pub struct GridRow {
    pub company: String,
    pub outcomes: Vec<TaskOutcome>,
}

/// The assembled grid, rows in batch company order. Every row is
/// 1 + prompts wide; the grid is exactly companies tall.
#[derive(Debug, Clone, Default)]
pub struct ResultGrid {
    pub rows: Vec<GridRow>,
}

/// Companies and prompts as actually used (post-filtering, post-discovery),
/// echoed back so the caller can correlate rows and columns.
#[derive(Debug, Clone)]
pub struct BatchMetadata {
    pub companies: Vec<String>,
    pub prompts: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub grid: ResultGrid,
    pub metadata: BatchMetadata,
}

/// Fatal batch errors. Per-task failures never surface here; they live in
/// grid cells as contained `Failure` outcomes.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The company-discovery call failed. Discovery runs outside the wave
    /// containment, so this aborts the batch before any wave is dispatched.
    #[error("company discovery failed: {0}")]
    Discovery(#[source] ProviderError),
}

/// Batch-level knobs.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Consult the private-data collaborator for every task.
    pub private_data: bool,
    /// Replace the caller companies with a generated list of this size,
    /// discovered through one gateway call before the first wave.
    pub generate_companies: Option<usize>,
    /// Per-task deadline; a task past it becomes a `Failure` cell. `None`
    /// keeps the baseline no-timeout contract.
    pub task_timeout: Option<Duration>,
}

/// Drives one batch: filter inputs, optionally discover companies, then one
/// wave per prompt in caller order, appending into the grid.
pub struct BatchRunner {
    gateway: Arc<dyn AnswerGateway>,
    reference: Arc<dyn ReferenceLookup>,
    options: BatchOptions,
}

impl BatchRunner {
    pub fn new(gateway: Arc<dyn AnswerGateway>, reference: Arc<dyn ReferenceLookup>) -> Self {
        Self {
            gateway,
            reference,
            options: BatchOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BatchOptions) -> Self {
        self.options = options;
        self
    }

    pub async fn run(
        &self,
        companies: &[String],
        prompts: &[String],
    ) -> Result<BatchOutput, BatchError> {
        let mut companies = drop_blank(companies);
        let prompts = drop_blank(prompts);

        if let Some(count) = self.options.generate_companies {
            companies = self.discover_companies(&companies, count).await?;
        }

        debug!(
            companies = companies.len(),
            prompts = prompts.len(),
            private_data = self.options.private_data,
            "starting batch"
        );

        let mut rows: Vec<GridRow> = companies
            .iter()
            .map(|company| GridRow {
                company: company.clone(),
                outcomes: Vec::with_capacity(prompts.len()),
            })
            .collect();

        // Strictly one wave at a time: wave k+1 never starts before wave k's
        // barrier completes.
        for prompt in &prompts {
            let wave = run_wave(
                self.gateway.clone(),
                self.reference.clone(),
                &companies,
                prompt,
                self.options.private_data,
                self.options.task_timeout,
            )
            .await;

            for (row, outcome) in rows.iter_mut().zip(wave.outcomes) {
                row.outcomes.push(outcome);
            }
        }

        Ok(BatchOutput {
            grid: ResultGrid { rows },
            metadata: BatchMetadata { companies, prompts },
        })
    }

    /// One non-parallel discovery call. Not wrapped in task containment: a
    /// failure here aborts the batch.
    async fn discover_companies(
        &self,
        seed: &[String],
        count: usize,
    ) -> Result<Vec<String>, BatchError> {
        let prompt = prompts::compose_discovery(&seed.join(", "), count);
        let reply = self
            .gateway
            .answer(&prompt)
            .await
            .map_err(BatchError::Discovery)?;

        let discovered = prompts::parse_discovery_reply(&reply);
        debug!(discovered = discovered.len(), "company discovery complete");
        Ok(discovered)
    }
}

fn drop_blank(values: &[String]) -> Vec<String> {
    values
        .iter()
        .filter(|v| !v.trim().is_empty())
        .cloned()
        .collect()
}
