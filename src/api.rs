//! Request/response envelope for the batch entry point.
//!
//! The core works on normalized lists; this module owns the outer JSON
//! contract: one-or-many coercion for `companies`/`prompts`, request
//! defaults, and the nested-array grid rendering with its per-cell
//! success/failure shapes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::batch::{BatchOptions, BatchOutput, BatchRunner};
use crate::gateway::{Backend, GatewayConfig, ProviderGateway};
use crate::reference::ReferenceLookup;
use crate::task::TaskOutcome;

// =============================================================================
// Request
// =============================================================================

/// A scalar-or-list field. Callers may pass `"Acme"` or `["Acme", "Globex"]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

impl Default for OneOrMany {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

fn default_number() -> usize {
    10
}

/// The entry-point request.
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub companies: OneOrMany,
    #[serde(default)]
    pub prompts: OneOrMany,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub api_key: String,
    /// Company-generation count, used when `create_list` is set.
    #[serde(default = "default_number")]
    pub number: usize,
    #[serde(default)]
    pub create_list: bool,
    #[serde(default)]
    pub private_data: bool,
}

// =============================================================================
// Response
// =============================================================================

/// One grid cell: the answer text, or a contained per-task failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Failure { error: bool, message: CellMessage },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellMessage {
    pub content: String,
}

impl From<TaskOutcome> for Cell {
    fn from(outcome: TaskOutcome) -> Self {
        match outcome {
            TaskOutcome::Success(text) => Cell::Text(text),
            TaskOutcome::Failure(message) => Cell::Failure {
                error: true,
                message: CellMessage { content: message },
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseMetadata {
    pub companies: Vec<String>,
    pub prompts: Vec<String>,
}

/// The entry-point response: a success payload with the grid as nested
/// arrays, or a failure payload carrying the error message.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BatchResponse {
    Success {
        data: Vec<Vec<Cell>>,
        metadata: ResponseMetadata,
    },
    Error {
        error: String,
    },
}

impl BatchResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, BatchResponse::Error { .. })
    }

    fn from_output(output: BatchOutput) -> Self {
        let data = output
            .grid
            .rows
            .into_iter()
            .map(|row| {
                let mut cells = Vec::with_capacity(1 + row.outcomes.len());
                cells.push(Cell::Text(row.company));
                cells.extend(row.outcomes.into_iter().map(Cell::from));
                cells
            })
            .collect();

        BatchResponse::Success {
            data,
            metadata: ResponseMetadata {
                companies: output.metadata.companies,
                prompts: output.metadata.prompts,
            },
        }
    }
}

// =============================================================================
// Handler
// =============================================================================

/// Run one request end to end: configure the gateway, drive the batch,
/// wrap the result. Configuration and discovery failures become the error
/// envelope; per-task failures stay inside the grid.
pub async fn run_request(
    request: BatchRequest,
    reference: Arc<dyn ReferenceLookup>,
) -> BatchResponse {
    run_request_with_config(request, reference, GatewayConfig::default()).await
}

/// Like [`run_request`] but with explicit gateway construction knobs
/// (model variant, base URL override, timeout).
pub async fn run_request_with_config(
    request: BatchRequest,
    reference: Arc<dyn ReferenceLookup>,
    gateway_config: GatewayConfig,
) -> BatchResponse {
    let backend: Backend = match request.provider.parse() {
        Ok(backend) => backend,
        Err(err) => return BatchResponse::Error { error: err.to_string() },
    };

    let gateway = match ProviderGateway::configure(backend, &request.api_key, gateway_config) {
        Ok(gateway) => gateway,
        Err(err) => return BatchResponse::Error { error: err.to_string() },
    };

    let options = BatchOptions {
        private_data: request.private_data,
        generate_companies: request.create_list.then_some(request.number),
        task_timeout: None,
    };

    let runner = BatchRunner::new(Arc::new(gateway), reference).with_options(options);

    let companies = request.companies.into_vec();
    let prompts = request.prompts.into_vec();

    match runner.run(&companies, &prompts).await {
        Ok(output) => BatchResponse::from_output(output),
        Err(err) => BatchResponse::Error { error: err.to_string() },
    }
}

// =============================================================================
// TESTS
// =============================================================================
