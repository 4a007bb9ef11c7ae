//! Private reference-data lookup collaborator.
//!
//! The batch core consults a [`ReferenceLookup`] only when a batch runs with
//! the private-data flag set, and treats whatever comes back as opaque text
//! to interpolate into the composed prompt. A found record rendering and a
//! not-found marker flow through identically; only a genuine lookup failure
//! is an error, and that is contained at the task boundary.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from a reference-data lookup.
#[derive(Debug, Error)]
pub enum LookupError {
    /// No reference-data source is wired up for this deployment.
    #[error("no reference data source configured")]
    Unavailable,

    /// The backing store failed.
    #[error("reference lookup failed: {0}")]
    Store(String),
}

/// Lookup seam over whatever private store a deployment has.
#[async_trait]
pub trait ReferenceLookup: Send + Sync {
    /// Fetch the reference text for a company. The `Ok` value is opaque to
    /// the core — record renderings and not-found markers are both data.
    async fn lookup(&self, company: &str) -> Result<String, LookupError>;
}

/// Lookup for deployments without a private-data source. Any task that asks
/// for reference data fails (contained to its cell).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReferenceData;

#[async_trait]
impl ReferenceLookup for NoReferenceData {
    async fn lookup(&self, _company: &str) -> Result<String, LookupError> {
        Err(LookupError::Unavailable)
    }
}

/// Map-backed lookup for tests and demos. Unknown companies get a not-found
/// marker rather than an error, mirroring how a real store reports a miss.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReference {
    records: HashMap<String, String>,
}

impl InMemoryReference {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(mut self, company: impl Into<String>, data: impl Into<String>) -> Self {
        self.records.insert(company.into(), data.into());
        self
    }
}

#[async_trait]
impl ReferenceLookup for InMemoryReference {
    async fn lookup(&self, company: &str) -> Result<String, LookupError> {
        match self.records.get(company) {
            Some(data) => Ok(data.clone()),
            None => Ok(format!("no reference records found for {company}")),
        }
    }
}
