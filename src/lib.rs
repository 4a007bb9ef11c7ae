#![forbid(unsafe_code)]

//! # answergrid
//!
//! Collects short structured answers from an LLM provider about a set of
//! companies, one answer per (company, prompt) pair, and assembles them into
//! a results grid.
//!
//! The core is the dispatch-and-aggregation loop: for each prompt, every
//! company is dispatched concurrently as its own worker (a "wave"), the wave
//! barrier-joins, and outcomes land positionally in the grid — rows in the
//! caller's company order, columns in prompt order. Per-task failures are
//! contained to their cell; only configuration and company-discovery errors
//! abort a batch.

pub mod api;
pub mod batch;
pub mod gateway;
pub mod prompts;
pub mod reference;
pub mod task;
pub mod wave;

pub use api::{BatchRequest, BatchResponse};
pub use batch::{BatchError, BatchOptions, BatchOutput, BatchRunner, ResultGrid};
pub use gateway::{AnswerGateway, Backend, GatewayConfig, ProviderError, ProviderGateway};
pub use reference::{InMemoryReference, NoReferenceData, ReferenceLookup};
pub use task::TaskOutcome;
pub use wave::WaveResult;
