//! # Pipeline Module
//!
//! Orchestrates a scan of one directory.
//!
//! ## Pipeline Stages
//! 1. **Enumerate** - List the directory into unhashed records
//! 2. **Hash** - A fixed pool of workers claims records and saves digests
//! 3. **Sort** - Sort by digest then name and flag duplicates
//!
//! ## Cancellation
//! Cancellation is cooperative. Workers check the token before claiming the
//! next record, the coordinator waits for all of them to stop, then the
//! partially hashed store is discarded.

mod cancel;
mod executor;
mod pool;

pub use cancel::CancellationToken;
pub use executor::{Pipeline, PipelineBuilder, PipelineConfig, PipelineResult, RunStatus};
pub use pool::{HashWorkerPool, PoolOutcome, DEFAULT_POLL_INTERVAL, DEFAULT_WORKERS};
