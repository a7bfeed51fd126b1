//! # Search Reindexer Pipeline
//!
//! This crate provides the pipeline components for reindexing a relational
//! table into OpenSearch without holding the table in memory.
//!
//! ## Architecture
//!
//! The pipeline follows the Source-Processor-Loader pattern:
//!
//! 1. **Source**: Streams rows through a server-side cursor
//! 2. **Processor**: Transforms rows into search documents
//! 3. **Batch**: Buffers documents up to the chunk size
//! 4. **Loader**: Submits batches through the bulk API with retries
//! 5. **Orchestrator**: Runs the control loop, cursor or primary key scan

pub mod batch;
pub mod errors;
pub mod loader;
pub mod orchestrator;
pub mod processor;
pub mod source;

#[cfg(test)]
mod testing;

pub use batch::{BatchAccumulator, FlushDecision};
pub use errors::PipelineError;
pub use loader::{Backoff, BulkSubmitter, RetryPolicy, RetryState, SubmitOutcome};
pub use orchestrator::{CompletionSummary, Counters, IndexingPipeline, KeyRange, PkScanPipeline};
pub use processor::{ColumnTransformer, DocumentTransformer};
pub use source::RowStream;
