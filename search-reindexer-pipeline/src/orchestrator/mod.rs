//! Orchestrator module for the search reindexer pipeline.
//!
//! Drives rows from the store through the transformer, the batch and the
//! submitter. Two extraction strategies share the same downstream half.

mod indexing;
mod pk_scan;
mod sink;
mod summary;

pub use indexing::IndexingPipeline;
pub use pk_scan::{KeyRange, PkScanPipeline};
pub use summary::{CompletionSummary, Counters};
