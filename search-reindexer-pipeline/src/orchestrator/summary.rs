//! Run counters and the summary returned when a run completes.

use std::fmt;
use std::time::Duration;

/// Progress of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counters {
    /// Rows handed to the transformer.
    pub rows_read: u64,
    /// Documents the search engine indexed.
    pub completed: u64,
    /// Documents the search engine refused.
    pub rejected: u64,
    /// Submit calls, including the final flush even when it was empty.
    pub submissions: u64,
    /// Bulk attempts beyond the first, summed over all batches.
    pub retries: u64,
    /// Keys probed by a primary key scan.
    pub keys_scanned: u64,
    /// Probed keys that had no matching row.
    pub lookup_misses: u64,
}

/// Final counters of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionSummary {
    pub counters: Counters,
    pub elapsed: Duration,
}

impl CompletionSummary {
    pub fn completed(&self) -> u64 {
        self.counters.completed
    }

    pub fn rejected(&self) -> u64 {
        self.counters.rejected
    }
}

impl fmt::Display for CompletionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} documents indexed, {} rejected, {} rows read in {:.1}s",
            self.counters.completed,
            self.counters.rejected,
            self.counters.rows_read,
            self.elapsed.as_secs_f64()
        )
    }
}
