//! Primary key scan, for stores that cannot hold a server-side cursor.

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::sink::{prepare_backend, DocumentSink};
use super::summary::CompletionSummary;
use crate::batch::BatchAccumulator;
use crate::errors::PipelineError;
use crate::loader::BulkSubmitter;
use crate::processor::DocumentTransformer;
use search_reindexer_repository::RowStore;
use search_reindexer_shared::SourceTable;

/// Upper bound (exclusive) of the keys to probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRange {
    Explicit(i64),
    /// `MAX(key) + 1`, read from the store before the scan.
    FromStore,
}

/// Probes every key in `0..upper` with a point lookup.
///
/// One round trip per key, so this is much slower than the cursor pipeline.
/// Missing or filtered-out keys are skipped.
pub struct PkScanPipeline {
    store: Arc<dyn RowStore>,
    transformer: Arc<dyn DocumentTransformer>,
    submitter: BulkSubmitter,
    source: SourceTable,
    cancel: CancellationToken,
}

impl PkScanPipeline {
    pub fn new(
        store: Arc<dyn RowStore>,
        transformer: Arc<dyn DocumentTransformer>,
        submitter: BulkSubmitter,
        source: SourceTable,
    ) -> Self {
        Self {
            store,
            transformer,
            submitter,
            source,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(self, cancel: CancellationToken) -> Self {
        Self {
            submitter: self.submitter.with_cancellation(cancel.clone()),
            cancel,
            ..self
        }
    }

    #[instrument(skip(self))]
    pub async fn run(
        &mut self,
        range: KeyRange,
        chunk_size: usize,
    ) -> Result<CompletionSummary, PipelineError> {
        let started = Instant::now();
        let batch = BatchAccumulator::new(chunk_size)?;
        let step = i64::try_from(chunk_size).map_err(|_| {
            PipelineError::config(format!("chunk size {} is too large", chunk_size))
        })?;
        if let KeyRange::Explicit(upper) = range {
            if upper < 0 {
                return Err(PipelineError::config(format!(
                    "key upper bound must not be negative, got {}",
                    upper
                )));
            }
        }

        let upper = self.resolve_upper_bound(range).await?;
        info!(upper, "Starting primary key scan");
        prepare_backend(&mut self.submitter).await?;

        let mut sink = DocumentSink::new(self.transformer.as_ref(), batch, &mut self.submitter);
        let mut group_start = 0i64;

        while group_start < upper {
            let group_end = group_start.saturating_add(step).min(upper);

            for key in group_start..group_end {
                let lookup = self.source.lookup_query(key);
                let row = tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => {
                        warn!(
                            key,
                            completed = sink.counters.completed,
                            "Primary key scan cancelled"
                        );
                        return Err(PipelineError::Cancelled);
                    }
                    row = self.store.fetch_one(&lookup) => row?,
                };
                sink.counters.keys_scanned += 1;

                match row {
                    Some(row) => sink.accept(row).await?,
                    None => sink.counters.lookup_misses += 1,
                }
            }

            debug!(group_start, group_end, "Scanned key group");
            group_start = group_end;
        }

        sink.flush().await?;

        let summary = CompletionSummary {
            counters: sink.counters,
            elapsed: started.elapsed(),
        };
        info!(
            completed = summary.counters.completed,
            rejected = summary.counters.rejected,
            keys = summary.counters.keys_scanned,
            misses = summary.counters.lookup_misses,
            "Primary key scan complete"
        );
        Ok(summary)
    }

    async fn resolve_upper_bound(&self, range: KeyRange) -> Result<i64, PipelineError> {
        match range {
            KeyRange::Explicit(upper) => Ok(upper),
            KeyRange::FromStore => {
                let row = self.store.fetch_one(&self.source.max_key_query()).await?;
                let max = row
                    .as_ref()
                    .and_then(|row| row.values().first())
                    .and_then(|value| value.as_i64());
                Ok(max.map_or(0, |max| max.saturating_add(1)))
            }
        }
    }
}
