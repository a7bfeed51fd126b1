//! Cursor-driven reindex.

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use super::sink::{prepare_backend, DocumentSink};
use super::summary::CompletionSummary;
use crate::batch::BatchAccumulator;
use crate::errors::PipelineError;
use crate::loader::BulkSubmitter;
use crate::processor::DocumentTransformer;
use crate::source::RowStream;
use search_reindexer_repository::RowStore;
use search_reindexer_shared::Query;

/// Streams a query through a server-side cursor into the search index.
///
/// Batches are submitted one after another in row order. The cursor is
/// closed on every exit path, including cancellation.
pub struct IndexingPipeline {
    store: Arc<dyn RowStore>,
    transformer: Arc<dyn DocumentTransformer>,
    submitter: BulkSubmitter,
    fetch_window: Option<usize>,
    cancel: CancellationToken,
}

impl IndexingPipeline {
    pub fn new(
        store: Arc<dyn RowStore>,
        transformer: Arc<dyn DocumentTransformer>,
        submitter: BulkSubmitter,
    ) -> Self {
        Self {
            store,
            transformer,
            submitter,
            fetch_window: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Rows fetched per round trip. Defaults to the chunk size.
    pub fn with_fetch_window(mut self, fetch_window: usize) -> Self {
        self.fetch_window = Some(fetch_window);
        self
    }

    pub fn with_cancellation(self, cancel: CancellationToken) -> Self {
        Self {
            submitter: self.submitter.with_cancellation(cancel.clone()),
            cancel,
            ..self
        }
    }

    /// Reindex every row returned by `query`, `chunk_size` documents per bulk request.
    #[instrument(skip(self, query))]
    pub async fn run(
        &mut self,
        query: &Query,
        chunk_size: usize,
    ) -> Result<CompletionSummary, PipelineError> {
        let started = Instant::now();
        let batch = BatchAccumulator::new(chunk_size)?;
        let fetch_window = self.fetch_window.unwrap_or(chunk_size);
        if fetch_window == 0 {
            return Err(PipelineError::config("fetch window must be at least 1"));
        }

        info!(fetch_window, "Starting cursor reindex");
        prepare_backend(&mut self.submitter).await?;

        let mut stream = RowStream::open(self.store.as_ref(), query, fetch_window)
            .await?
            .with_cancellation(self.cancel.clone());
        let mut sink = DocumentSink::new(self.transformer.as_ref(), batch, &mut self.submitter);

        let result = drive(&mut stream, &mut sink).await;
        let closed = stream.close().await;

        match (result, closed) {
            (Ok(()), Ok(())) => {}
            (Ok(()), Err(err)) => return Err(err),
            (Err(err), closed) => {
                if let Err(close_err) = closed {
                    warn!(error = %close_err, "Failed to close row stream");
                }
                warn!(
                    error = %err,
                    completed = sink.counters.completed,
                    "Reindex aborted"
                );
                return Err(err);
            }
        }

        let summary = CompletionSummary {
            counters: sink.counters,
            elapsed: started.elapsed(),
        };
        info!(
            completed = summary.counters.completed,
            rejected = summary.counters.rejected,
            rows = summary.counters.rows_read,
            retries = summary.counters.retries,
            "Reindex complete"
        );
        Ok(summary)
    }
}

async fn drive(stream: &mut RowStream, sink: &mut DocumentSink<'_>) -> Result<(), PipelineError> {
    while let Some(row) = stream.next().await? {
        sink.accept(row).await?;
    }
    sink.flush().await
}
