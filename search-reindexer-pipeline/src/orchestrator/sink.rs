//! Downstream half shared by both extraction strategies.

use tracing::{debug, warn};

use super::summary::Counters;
use crate::batch::{BatchAccumulator, FlushDecision};
use crate::errors::PipelineError;
use crate::loader::BulkSubmitter;
use crate::processor::DocumentTransformer;
use search_reindexer_shared::Row;

/// Check the backend and make sure the target index exists.
///
/// An unhealthy cluster only warns; the bulk retries deal with outages.
pub(crate) async fn prepare_backend(submitter: &mut BulkSubmitter) -> Result<(), PipelineError> {
    match submitter.health_check().await {
        Ok(true) => debug!("Search backend healthy"),
        Ok(false) => warn!("Search backend reports an unhealthy cluster"),
        Err(PipelineError::Search(err)) => warn!(error = %err, "Health check failed"),
        Err(err) => return Err(err),
    }

    submitter.ensure_index().await
}

/// Transforms rows, batches the documents and submits full batches.
pub(crate) struct DocumentSink<'a> {
    transformer: &'a dyn DocumentTransformer,
    batch: BatchAccumulator,
    submitter: &'a mut BulkSubmitter,
    pub(crate) counters: Counters,
}

impl<'a> DocumentSink<'a> {
    pub(crate) fn new(
        transformer: &'a dyn DocumentTransformer,
        batch: BatchAccumulator,
        submitter: &'a mut BulkSubmitter,
    ) -> Self {
        Self {
            transformer,
            batch,
            submitter,
            counters: Counters::default(),
        }
    }

    pub(crate) async fn accept(&mut self, row: Row) -> Result<(), PipelineError> {
        self.counters.rows_read += 1;
        let document = self.transformer.transform(&row)?;
        debug!(document_id = %document.id, pending = self.batch.len(), "Indexing record");

        if self.batch.add(document) == FlushDecision::FlushNow {
            self.flush().await?;
        }
        Ok(())
    }

    /// Drain and submit whatever is buffered, even nothing.
    pub(crate) async fn flush(&mut self) -> Result<(), PipelineError> {
        let documents = self.batch.drain();
        let outcome = self.submitter.submit(&documents).await?;

        self.counters.submissions += 1;
        self.counters.completed += outcome.submitted as u64;
        self.counters.rejected += outcome.rejected.len() as u64;
        self.counters.retries += outcome.retries() as u64;

        for rejection in outcome.rejections() {
            warn!(error = %rejection, "Document rejected");
        }

        debug!(
            batch = documents.len(),
            completed = self.counters.completed,
            rejected = self.counters.rejected,
            "Batch flushed"
        );
        Ok(())
    }
}
