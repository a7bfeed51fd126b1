//! Loader module for the search reindexer pipeline.
//!
//! Submits batches to the search engine's bulk API, reconnecting and
//! retrying the same batch when the connection fails.

mod retry;

pub use retry::{Backoff, RetryPolicy, RetryState, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_WAIT};

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::errors::PipelineError;
use search_reindexer_repository::{
    BulkItemFailure, SearchClientFactory, SearchEngineClient, SearchError,
};
use search_reindexer_shared::Document;

/// Result of submitting one batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmitOutcome {
    /// Documents the search engine indexed.
    pub submitted: usize,
    /// Documents the search engine refused.
    pub rejected: Vec<BulkItemFailure>,
    /// Attempts made, including the successful one. Zero for empty batches.
    pub attempts: u32,
}

impl SubmitOutcome {
    /// Rejections as pipeline errors carrying the document id and reason.
    pub fn rejections(&self) -> impl Iterator<Item = PipelineError> + '_ {
        self.rejected.iter().map(|failure| {
            PipelineError::rejected(
                failure.document_id.clone(),
                format!("status {}: {}", failure.status, failure.reason),
            )
        })
    }

    /// Attempts beyond the first.
    pub fn retries(&self) -> u32 {
        self.attempts.saturating_sub(1)
    }
}

/// An operation that gave up, with the attempts it made.
struct Failed {
    error: PipelineError,
    attempts: u32,
}

impl Failed {
    fn new(error: PipelineError, attempts: u32) -> Self {
        Self { error, attempts }
    }
}

/// Sends batches to the search engine.
///
/// The submitter owns its client. After a connection failure the client is
/// discarded and a new one is requested from the factory before the next
/// attempt. Only connection failures are retried.
pub struct BulkSubmitter {
    factory: Arc<dyn SearchClientFactory>,
    client: Option<Arc<dyn SearchEngineClient>>,
    policy: RetryPolicy,
    cancel: CancellationToken,
}

impl BulkSubmitter {
    /// Create a submitter. The first client is connected lazily.
    pub fn new(factory: Arc<dyn SearchClientFactory>, policy: RetryPolicy) -> Self {
        Self {
            factory,
            client: None,
            policy,
            cancel: CancellationToken::new(),
        }
    }

    /// Abandon in-flight requests and retry waits when `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Submit one batch.
    ///
    /// Empty batches return immediately without touching the backend. A
    /// request refused as a whole reports every document as rejected.
    #[instrument(skip(self, documents), fields(count = documents.len()))]
    pub async fn submit(
        &mut self,
        documents: &[Document],
    ) -> Result<SubmitOutcome, PipelineError> {
        if documents.is_empty() {
            debug!("Empty batch, nothing to submit");
            return Ok(SubmitOutcome::default());
        }

        let result = self
            .with_retry("Bulk index", |client| async move {
                client.bulk_index(documents).await
            })
            .await;

        match result {
            Ok((report, attempts)) => {
                debug!(
                    succeeded = report.succeeded(),
                    failed = report.failures.len(),
                    attempts,
                    "Bulk index completed"
                );
                Ok(SubmitOutcome {
                    submitted: report.succeeded(),
                    rejected: report.failures,
                    attempts,
                })
            }
            Err(Failed {
                error: PipelineError::Search(SearchError::RequestRejected { status, reason }),
                attempts,
            }) => {
                warn!(status, reason = %reason, attempts, "Bulk request rejected as a whole");
                let rejected = documents
                    .iter()
                    .map(|doc| BulkItemFailure {
                        document_id: doc.id.clone(),
                        status,
                        reason: reason.clone(),
                    })
                    .collect();
                Ok(SubmitOutcome {
                    submitted: 0,
                    rejected,
                    attempts,
                })
            }
            Err(failed) => Err(failed.error),
        }
    }

    /// Ensure the target index exists, retrying connection failures.
    pub async fn ensure_index(&mut self) -> Result<(), PipelineError> {
        self.with_retry("Ensure index", |client| async move {
            client.ensure_index_exists().await
        })
        .await
        .map(|_| ())
        .map_err(|failed| failed.error)
    }

    /// Check if the search engine is healthy.
    pub async fn health_check(&mut self) -> Result<bool, PipelineError> {
        self.with_retry("Health check", |client| async move {
            client.health_check().await
        })
        .await
        .map(|(healthy, _)| healthy)
        .map_err(|failed| failed.error)
    }

    async fn client(&mut self) -> Result<Arc<dyn SearchEngineClient>, SearchError> {
        if let Some(client) = &self.client {
            return Ok(client.clone());
        }
        let client = self.factory.connect().await?;
        self.client = Some(client.clone());
        Ok(client)
    }

    /// Run `op` until it succeeds, fails with a non-connection error, or the
    /// policy runs out of attempts. Either way the attempt count comes back.
    async fn with_retry<T, F, Fut>(
        &mut self,
        operation: &'static str,
        op: F,
    ) -> Result<(T, u32), Failed>
    where
        F: Fn(Arc<dyn SearchEngineClient>) -> Fut,
        Fut: Future<Output = Result<T, SearchError>>,
    {
        let cancel = self.cancel.clone();
        let mut state = self.policy.start();

        loop {
            state.record_attempt();

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(Failed::new(PipelineError::Cancelled, state.attempt()))
                }
                result = async {
                    let client = self.client().await?;
                    op(client).await
                } => result,
            };

            let err = match result {
                Ok(value) => {
                    if state.attempt() > 1 {
                        info!(
                            attempt = state.attempt(),
                            "{} succeeded after retry", operation
                        );
                    }
                    return Ok((value, state.attempt()));
                }
                Err(err) if err.is_connection() => err,
                Err(err) => {
                    debug!(error = %err, "{} failed with non-retryable error", operation);
                    return Err(Failed::new(PipelineError::Search(err), state.attempt()));
                }
            };

            // Reconnect on the next attempt.
            self.client = None;

            if !state.can_retry() {
                error!(
                    attempts = state.attempt(),
                    error = %err,
                    "{} failed, retries exhausted", operation
                );
                let attempts = state.attempt();
                return Err(Failed::new(
                    PipelineError::BackendExhausted {
                        attempts,
                        source: err,
                    },
                    attempts,
                ));
            }

            let wait = state.next_wait();
            warn!(
                attempt = state.attempt(),
                max_attempts = state.max_attempts(),
                wait_ms = wait.as_millis() as u64,
                error = %err,
                "{} failed, retrying", operation
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(Failed::new(PipelineError::Cancelled, state.attempt()))
                }
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockFactory, MockSearchClient};
    use std::sync::atomic::Ordering;
    use std::time::Duration;
    use tokio::time::Instant;

    fn docs(ids: &[&str]) -> Vec<Document> {
        ids.iter().map(|id| Document::new(*id, "test")).collect()
    }

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_empty_batch_skips_backend() {
        let factory = MockFactory::new(MockSearchClient::new());
        let mut submitter = BulkSubmitter::new(factory.clone(), policy(3));

        let outcome = submitter.submit(&[]).await.unwrap();

        assert_eq!(outcome, SubmitOutcome::default());
        assert_eq!(factory.connects.load(Ordering::SeqCst), 0);
        assert_eq!(factory.client.bulk_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_client_is_reused_between_batches() {
        let factory = MockFactory::new(MockSearchClient::new());
        let mut submitter = BulkSubmitter::new(factory.clone(), policy(3));

        submitter.submit(&docs(&["a"])).await.unwrap();
        submitter.submit(&docs(&["b"])).await.unwrap();

        assert_eq!(factory.connects.load(Ordering::SeqCst), 1);
        assert_eq!(factory.client.batches(), vec![vec!["a"], vec!["b"]]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_replace_failed_attempts() {
        let factory = MockFactory::new(MockSearchClient::failing(3));
        let mut submitter = BulkSubmitter::new(factory.clone(), policy(10));
        let start = Instant::now();

        let outcome = submitter.submit(&docs(&["a", "b"])).await.unwrap();

        assert_eq!(outcome.submitted, 2);
        assert_eq!(outcome.attempts, 4);
        assert_eq!(outcome.retries(), 3);
        // accepted exactly once
        assert_eq!(factory.client.batches(), vec![vec!["a", "b"]]);
        // a fresh client after every connection failure
        assert_eq!(factory.connects.load(Ordering::SeqCst), 4);
        assert!(start.elapsed() >= Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_is_fatal() {
        let factory = MockFactory::new(MockSearchClient::failing(100));
        let mut submitter = BulkSubmitter::new(factory.clone(), policy(2));

        let err = submitter.submit(&docs(&["a"])).await.unwrap_err();

        assert!(matches!(err, PipelineError::BackendExhausted { attempts: 3, .. }));
        assert!(err.is_fatal());
        assert_eq!(factory.client.bulk_calls.load(Ordering::SeqCst), 3);
        assert!(factory.client.batches().is_empty());
    }

    #[tokio::test]
    async fn test_item_rejections_are_reported() {
        let factory = MockFactory::new(MockSearchClient::rejecting(&["b"]));
        let mut submitter = BulkSubmitter::new(factory, policy(3));

        let outcome = submitter.submit(&docs(&["a", "b", "c"])).await.unwrap();

        assert_eq!(outcome.submitted, 2);
        assert_eq!(outcome.attempts, 1);
        let rejections: Vec<PipelineError> = outcome.rejections().collect();
        assert_eq!(rejections.len(), 1);
        assert!(matches!(
            &rejections[0],
            PipelineError::DocumentRejected { document_id, .. } if document_id == "b"
        ));
    }

    #[tokio::test]
    async fn test_refused_request_rejects_every_document() {
        let factory = MockFactory::new(MockSearchClient::refusing(400));
        let mut submitter = BulkSubmitter::new(factory.clone(), policy(3));

        let outcome = submitter.submit(&docs(&["a", "b"])).await.unwrap();

        assert_eq!(outcome.submitted, 0);
        assert_eq!(outcome.rejected.len(), 2);
        // not retried
        assert_eq!(factory.client.bulk_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refusal_after_reconnects_keeps_attempt_count() {
        let client = MockSearchClient::refusing(400).with_connection_failures(2);
        let factory = MockFactory::new(client);
        let mut submitter = BulkSubmitter::new(factory.clone(), policy(5));

        let outcome = submitter.submit(&docs(&["a", "b"])).await.unwrap();

        assert_eq!(factory.client.bulk_calls.load(Ordering::SeqCst), 3);
        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.retries(), 2);
        assert_eq!(outcome.rejected.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_retry_wait() {
        let factory = MockFactory::new(MockSearchClient::failing(100));
        let cancel = CancellationToken::new();
        let mut submitter =
            BulkSubmitter::new(factory.clone(), policy(10)).with_cancellation(cancel.clone());

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(7)).await;
            trigger.cancel();
        });

        let err = submitter.submit(&docs(&["a"])).await.unwrap_err();

        assert!(matches!(err, PipelineError::Cancelled));
        assert_eq!(factory.client.bulk_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_in_flight_request() {
        let factory = MockFactory::new(MockSearchClient::hanging());
        let cancel = CancellationToken::new();
        let mut submitter =
            BulkSubmitter::new(factory, policy(10)).with_cancellation(cancel.clone());

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let err = submitter.submit(&docs(&["a"])).await.unwrap_err();
        assert!(matches!(err, PipelineError::Cancelled));
    }

    #[tokio::test]
    async fn test_ensure_index_and_health() {
        let factory = MockFactory::new(MockSearchClient::new());
        let mut submitter = BulkSubmitter::new(factory.clone(), policy(3));

        submitter.ensure_index().await.unwrap();
        assert!(submitter.health_check().await.unwrap());
        assert_eq!(factory.client.index_checks.load(Ordering::SeqCst), 1);
    }
}
