//! Search engine client trait definition.
//!
//! This module defines the abstract interface for search engine operations,
//! allowing for different backend implementations (OpenSearch, Elasticsearch, etc.).

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::SearchError;
use crate::types::BulkIndexReport;
use search_reindexer_shared::Document;

/// Abstract interface for search engine operations.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// Connection-level failures are reported as [`SearchError::ConnectionError`];
/// everything else means the engine was reached and answered.
#[async_trait]
pub trait SearchEngineClient: Send + Sync {
    /// Index multiple documents in a single bulk operation.
    ///
    /// Each document is written under its own `id` into its own `index`, so
    /// submitting the same document twice replaces it.
    ///
    /// # Arguments
    ///
    /// * `documents` - Slice of documents to index, in submission order
    ///
    /// # Returns
    ///
    /// * `Ok(BulkIndexReport)` - The request was processed; per-document
    ///   rejections are listed in the report
    /// * `Err(SearchError::ConnectionError)` - The request may not have been
    ///   processed and can be retried
    /// * `Err(SearchError)` - The request was refused as a whole
    async fn bulk_index(&self, documents: &[Document]) -> Result<BulkIndexReport, SearchError>;

    /// Ensure the search index exists with proper mappings.
    ///
    /// If the index doesn't exist, it is created with the configured settings
    /// and mappings; otherwise the mappings are updated in place.
    async fn ensure_index_exists(&self) -> Result<(), SearchError>;

    /// Check if the search engine is healthy and reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the search engine is healthy
    /// * `Ok(false)` - If the search engine is unhealthy
    /// * `Err(SearchError)` - If the health check fails to execute
    async fn health_check(&self) -> Result<bool, SearchError>;
}

/// Builds fresh search engine clients.
///
/// After a connection failure the submitter discards its client and asks the
/// factory for a new one before retrying.
#[async_trait]
pub trait SearchClientFactory: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn SearchEngineClient>, SearchError>;
}
