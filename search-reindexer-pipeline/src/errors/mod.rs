//! Error types for the search reindexer pipeline.

use search_reindexer_repository::{SearchError, StoreError};
use thiserror::Error;

/// Errors that can occur while reindexing.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The relational store failed while reading rows.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// Bulk submission kept failing at the connection level.
    #[error("Search backend unreachable after {attempts} attempts: {source}")]
    BackendExhausted {
        attempts: u32,
        #[source]
        source: SearchError,
    },

    /// The search backend refused a single document.
    #[error("Document `{document_id}` rejected: {reason}")]
    DocumentRejected { document_id: String, reason: String },

    /// Invalid run parameters.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// A row could not be turned into a document.
    #[error("Transform error: {0}")]
    Transform(String),

    /// The search backend failed in a way retrying cannot fix.
    #[error("Search error: {0}")]
    Search(SearchError),

    /// The run was stopped by a cancellation signal.
    #[error("Reindex cancelled")]
    Cancelled,
}

impl PipelineError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Create a transform error.
    pub fn transform(msg: impl Into<String>) -> Self {
        Self::Transform(msg.into())
    }

    /// Create a document rejection.
    pub fn rejected(document_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DocumentRejected {
            document_id: document_id.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error must abort the run.
    ///
    /// Only `DocumentRejected` is recorded and skipped.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::DocumentRejected { .. })
    }
}
