//! Search error types.
//!
//! This module defines the error types that can occur while talking to the
//! search engine.

use thiserror::Error;

/// Errors that can occur during search engine operations.
#[derive(Error, Debug, Clone)]
pub enum SearchError {
    /// The search engine could not be reached, timed out, or answered with a
    /// transient status (429, 5xx). Resubmitting the same request may succeed.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The search engine accepted the connection but refused the request as a
    /// whole (4xx other than 429). Resubmitting the same payload will not help.
    #[error("Request rejected with status {status}: {reason}")]
    RequestRejected { status: u16, reason: String },

    /// Failed to create or update the search index.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// Failed to parse response from search engine.
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl SearchError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a request rejected error.
    pub fn rejected(status: u16, reason: impl Into<String>) -> Self {
        Self::RequestRejected {
            status,
            reason: reason.into(),
        }
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Whether the failure happened at the connection level and the request
    /// should be retried on a fresh client.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::ConnectionError(_))
    }

    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        if status == 429 || status >= 500 {
            Self::ConnectionError(format!("status {}: {}", status, body.into()))
        } else {
            Self::rejected(status, body)
        }
    }
}
