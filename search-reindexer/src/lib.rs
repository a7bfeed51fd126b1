//! # Search Reindexer
//!
//! Main library for the search reindexer.
//!
//! This crate provides the command line, configuration and wiring for
//! rebuilding a search index from a Postgres table.

pub mod cli;
pub mod config;
pub mod logging;
pub mod shutdown;

pub use config::{Dependencies, Settings};

use search_reindexer_pipeline::PipelineError;
use thiserror::Error;

/// Errors that can occur during reindexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] PipelineError),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> shutdown::ExitCode {
        match self {
            Self::PipelineError(PipelineError::Cancelled) => shutdown::ExitCode::ShutdownRequested,
            _ => shutdown::ExitCode::GeneralError,
        }
    }
}
