//! Batch module for the search reindexer pipeline.
//!
//! Bounded in-memory buffer between the transformer and the submitter.

use crate::errors::PipelineError;
use search_reindexer_shared::Document;

/// What the caller should do after adding a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushDecision {
    /// The batch reached its capacity and must be drained.
    FlushNow,
    /// Keep adding.
    Continue,
}

/// Collects documents until `chunk_size` is reached.
///
/// `add` always appends before deciding, so the document that crosses the
/// threshold is part of the batch that gets flushed.
#[derive(Debug)]
pub struct BatchAccumulator {
    chunk_size: usize,
    pending: Vec<Document>,
}

impl BatchAccumulator {
    pub fn new(chunk_size: usize) -> Result<Self, PipelineError> {
        if chunk_size == 0 {
            return Err(PipelineError::config("chunk size must be at least 1"));
        }

        Ok(Self {
            chunk_size,
            pending: Vec::new(),
        })
    }

    pub fn add(&mut self, document: Document) -> FlushDecision {
        self.pending.push(document);
        if self.pending.len() >= self.chunk_size {
            FlushDecision::FlushNow
        } else {
            FlushDecision::Continue
        }
    }

    /// Take the current contents, leaving the batch empty.
    pub fn drain(&mut self) -> Vec<Document> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}
