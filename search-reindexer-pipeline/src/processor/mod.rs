//! Processor module for the search reindexer pipeline.
//!
//! Transforms rows into search documents.

mod transformer;

pub use transformer::{ColumnTransformer, DocumentTransformer};
