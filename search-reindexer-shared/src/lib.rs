//! # Search Reindexer Shared
//!
//! Plain data types passed between the relational store, the pipeline and the
//! search backend. Nothing in this crate performs I/O.

mod document;
mod query;
mod row;
mod value;

pub use document::Document;
pub use query::{Query, SourceTable};
pub use row::Row;
pub use value::FieldValue;
