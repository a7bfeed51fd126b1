//! Source module for the search reindexer pipeline.
//!
//! Streams rows out of the relational store in fixed-size windows.

mod row_stream;

pub use row_stream::RowStream;
