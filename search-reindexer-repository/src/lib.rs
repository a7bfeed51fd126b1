//! # Search Reindexer Repository
//!
//! This crate provides the traits at both ends of the reindexing pipeline and
//! their concrete implementations: a Postgres row store that streams through a
//! server-side cursor, and an OpenSearch client that writes through the bulk API.

pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod postgres;
pub mod types;

pub use errors::{SearchError, StoreError};
pub use interfaces::{RowCursor, RowStore, SearchClientFactory, SearchEngineClient};
pub use opensearch::{IndexConfig, OpenSearchClient, OpenSearchClientFactory};
pub use postgres::PostgresStore;
pub use types::{BulkIndexReport, BulkItemFailure};
