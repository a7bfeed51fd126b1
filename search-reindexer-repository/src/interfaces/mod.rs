//! Interface definitions for both backends.
//!
//! The pipeline only talks to these traits, so the Postgres and OpenSearch
//! implementations can be swapped for in-memory fakes in tests.

mod row_store;
mod search_engine_client;

pub use row_store::{RowCursor, RowStore};
pub use search_engine_client::{SearchClientFactory, SearchEngineClient};
