//! Relational store trait definitions.

use async_trait::async_trait;

use crate::errors::StoreError;
use search_reindexer_shared::{Query, Row};

/// A read-only relational store.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Open a server-side cursor over `query`.
    ///
    /// The cursor runs inside its own read-only transaction, which is held
    /// until [`RowCursor::close`] is called.
    async fn open_cursor(&self, query: &Query) -> Result<Box<dyn RowCursor>, StoreError>;

    /// Run a query expected to return at most one row.
    async fn fetch_one(&self, query: &Query) -> Result<Option<Row>, StoreError>;
}

/// A backend-held position within a result set.
#[async_trait]
pub trait RowCursor: Send {
    /// Fetch up to `count` further rows. An empty result means the cursor is
    /// exhausted.
    async fn fetch(&mut self, count: usize) -> Result<Vec<Row>, StoreError>;

    /// Close the cursor and end its transaction. Calling it more than once is
    /// a no-op.
    async fn close(&mut self) -> Result<(), StoreError>;
}
