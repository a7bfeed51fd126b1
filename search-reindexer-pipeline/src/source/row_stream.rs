//! Lazy row stream over a server-side cursor.

use std::collections::VecDeque;

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::errors::PipelineError;
use search_reindexer_repository::{RowCursor, RowStore};
use search_reindexer_shared::{Query, Row};

/// Finite, non-restartable sequence of rows read through a cursor.
///
/// At most one fetch window is buffered at a time. Once the cursor returns a
/// short window the stream is exhausted and makes no further backend calls.
/// The owner must call [`RowStream::close`] on every exit path.
pub struct RowStream {
    cursor: Box<dyn RowCursor>,
    buffer: VecDeque<Row>,
    fetch_window: usize,
    exhausted: bool,
    closed: bool,
    cancel: CancellationToken,
}

impl RowStream {
    /// Open a cursor over `query`, fetching `fetch_window` rows per round trip.
    #[instrument(skip(store, query), fields(sql = %query.sql))]
    pub async fn open(
        store: &dyn RowStore,
        query: &Query,
        fetch_window: usize,
    ) -> Result<Self, PipelineError> {
        if fetch_window == 0 {
            return Err(PipelineError::config("fetch window must be at least 1"));
        }

        let cursor = store.open_cursor(query).await?;
        debug!(fetch_window, "Row stream opened");

        Ok(Self {
            cursor,
            buffer: VecDeque::new(),
            fetch_window,
            exhausted: false,
            closed: false,
            cancel: CancellationToken::new(),
        })
    }

    /// Abandon pending fetches when `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Next row, or `None` once the stream is exhausted or closed.
    pub async fn next(&mut self) -> Result<Option<Row>, PipelineError> {
        if let Some(row) = self.buffer.pop_front() {
            return Ok(Some(row));
        }
        if self.exhausted || self.closed {
            return Ok(None);
        }

        let fetched = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(PipelineError::Cancelled),
            result = self.cursor.fetch(self.fetch_window) => result,
        };

        let rows = match fetched {
            Ok(rows) => rows,
            Err(err) => {
                self.exhausted = true;
                return Err(err.into());
            }
        };

        if rows.len() < self.fetch_window {
            self.exhausted = true;
        }
        debug!(count = rows.len(), exhausted = self.exhausted, "Fetched window");

        self.buffer.extend(rows);
        Ok(self.buffer.pop_front())
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted && self.buffer.is_empty()
    }

    /// Release the cursor and its transaction. Safe to call more than once.
    pub async fn close(&mut self) -> Result<(), PipelineError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.buffer.clear();
        self.cursor.close().await?;
        debug!("Row stream closed");
        Ok(())
    }
}
