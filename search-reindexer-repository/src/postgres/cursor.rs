use std::sync::Arc;

use async_trait::async_trait;
use search_reindexer_shared::{Query, Row};
use tokio::runtime::Handle;
use tokio_postgres::Client;
use tracing::{debug, warn};
use uuid::Uuid;

use super::convert::convert_row;
use super::params::PgParams;
use crate::errors::StoreError;
use crate::interfaces::RowCursor;

/// Server-side cursor over a single query.
///
/// The cursor lives inside its own `READ ONLY` transaction. Closing commits
/// that transaction; dropping an open cursor rolls it back in the background.
pub struct PostgresCursor {
    client: Arc<Client>,
    name: String,
    fields: Arc<[String]>,
    open: bool,
}

impl PostgresCursor {
    pub(crate) async fn declare(client: Arc<Client>, query: &Query) -> Result<Self, StoreError> {
        let name = format!("reindex_cursor_{}", Uuid::new_v4().simple());

        client.batch_execute("BEGIN READ ONLY").await?;

        let params = PgParams::from_values(&query.params);
        let statement = format!("DECLARE {} NO SCROLL CURSOR FOR {}", name, query.sql);
        if let Err(err) = client.execute(statement.as_str(), &params.as_refs()).await {
            if let Err(rollback) = client.batch_execute("ROLLBACK").await {
                warn!(%rollback, "Failed to roll back after cursor declaration error");
            }
            return Err(err.into());
        }

        debug!(cursor = %name, "Declared cursor");

        Ok(Self {
            client,
            name,
            fields: query.fields.clone(),
            open: true,
        })
    }
}

#[async_trait]
impl RowCursor for PostgresCursor {
    async fn fetch(&mut self, count: usize) -> Result<Vec<Row>, StoreError> {
        if !self.open {
            return Err(StoreError::CursorClosed(self.name.clone()));
        }

        let count = i64::try_from(count).unwrap_or(i64::MAX);
        let statement = format!("FETCH FORWARD {} FROM {}", count, self.name);
        let rows = self.client.query(statement.as_str(), &[]).await?;

        rows.iter()
            .map(|row| convert_row(row, &self.fields))
            .collect()
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        if !self.open {
            return Ok(());
        }
        self.open = false;

        let statement = format!("CLOSE {}; COMMIT", self.name);
        match self.client.batch_execute(&statement).await {
            Ok(()) => {
                debug!(cursor = %self.name, "Closed cursor");
                Ok(())
            }
            Err(err) => {
                // An aborted transaction rejects CLOSE; rolling back releases the cursor.
                debug!(cursor = %self.name, %err, "Cursor close failed, rolling back");
                self.client.batch_execute("ROLLBACK").await?;
                Ok(())
            }
        }
    }
}

impl Drop for PostgresCursor {
    fn drop(&mut self) {
        if !self.open {
            return;
        }

        warn!(cursor = %self.name, "Cursor dropped without close, rolling back");
        if let Ok(handle) = Handle::try_current() {
            let client = self.client.clone();
            handle.spawn(async move {
                if let Err(err) = client.batch_execute("ROLLBACK").await {
                    warn!(%err, "Background rollback failed");
                }
            });
        }
    }
}
