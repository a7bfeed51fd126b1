use std::sync::Arc;

use async_trait::async_trait;
use search_reindexer_shared::{Query, Row};
use tokio_postgres::Client;
use tracing::info;

use super::connection::connect_client;
use super::convert::convert_row;
use super::cursor::PostgresCursor;
use super::params::PgParams;
use crate::errors::StoreError;
use crate::interfaces::{RowCursor, RowStore};

/// Row store backed by a single Postgres connection.
pub struct PostgresStore {
    client: Arc<Client>,
}

impl PostgresStore {
    /// Connect using a libpq-style url. `sslmode` in the url selects TLS behaviour.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = connect_client(url).await?;
        info!("Connected to Postgres");
        Ok(Self::from_client(client))
    }

    pub fn from_client(client: Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

#[async_trait]
impl RowStore for PostgresStore {
    async fn open_cursor(&self, query: &Query) -> Result<Box<dyn RowCursor>, StoreError> {
        if self.client.is_closed() {
            return Err(StoreError::connection("connection is closed"));
        }
        let cursor = PostgresCursor::declare(self.client.clone(), query).await?;
        Ok(Box::new(cursor))
    }

    async fn fetch_one(&self, query: &Query) -> Result<Option<Row>, StoreError> {
        if self.client.is_closed() {
            return Err(StoreError::connection("connection is closed"));
        }
        let params = PgParams::from_values(&query.params);
        let row = self
            .client
            .query_opt(query.sql.as_str(), &params.as_refs())
            .await?;

        row.map(|row| convert_row(&row, &query.fields)).transpose()
    }
}
