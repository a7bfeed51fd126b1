//! Relational store error types.

use thiserror::Error;

/// All errors coming from the relational store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Could not connect to the database.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Any error reported by the Postgres driver.
    #[error("SQL error: {0}")]
    Sql(#[from] tokio_postgres::Error),

    /// A column had a type that cannot be mapped to a field value.
    #[error("Unsupported type `{type_name}` for column `{column}`")]
    UnsupportedType { column: String, type_name: String },

    /// The driver returned a different number of columns than the query projects.
    #[error("Query projects {expected} fields but the row has {actual} columns")]
    ColumnMismatch { expected: usize, actual: usize },

    /// A fetch was attempted on a cursor that has already been closed.
    #[error("Cursor `{0}` is closed")]
    CursorClosed(String),

    /// TLS setup failed.
    #[error("TLS error: {0}")]
    Tls(#[from] native_tls::Error),
}

impl StoreError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }
}
