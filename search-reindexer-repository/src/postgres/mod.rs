//! Postgres implementation of the row store.
//!
//! Rows are streamed through a named server-side cursor declared inside a
//! read-only transaction, so the result set never has to fit in memory.

mod connection;
mod convert;
mod cursor;
mod params;
mod store;

pub use cursor::PostgresCursor;
pub use store::PostgresStore;
