//! OpenSearch implementation of the search engine client.
//!
//! This module provides a concrete implementation of `SearchEngineClient`
//! using OpenSearch as the backend.

mod client;
mod index_config;

pub use client::{OpenSearchClient, OpenSearchClientFactory};
pub use index_config::{get_mappings, IndexConfig, DEFAULT_INDEX_NAME};
