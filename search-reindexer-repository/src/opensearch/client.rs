//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchEngineClient`
//! using the OpenSearch Rust client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use opensearch::{
    cluster::ClusterHealthParts,
    http::{
        request::JsonBody,
        transport::{SingleNodeConnectionPool, TransportBuilder},
    },
    indices::{IndicesCreateParts, IndicesExistsParts, IndicesPutMappingParts},
    BulkParts, OpenSearch,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::errors::SearchError;
use crate::interfaces::{SearchClientFactory, SearchEngineClient};
use crate::opensearch::index_config::{get_mappings, IndexConfig};
use crate::types::{BulkIndexReport, BulkItemFailure};
use search_reindexer_shared::Document;

/// Default per-request timeout.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// OpenSearch client implementation.
///
/// # Example
///
/// ```ignore
/// use search_reindexer_repository::opensearch::IndexConfig;
/// let client = OpenSearchClient::new("http://localhost:9200", IndexConfig::default()).await?;
///
/// client.ensure_index_exists().await?;
/// let report = client.bulk_index(&documents).await?;
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
    index_config: IndexConfig,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    /// * `index_config` - The target index and its settings
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchError)` - If connection setup fails
    pub async fn new(url: &str, index_config: IndexConfig) -> Result<Self, SearchError> {
        Self::with_timeout(url, index_config, DEFAULT_REQUEST_TIMEOUT).await
    }

    /// Create a new OpenSearch client with a custom request timeout.
    pub async fn with_timeout(
        url: &str,
        index_config: IndexConfig,
        timeout: Duration,
    ) -> Result<Self, SearchError> {
        let parsed_url = Url::parse(url).map_err(|e| SearchError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            index = %index_config.name,
            "Created OpenSearch client"
        );

        Ok(Self {
            client,
            index_config,
        })
    }

    /// Build the newline-delimited bulk body: one action line followed by
    /// one source line per document.
    fn bulk_body(documents: &[Document]) -> Vec<JsonBody<Value>> {
        let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(documents.len() * 2);
        for doc in documents {
            body.push(json!({ "index": { "_index": doc.index, "_id": doc.id } }).into());
            body.push(Value::Object(doc.source.clone()).into());
        }
        body
    }

    /// Read per-item failures out of a bulk response body.
    fn parse_bulk_response(body: &Value, total: usize) -> Result<BulkIndexReport, SearchError> {
        let has_errors = body
            .get("errors")
            .and_then(Value::as_bool)
            .ok_or_else(|| SearchError::parse("bulk response is missing `errors`"))?;

        if !has_errors {
            return Ok(BulkIndexReport::accepted(total));
        }

        let items = body
            .get("items")
            .and_then(Value::as_array)
            .ok_or_else(|| SearchError::parse("bulk response is missing `items`"))?;

        let failures = items
            .iter()
            .filter_map(|item| item.as_object()?.values().next())
            .filter_map(|result| {
                let error = result.get("error")?;
                let reason = error
                    .get("reason")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| error.to_string());
                Some(BulkItemFailure {
                    document_id: result
                        .get("_id")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    status: result
                        .get("status")
                        .and_then(Value::as_u64)
                        .unwrap_or_default() as u16,
                    reason,
                })
            })
            .collect();

        Ok(BulkIndexReport { total, failures })
    }

    /// Map a transport failure. These never carry a usable response, so they
    /// are all treated as connection-level.
    fn transport_error(e: opensearch::Error) -> SearchError {
        if e.is_timeout() {
            SearchError::connection(format!("request timed out: {}", e))
        } else {
            SearchError::connection(e.to_string())
        }
    }
}

#[async_trait]
impl SearchEngineClient for OpenSearchClient {
    #[instrument(skip(self, documents), fields(count = documents.len()))]
    async fn bulk_index(&self, documents: &[Document]) -> Result<BulkIndexReport, SearchError> {
        if documents.is_empty() {
            return Ok(BulkIndexReport::accepted(0));
        }

        let response = self
            .client
            .bulk(BulkParts::None)
            .body(Self::bulk_body(documents))
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Bulk request failed");
            return Err(SearchError::from_status(status.as_u16(), error_body));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        let report = Self::parse_bulk_response(&body, documents.len())?;
        debug!(
            succeeded = report.succeeded(),
            failed = report.failures.len(),
            "Bulk request completed"
        );
        Ok(report)
    }

    async fn ensure_index_exists(&self) -> Result<(), SearchError> {
        let name = self.index_config.name.as_str();

        let exists = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[name]))
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = exists.status_code();
        if status.as_u16() == 404 {
            let response = self
                .client
                .indices()
                .create(IndicesCreateParts::Index(name))
                .body(self.index_config.index_settings())
                .send()
                .await
                .map_err(Self::transport_error)?;

            let status = response.status_code();
            if !status.is_success() {
                let error_body = response.text().await.unwrap_or_default();
                if status.as_u16() == 429 || status.as_u16() >= 500 {
                    return Err(SearchError::from_status(status.as_u16(), error_body));
                }
                return Err(SearchError::index_creation(format!(
                    "Create index failed with status {}: {}",
                    status, error_body
                )));
            }

            info!(index = %name, "Created search index");
            return Ok(());
        }

        if !status.is_success() {
            return Err(SearchError::from_status(
                status.as_u16(),
                "index existence check failed",
            ));
        }

        // Index already exists, bring its mappings up to date
        let response = self
            .client
            .indices()
            .put_mapping(IndicesPutMappingParts::Index(&[name]))
            .body(get_mappings())
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            if status.as_u16() == 429 || status.as_u16() >= 500 {
                return Err(SearchError::from_status(status.as_u16(), error_body));
            }
            return Err(SearchError::index_creation(format!(
                "Put mapping failed with status {}: {}",
                status, error_body
            )));
        }

        debug!(index = %name, "Updated search index mappings");
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(Self::transport_error)?;

        if !response.status_code().is_success() {
            warn!(status = %response.status_code(), "Cluster health request failed");
            return Ok(false);
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        let cluster_status = body["status"].as_str().unwrap_or("red");
        debug!(status = %cluster_status, "Cluster health");
        Ok(cluster_status != "red")
    }
}

/// Creates [`OpenSearchClient`]s for a fixed URL and index.
#[derive(Debug, Clone)]
pub struct OpenSearchClientFactory {
    url: String,
    index_config: IndexConfig,
    timeout: Duration,
}

impl OpenSearchClientFactory {
    pub fn new(url: impl Into<String>, index_config: IndexConfig) -> Self {
        Self {
            url: url.into(),
            index_config,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl SearchClientFactory for OpenSearchClientFactory {
    async fn connect(&self) -> Result<Arc<dyn SearchEngineClient>, SearchError> {
        let client =
            OpenSearchClient::with_timeout(&self.url, self.index_config.clone(), self.timeout)
                .await?;
        Ok(Arc::new(client))
    }
}
