//! Environment configuration for the reindexer.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::logging::LogFormat;
use crate::IndexingError;
use search_reindexer_pipeline::{Backoff, RetryPolicy};
use search_reindexer_repository::opensearch::DEFAULT_INDEX_NAME;
use search_reindexer_shared::SourceTable;

/// Default Postgres connection string.
const DEFAULT_DATABASE_URL: &str = "postgres://postgres@localhost:5432/openledger";

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

const DEFAULT_SOURCE_TABLE: &str = "imageledger_image";
const DEFAULT_KEY_COLUMN: &str = "id";
const DEFAULT_ID_COLUMN: &str = "identifier";
const DEFAULT_FILTER: &str = "removed_from_source = false";
const DEFAULT_ORDER_BY: &str = "last_synced_with_source DESC";

const DEFAULT_COLUMNS: &[&str] = &[
    "id",
    "identifier",
    "title",
    "creator",
    "creator_url",
    "tags_list",
    "url",
    "thumbnail",
    "provider",
    "source",
    "license",
    "license_version",
    "foreign_landing_url",
    "created_on",
    "last_synced_with_source",
    "removed_from_source",
];

/// Upper bound on the exponential wait when `RETRY_MAX_WAIT_SECS` is unset.
const DEFAULT_RETRY_MAX_WAIT_SECS: u64 = 60;

/// Per-request timeout of the search client.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Settings read once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub opensearch_url: String,
    pub index_name: String,
    pub source_table: String,
    pub key_column: String,
    pub id_column: String,
    pub columns: Vec<String>,
    pub excluded_columns: Vec<String>,
    pub filter: Option<String>,
    pub order_by: Option<String>,
    pub retry: RetryPolicy,
    pub request_timeout: Duration,
    pub log_format: LogFormat,
}

impl Settings {
    /// Read settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `DATABASE_URL`: Postgres connection string
    ///   (default: postgres://postgres@localhost:5432/openledger)
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `OPENSEARCH_TIMEOUT_SECS`: Per-request timeout (default: 30)
    /// - `INDEX_NAME`: Target index (default: openledger)
    /// - `SOURCE_TABLE`: Table to read (default: imageledger_image)
    /// - `SOURCE_KEY_COLUMN`, `SOURCE_ID_COLUMN`: Integer key and document id columns
    /// - `SOURCE_COLUMNS`: Comma separated projection
    /// - `SOURCE_EXCLUDE_COLUMNS`: Projected columns left out of the document body
    /// - `SOURCE_FILTER`: Row predicate, empty for none (default: removed_from_source = false)
    /// - `SOURCE_ORDER_BY`: Ordering of the cursor query, empty for none
    /// - `MAX_CONNECTION_RETRIES` (default: 10), `RETRY_WAIT_SECS` (default: 5)
    /// - `RETRY_BACKOFF`: `fixed` or `exponential`, `RETRY_MAX_WAIT_SECS` caps the latter
    /// - `LOG_FORMAT`: `text` or `json`
    pub fn from_env() -> Result<Self, IndexingError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let columns = match lookup("SOURCE_COLUMNS") {
            Some(raw) => parse_columns(&raw),
            None => DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect(),
        };
        if columns.is_empty() {
            return Err(IndexingError::config("SOURCE_COLUMNS must name at least one column"));
        }

        let id_column = get("SOURCE_ID_COLUMN", DEFAULT_ID_COLUMN);
        if !columns.contains(&id_column) {
            return Err(IndexingError::config(format!(
                "SOURCE_ID_COLUMN `{}` is not in SOURCE_COLUMNS",
                id_column
            )));
        }

        let excluded_columns = lookup("SOURCE_EXCLUDE_COLUMNS")
            .map(|raw| parse_columns(&raw))
            .unwrap_or_default();
        if let Some(column) = excluded_columns.iter().find(|c| !columns.contains(c)) {
            return Err(IndexingError::config(format!(
                "SOURCE_EXCLUDE_COLUMNS `{}` is not in SOURCE_COLUMNS",
                column
            )));
        }

        let max_retries = parse_number::<u32>(&lookup, "MAX_CONNECTION_RETRIES", 10)?;
        let retry_wait = parse_number::<u64>(&lookup, "RETRY_WAIT_SECS", 5)?;
        let backoff = match get("RETRY_BACKOFF", "fixed").to_lowercase().as_str() {
            "fixed" => Backoff::Fixed,
            "exponential" => Backoff::Exponential {
                max_wait: Duration::from_secs(parse_number::<u64>(
                    &lookup,
                    "RETRY_MAX_WAIT_SECS",
                    DEFAULT_RETRY_MAX_WAIT_SECS,
                )?),
            },
            other => {
                return Err(IndexingError::config(format!(
                    "RETRY_BACKOFF must be `fixed` or `exponential`, got `{}`",
                    other
                )))
            }
        };

        let request_timeout =
            parse_number::<u64>(&lookup, "OPENSEARCH_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;

        let log_format = get("LOG_FORMAT", "text")
            .parse::<LogFormat>()
            .map_err(IndexingError::config)?;

        Ok(Self {
            database_url: get("DATABASE_URL", DEFAULT_DATABASE_URL),
            opensearch_url: get("OPENSEARCH_URL", DEFAULT_OPENSEARCH_URL),
            index_name: get("INDEX_NAME", DEFAULT_INDEX_NAME),
            source_table: get("SOURCE_TABLE", DEFAULT_SOURCE_TABLE),
            key_column: get("SOURCE_KEY_COLUMN", DEFAULT_KEY_COLUMN),
            id_column,
            columns,
            excluded_columns,
            filter: non_empty(get("SOURCE_FILTER", DEFAULT_FILTER)),
            order_by: non_empty(get("SOURCE_ORDER_BY", DEFAULT_ORDER_BY)),
            retry: RetryPolicy::new(max_retries, Duration::from_secs(retry_wait))
                .with_backoff(backoff),
            request_timeout: Duration::from_secs(request_timeout),
            log_format,
        })
    }

    /// Table description the queries are built from.
    pub fn source(&self) -> SourceTable {
        let mut source = SourceTable::new(
            self.source_table.clone(),
            self.key_column.clone(),
            self.columns.clone(),
        );
        if let Some(filter) = &self.filter {
            source = source.with_predicate(filter.clone());
        }
        if let Some(order_by) = &self.order_by {
            source = source.with_order_by(order_by.clone());
        }
        source
    }
}

fn parse_columns(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_number<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, IndexingError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| IndexingError::config(format!("{} is invalid: {}", key, e))),
        None => Ok(default),
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, IndexingError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = settings(&[]).unwrap();

        assert_eq!(settings.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(settings.opensearch_url, DEFAULT_OPENSEARCH_URL);
        assert_eq!(settings.index_name, "openledger");
        assert_eq!(settings.columns.len(), DEFAULT_COLUMNS.len());
        assert_eq!(settings.retry, RetryPolicy::default());
        assert_eq!(settings.log_format, LogFormat::Text);
        assert_eq!(settings.request_timeout, Duration::from_secs(30));
        assert_eq!(settings.filter.as_deref(), Some("removed_from_source = false"));
    }

    #[test]
    fn test_overrides() {
        let settings = settings(&[
            ("SOURCE_COLUMNS", "id, identifier ,title"),
            ("SOURCE_EXCLUDE_COLUMNS", "id"),
            ("SOURCE_FILTER", ""),
            ("MAX_CONNECTION_RETRIES", "3"),
            ("RETRY_WAIT_SECS", "1"),
            ("RETRY_BACKOFF", "exponential"),
            ("LOG_FORMAT", "json"),
        ])
        .unwrap();

        assert_eq!(settings.columns, vec!["id", "identifier", "title"]);
        assert_eq!(settings.excluded_columns, vec!["id"]);
        assert!(settings.filter.is_none());
        assert_eq!(settings.retry.max_retries, 3);
        assert_eq!(settings.retry.retry_wait, Duration::from_secs(1));
        assert_eq!(
            settings.retry.backoff,
            Backoff::Exponential {
                max_wait: Duration::from_secs(60)
            }
        );
        assert_eq!(settings.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            settings(&[("MAX_CONNECTION_RETRIES", "many")]),
            Err(IndexingError::ConfigError(_))
        ));
        assert!(matches!(
            settings(&[("RETRY_BACKOFF", "random")]),
            Err(IndexingError::ConfigError(_))
        ));
        assert!(matches!(
            settings(&[("SOURCE_COLUMNS", "id,title")]),
            Err(IndexingError::ConfigError(_))
        ));
        assert!(matches!(
            settings(&[("SOURCE_EXCLUDE_COLUMNS", "thumbnail,missing")]),
            Err(IndexingError::ConfigError(_))
        ));
    }

    #[test]
    fn test_source_queries_use_settings() {
        let query = settings(&[]).unwrap().source().scan_query();

        assert!(query.sql.contains("FROM \"imageledger_image\""));
        assert!(query.sql.contains("WHERE removed_from_source = false"));
        assert!(query.sql.ends_with("ORDER BY last_synced_with_source DESC"));
    }
}
