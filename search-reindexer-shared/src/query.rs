//! Read-only queries against the source table.

use std::sync::Arc;

use crate::value::FieldValue;

/// A parameterized read-only statement and the fields it projects.
///
/// `fields` is in the same order as the columns the statement returns.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub sql: String,
    pub params: Vec<FieldValue>,
    pub fields: Arc<[String]>,
}

impl Query {
    pub fn new(sql: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
            fields: Arc::from(fields),
        }
    }

    /// Append a positional parameter (`$1`, `$2`, ... in order of binding).
    pub fn bind(mut self, value: impl Into<FieldValue>) -> Self {
        self.params.push(value.into());
        self
    }
}

/// Description of the table being reindexed.
///
/// Builds the statements each extraction strategy needs: a full ordered scan
/// for the streaming cursor, a primary key lookup for the key-range scan, and
/// a probe of the largest key in use.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTable {
    /// Table name.
    pub table: String,
    /// Dense integer primary key column.
    pub key_column: String,
    /// Projected columns, in output order.
    pub columns: Vec<String>,
    /// Raw SQL predicate selecting rows that should be indexed.
    pub predicate: Option<String>,
    /// Raw SQL ordering expression for the full scan.
    pub order_by: Option<String>,
}

impl SourceTable {
    pub fn new(
        table: impl Into<String>,
        key_column: impl Into<String>,
        columns: Vec<String>,
    ) -> Self {
        Self {
            table: table.into(),
            key_column: key_column.into(),
            columns,
            predicate: None,
            order_by: None,
        }
    }

    pub fn with_predicate(mut self, predicate: impl Into<String>) -> Self {
        self.predicate = Some(predicate.into());
        self
    }

    pub fn with_order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    /// Statement selecting every indexable row, in indexing order.
    pub fn scan_query(&self) -> Query {
        let mut sql = format!("SELECT {} FROM {}", self.select_list(), quote_ident(&self.table));
        if let Some(predicate) = &self.predicate {
            sql.push_str(&format!(" WHERE {}", predicate));
        }
        if let Some(order_by) = &self.order_by {
            sql.push_str(&format!(" ORDER BY {}", order_by));
        }
        Query::new(sql, self.columns.clone())
    }

    /// Statement fetching the row with the given key, if it is indexable.
    pub fn lookup_query(&self, key: i64) -> Query {
        let mut sql = format!(
            "SELECT {} FROM {} WHERE {} = $1::bigint",
            self.select_list(),
            quote_ident(&self.table),
            quote_ident(&self.key_column)
        );
        if let Some(predicate) = &self.predicate {
            sql.push_str(&format!(" AND ({})", predicate));
        }
        Query::new(sql, self.columns.clone()).bind(key)
    }

    /// Statement returning the largest key in the table as a single `max_key` column.
    pub fn max_key_query(&self) -> Query {
        let sql = format!(
            "SELECT MAX({})::bigint AS max_key FROM {}",
            quote_ident(&self.key_column),
            quote_ident(&self.table)
        );
        Query::new(sql, vec!["max_key".to_string()])
    }

    fn select_list(&self) -> String {
        self.columns
            .iter()
            .map(|column| quote_ident(column))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Quote an SQL identifier, doubling embedded quotes.
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
