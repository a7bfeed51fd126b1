//! In-memory fakes of both backends, shared by the pipeline tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use search_reindexer_repository::{
    BulkIndexReport, BulkItemFailure, RowCursor, RowStore, SearchClientFactory, SearchEngineClient,
    SearchError, StoreError,
};
use search_reindexer_shared::{Document, FieldValue, Query, Row};

pub(crate) const INDEX: &str = "test-index";

pub(crate) fn fields() -> Arc<[String]> {
    vec!["id".to_string(), "identifier".to_string(), "title".to_string()].into()
}

/// Row with key `id` and identifier `name`.
pub(crate) fn row(id: i64, name: &str) -> Row {
    Row::new(
        fields(),
        vec![
            FieldValue::Int(id),
            FieldValue::from(name),
            FieldValue::from(format!("title {}", name)),
        ],
    )
}

pub(crate) fn rows(names: &[&str]) -> Vec<Row> {
    names
        .iter()
        .enumerate()
        .map(|(idx, name)| row(idx as i64, name))
        .collect()
}

pub(crate) fn query() -> Query {
    Query::new(
        "SELECT id, identifier, title FROM items",
        fields().iter().cloned().collect(),
    )
}

/// Store serving a fixed row list through cursors and a key map through lookups.
#[derive(Default)]
pub(crate) struct MockStore {
    rows: Vec<Row>,
    by_key: BTreeMap<i64, Row>,
    fail_fetch_at: Option<usize>,
    pub fetch_calls: Arc<AtomicUsize>,
    pub cursor_closed: Arc<AtomicBool>,
    pub cursors_opened: AtomicUsize,
    pub lookups: AtomicUsize,
}

impl MockStore {
    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    pub fn with_keys(keys: &[i64]) -> Self {
        let by_key = keys
            .iter()
            .map(|key| (*key, row(*key, &format!("doc{}", key))))
            .collect();
        Self {
            by_key,
            ..Default::default()
        }
    }

    /// Fail the `n`th fetch (zero based) with a connection error.
    pub fn failing_fetch_at(mut self, n: usize) -> Self {
        self.fail_fetch_at = Some(n);
        self
    }

    pub fn closed(&self) -> bool {
        self.cursor_closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RowStore for MockStore {
    async fn open_cursor(&self, _query: &Query) -> Result<Box<dyn RowCursor>, StoreError> {
        self.cursors_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockCursor {
            rows: self.rows.clone().into(),
            fail_fetch_at: self.fail_fetch_at,
            fetch_calls: self.fetch_calls.clone(),
            closed: self.cursor_closed.clone(),
        }))
    }

    async fn fetch_one(&self, query: &Query) -> Result<Option<Row>, StoreError> {
        if query.fields.len() == 1 && query.fields[0] == "max_key" {
            let max = self
                .by_key
                .keys()
                .next_back()
                .map(|key| FieldValue::Int(*key))
                .unwrap_or(FieldValue::Null);
            return Ok(Some(Row::new(query.fields.clone(), vec![max])));
        }

        self.lookups.fetch_add(1, Ordering::SeqCst);
        let key = query.params.first().and_then(FieldValue::as_i64);
        Ok(key.and_then(|key| self.by_key.get(&key).cloned()))
    }
}

struct MockCursor {
    rows: std::collections::VecDeque<Row>,
    fail_fetch_at: Option<usize>,
    fetch_calls: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl RowCursor for MockCursor {
    async fn fetch(&mut self, count: usize) -> Result<Vec<Row>, StoreError> {
        let call = self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch_at == Some(call) {
            return Err(StoreError::connection("server closed the connection"));
        }
        let take = count.min(self.rows.len());
        Ok(self.rows.drain(..take).collect())
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Search client recording every accepted batch by document id.
#[derive(Default)]
pub(crate) struct MockSearchClient {
    pub batches: Mutex<Vec<Vec<String>>>,
    pub bulk_calls: AtomicUsize,
    pub index_checks: AtomicUsize,
    connection_failures: AtomicUsize,
    reject_ids: Vec<String>,
    reject_request: Option<u16>,
    hang: bool,
}

impl MockSearchClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `n` bulk calls with a connection error.
    pub fn failing(n: usize) -> Self {
        Self {
            connection_failures: AtomicUsize::new(n),
            ..Default::default()
        }
    }

    /// Report the given ids as item level failures.
    pub fn rejecting(ids: &[&str]) -> Self {
        Self {
            reject_ids: ids.iter().map(|id| id.to_string()).collect(),
            ..Default::default()
        }
    }

    /// Refuse every bulk request with `status`.
    pub fn refusing(status: u16) -> Self {
        Self {
            reject_request: Some(status),
            ..Default::default()
        }
    }

    /// Fail the next `n` bulk calls with a connection error before behaving
    /// as configured.
    pub fn with_connection_failures(self, n: usize) -> Self {
        Self {
            connection_failures: AtomicUsize::new(n),
            ..self
        }
    }

    /// Never complete a bulk call.
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Default::default()
        }
    }

    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchEngineClient for MockSearchClient {
    async fn bulk_index(&self, documents: &[Document]) -> Result<BulkIndexReport, SearchError> {
        self.bulk_calls.fetch_add(1, Ordering::SeqCst);

        if self.hang {
            std::future::pending::<()>().await;
        }

        let remaining = self.connection_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.connection_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(SearchError::connection("connection refused"));
        }

        if let Some(status) = self.reject_request {
            return Err(SearchError::rejected(status, "mapper_parsing_exception"));
        }

        self.batches
            .lock()
            .unwrap()
            .push(documents.iter().map(|doc| doc.id.clone()).collect());

        let failures = documents
            .iter()
            .filter(|doc| self.reject_ids.contains(&doc.id))
            .map(|doc| BulkItemFailure {
                document_id: doc.id.clone(),
                status: 400,
                reason: "failed to parse field".to_string(),
            })
            .collect();

        Ok(BulkIndexReport {
            total: documents.len(),
            failures,
        })
    }

    async fn ensure_index_exists(&self) -> Result<(), SearchError> {
        self.index_checks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        Ok(true)
    }
}

/// Factory handing out the same shared client and counting reconnects.
pub(crate) struct MockFactory {
    pub client: Arc<MockSearchClient>,
    pub connects: AtomicUsize,
}

impl MockFactory {
    pub fn new(client: MockSearchClient) -> Arc<Self> {
        Arc::new(Self {
            client: Arc::new(client),
            connects: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl SearchClientFactory for MockFactory {
    async fn connect(&self) -> Result<Arc<dyn SearchEngineClient>, SearchError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(self.client.clone())
    }
}
