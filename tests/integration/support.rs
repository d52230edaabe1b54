//! Shared fixtures for the integration tests

use login_flow::storage::{OutputRecord, StorageError, StorageResult};
use login_flow::{ConfigStore, LoginFlow, OutputStore, Page, SqliteStore};
use serde_json::{json, Map, Value};
use std::cell::{Cell, RefCell};
use std::sync::Arc;

pub const COLLECTION: &str = "login_flow_held_pages";

pub fn page(value: Value) -> Page {
    Page::from_value(value).expect("test page must be a JSON object")
}

pub fn blob(value: Value) -> Map<String, Value> {
    value
        .as_object()
        .cloned()
        .expect("test blob must be a JSON object")
}

/// Creates an in-memory store seeded with the given flow config
pub fn store_with_config(config: Value) -> Arc<SqliteStore> {
    let store = Arc::new(SqliteStore::new_in_memory().expect("Failed to open store"));
    store
        .save_config("login_flow", &blob(config))
        .expect("Failed to seed config");
    store
}

pub fn flow_over<S>(store: Arc<S>, per_page: u32) -> LoginFlow
where
    S: ConfigStore + OutputStore + 'static,
{
    LoginFlow::builder()
        .store(store)
        .per_page(per_page)
        .build()
        .expect("Failed to build flow")
}

/// Held records for pages `0..count`, all pending
pub fn held_records(count: usize) -> Vec<OutputRecord> {
    (0..count)
        .map(|i| {
            OutputRecord::new(COLLECTION, format!("page-{}", i))
                .with(
                    "page",
                    json!({
                        "url": format!("https://example.com/items/{}", i),
                        "vars": {"login_flow_cookie": "s=AAA"}
                    }),
                )
                .with("fetched", json!("0"))
        })
        .collect()
}

/// Store wrapper recording every `find_outputs` call
pub struct CountingStore {
    pub inner: SqliteStore,
    pub queries: RefCell<Vec<(u32, usize)>>,
}

impl CountingStore {
    pub fn new(inner: SqliteStore) -> Self {
        Self {
            inner,
            queries: RefCell::new(Vec::new()),
        }
    }
}

impl ConfigStore for CountingStore {
    fn find_config(&self, key: &str) -> StorageResult<Option<Map<String, Value>>> {
        self.inner.find_config(key)
    }

    fn save_config(&self, key: &str, data: &Map<String, Value>) -> StorageResult<()> {
        self.inner.save_config(key, data)
    }
}

impl OutputStore for CountingStore {
    fn find_outputs(
        &self,
        collection: &str,
        filter: &Map<String, Value>,
        page: u32,
        per_page: u32,
    ) -> StorageResult<Vec<OutputRecord>> {
        let records = self.inner.find_outputs(collection, filter, page, per_page)?;
        self.queries.borrow_mut().push((page, records.len()));
        Ok(records)
    }

    fn find_output(&self, collection: &str, id: &str) -> StorageResult<Option<OutputRecord>> {
        self.inner.find_output(collection, id)
    }

    fn count_outputs(&self, collection: &str, filter: &Map<String, Value>) -> StorageResult<u64> {
        self.inner.count_outputs(collection, filter)
    }

    fn save(&self, records: &[OutputRecord]) -> StorageResult<()> {
        self.inner.save(records)
    }
}

/// Store wrapper whose output writes only land on `flush`
pub struct DeferredStore {
    pub inner: SqliteStore,
    pending: RefCell<Vec<OutputRecord>>,
}

impl DeferredStore {
    pub fn new(inner: SqliteStore) -> Self {
        Self {
            inner,
            pending: RefCell::new(Vec::new()),
        }
    }

    pub fn flush(&self) -> StorageResult<()> {
        let records: Vec<_> = self.pending.borrow_mut().drain(..).collect();
        self.inner.save(&records)
    }
}

impl ConfigStore for DeferredStore {
    fn find_config(&self, key: &str) -> StorageResult<Option<Map<String, Value>>> {
        self.inner.find_config(key)
    }

    fn save_config(&self, key: &str, data: &Map<String, Value>) -> StorageResult<()> {
        self.inner.save_config(key, data)
    }
}

impl OutputStore for DeferredStore {
    fn find_outputs(
        &self,
        collection: &str,
        filter: &Map<String, Value>,
        page: u32,
        per_page: u32,
    ) -> StorageResult<Vec<OutputRecord>> {
        self.inner.find_outputs(collection, filter, page, per_page)
    }

    fn find_output(&self, collection: &str, id: &str) -> StorageResult<Option<OutputRecord>> {
        self.inner.find_output(collection, id)
    }

    fn count_outputs(&self, collection: &str, filter: &Map<String, Value>) -> StorageResult<u64> {
        self.inner.count_outputs(collection, filter)
    }

    fn save(&self, records: &[OutputRecord]) -> StorageResult<()> {
        self.pending.borrow_mut().extend_from_slice(records);
        Ok(())
    }
}

/// Store wrapper whose output writes fail while `fail_saves` is set
pub struct FlakyStore {
    pub inner: SqliteStore,
    pub fail_saves: Cell<bool>,
}

impl FlakyStore {
    pub fn new(inner: SqliteStore) -> Self {
        Self {
            inner,
            fail_saves: Cell::new(false),
        }
    }
}

fn busy_error() -> StorageError {
    StorageError::Sqlite(rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
        Some("database is locked".to_string()),
    ))
}

impl ConfigStore for FlakyStore {
    fn find_config(&self, key: &str) -> StorageResult<Option<Map<String, Value>>> {
        self.inner.find_config(key)
    }

    fn save_config(&self, key: &str, data: &Map<String, Value>) -> StorageResult<()> {
        self.inner.save_config(key, data)
    }
}

impl OutputStore for FlakyStore {
    fn find_outputs(
        &self,
        collection: &str,
        filter: &Map<String, Value>,
        page: u32,
        per_page: u32,
    ) -> StorageResult<Vec<OutputRecord>> {
        self.inner.find_outputs(collection, filter, page, per_page)
    }

    fn find_output(&self, collection: &str, id: &str) -> StorageResult<Option<OutputRecord>> {
        self.inner.find_output(collection, id)
    }

    fn count_outputs(&self, collection: &str, filter: &Map<String, Value>) -> StorageResult<u64> {
        self.inner.count_outputs(collection, filter)
    }

    fn save(&self, records: &[OutputRecord]) -> StorageResult<()> {
        if self.fail_saves.get() {
            return Err(busy_error());
        }
        self.inner.save(records)
    }
}
