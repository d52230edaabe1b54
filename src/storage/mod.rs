//! Storage module for the login flow's collaborators
//!
//! This module defines the stores the flow talks to, and a SQLite backend
//! implementing all of them:
//! - Configuration store (named JSON blobs)
//! - Output store (paginated, filterable collections with upsert by id)
//! - Fetch queue (pages submitted for fetching)

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{ConfigStore, FetchQueue, OutputStore, StorageError, StorageResult};

use serde_json::{Map, Value};
use std::path::Path;

/// Opens or creates a SQLite store at the given path
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStore)` - Successfully opened store
/// * `Err(StorageError)` - Failed to open or initialize the database
pub fn open_store(path: &Path) -> StorageResult<SqliteStore> {
    SqliteStore::new(path)
}

/// A record in a named output collection
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord {
    pub collection: String,
    pub id: String,
    pub data: Map<String, Value>,
}

impl OutputRecord {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
            data: Map::new(),
        }
    }

    /// Sets a data field, returning the record for chaining
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }
}
