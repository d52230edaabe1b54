//! Storage traits and error types
//!
//! This module defines the trait interface for the login flow's external
//! collaborators and the associated error types.

use crate::page::Page;
use crate::storage::OutputRecord;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable store of named configuration blobs
pub trait ConfigStore {
    /// Reads the blob stored under `key`, if any
    fn find_config(&self, key: &str) -> StorageResult<Option<Map<String, Value>>>;

    /// Writes (replaces) the blob stored under `key`
    fn save_config(&self, key: &str, data: &Map<String, Value>) -> StorageResult<()>;
}

/// Durable, paginated output collections
///
/// Records are routed by their own `collection` and `id`; saving a record
/// whose id already exists in its collection replaces the stored data.
pub trait OutputStore {
    /// Queries one page of records whose top-level fields equal `filter`
    ///
    /// # Arguments
    ///
    /// * `collection` - Collection to query
    /// * `filter` - Field equality filter applied to each record's data
    /// * `page` - 1-based page index
    /// * `per_page` - Page size
    ///
    /// # Returns
    ///
    /// The records of the requested page in insertion order; an empty vector
    /// once the page index runs past the matching records.
    fn find_outputs(
        &self,
        collection: &str,
        filter: &Map<String, Value>,
        page: u32,
        per_page: u32,
    ) -> StorageResult<Vec<OutputRecord>>;

    /// Gets a single record by id
    fn find_output(&self, collection: &str, id: &str) -> StorageResult<Option<OutputRecord>>;

    /// Counts the records of a collection matching `filter`
    fn count_outputs(&self, collection: &str, filter: &Map<String, Value>) -> StorageResult<u64>;

    /// Upserts records into their collections
    fn save(&self, records: &[OutputRecord]) -> StorageResult<()>;
}

/// Submits pages to the crawl engine for (re)fetching
pub trait FetchQueue {
    fn enqueue(&mut self, pages: &[Page]) -> StorageResult<()>;
}

impl FetchQueue for Vec<Page> {
    fn enqueue(&mut self, pages: &[Page]) -> StorageResult<()> {
        self.extend_from_slice(pages);
        Ok(())
    }
}
