//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the configuration
//! store, the output store, and the fetch queue.

use crate::page::Page;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ConfigStore, FetchQueue, OutputStore, StorageError, StorageResult};
use crate::storage::OutputRecord;
use chrono::Utc;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde_json::{Map, Value};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Creates a new SqliteStore instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 5000;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Gets every page submitted to the fetch queue, oldest first
    pub fn queued_pages(&self) -> StorageResult<Vec<Page>> {
        let mut stmt = self
            .conn
            .prepare("SELECT page FROM fetch_queue ORDER BY id ASC")?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut pages = Vec::with_capacity(rows.len());
        for row in rows {
            pages.push(serde_json::from_str(&row)?);
        }
        Ok(pages)
    }

    /// Counts the pages in the fetch queue
    pub fn count_queued(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM fetch_queue", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

/// Builds the `AND ...` clause and bound values for an equality filter
fn filter_clause(filter: &Map<String, Value>) -> StorageResult<(String, Vec<SqlValue>)> {
    let mut clause = String::new();
    let mut values = Vec::new();

    for (key, value) in filter {
        if key.contains('"') {
            return Err(StorageError::InvalidFilter(format!(
                "field name cannot contain quotes: {}",
                key
            )));
        }
        let path = SqlValue::Text(format!("$.\"{}\"", key));

        let bound = match value {
            Value::Null => {
                clause.push_str(" AND json_extract(data, ?) IS NULL");
                values.push(path);
                continue;
            }
            Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => SqlValue::Integer(i),
                (None, Some(f)) => SqlValue::Real(f),
                (None, None) => {
                    return Err(StorageError::InvalidFilter(format!(
                        "unsupported number for {}: {}",
                        key, n
                    )))
                }
            },
            Value::String(s) => SqlValue::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => {
                return Err(StorageError::InvalidFilter(format!(
                    "only scalar values can be filtered on, got {} for {}",
                    value, key
                )))
            }
        };

        clause.push_str(" AND json_extract(data, ?) = ?");
        values.push(path);
        values.push(bound);
    }

    Ok((clause, values))
}

fn decode_blob(text: &str) -> StorageResult<Map<String, Value>> {
    Ok(serde_json::from_str(text)?)
}

impl ConfigStore for SqliteStore {
    fn find_config(&self, key: &str) -> StorageResult<Option<Map<String, Value>>> {
        let data: Option<String> = self
            .conn
            .query_row(
                "SELECT data FROM app_config WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        data.as_deref().map(decode_blob).transpose()
    }

    fn save_config(&self, key: &str, data: &Map<String, Value>) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let data = serde_json::to_string(data)?;
        self.conn.execute(
            "INSERT INTO app_config (key, data, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
            params![key, data, now],
        )?;
        Ok(())
    }
}

impl OutputStore for SqliteStore {
    fn find_outputs(
        &self,
        collection: &str,
        filter: &Map<String, Value>,
        page: u32,
        per_page: u32,
    ) -> StorageResult<Vec<OutputRecord>> {
        let (clause, filter_values) = filter_clause(filter)?;
        let offset = i64::from(page.max(1) - 1) * i64::from(per_page);

        let sql = format!(
            "SELECT collection, id, data FROM outputs WHERE collection = ?{}
             ORDER BY seq ASC LIMIT ? OFFSET ?",
            clause
        );

        let mut values = Vec::with_capacity(filter_values.len() + 3);
        values.push(SqlValue::Text(collection.to_string()));
        values.extend(filter_values);
        values.push(SqlValue::Integer(i64::from(per_page)));
        values.push(SqlValue::Integer(offset));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(collection, id, data)| {
                Ok(OutputRecord {
                    collection,
                    id,
                    data: decode_blob(&data)?,
                })
            })
            .collect()
    }

    fn find_output(&self, collection: &str, id: &str) -> StorageResult<Option<OutputRecord>> {
        let data: Option<String> = self
            .conn
            .query_row(
                "SELECT data FROM outputs WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| row.get(0),
            )
            .optional()?;

        match data {
            Some(data) => Ok(Some(OutputRecord {
                collection: collection.to_string(),
                id: id.to_string(),
                data: decode_blob(&data)?,
            })),
            None => Ok(None),
        }
    }

    fn count_outputs(&self, collection: &str, filter: &Map<String, Value>) -> StorageResult<u64> {
        let (clause, filter_values) = filter_clause(filter)?;
        let sql = format!(
            "SELECT COUNT(*) FROM outputs WHERE collection = ?{}",
            clause
        );

        let mut values = Vec::with_capacity(filter_values.len() + 1);
        values.push(SqlValue::Text(collection.to_string()));
        values.extend(filter_values);

        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(values), |row| row.get(0))?;
        Ok(count as u64)
    }

    fn save(&self, records: &[OutputRecord]) -> StorageResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let now = Utc::now().to_rfc3339();
        let tx = self.conn.unchecked_transaction()?;
        for record in records {
            let data = serde_json::to_string(&record.data)?;
            tx.execute(
                "INSERT INTO outputs (collection, id, data, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)
                 ON CONFLICT(collection, id) DO UPDATE SET data = excluded.data,
                 updated_at = excluded.updated_at",
                params![record.collection, record.id, data, now],
            )?;
        }
        tx.commit()?;

        Ok(())
    }
}

impl FetchQueue for SqliteStore {
    fn enqueue(&mut self, pages: &[Page]) -> StorageResult<()> {
        if pages.is_empty() {
            return Ok(());
        }

        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        for page in pages {
            let text = serde_json::to_string(page)?;
            tx.execute(
                "INSERT INTO fetch_queue (gid, page, enqueued_at) VALUES (?1, ?2, ?3)",
                params![page.gid(), text, now],
            )?;
        }
        tx.commit()?;

        Ok(())
    }
}
