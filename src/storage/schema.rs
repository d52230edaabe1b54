//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the login flow store.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Named configuration blobs
CREATE TABLE IF NOT EXISTS app_config (
    key TEXT PRIMARY KEY,
    data TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Output collections, upserted by (collection, id)
CREATE TABLE IF NOT EXISTS outputs (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    data TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE(collection, id)
);

CREATE INDEX IF NOT EXISTS idx_outputs_collection ON outputs(collection);

-- Pages submitted for fetching
CREATE TABLE IF NOT EXISTS fetch_queue (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    gid TEXT,
    page TEXT NOT NULL,
    enqueued_at TEXT NOT NULL
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
