//! In-process cache of the flow's configuration blob
//!
//! The cached blob is read-only: it is shared behind an `Arc` and replaced
//! only by a fresh read after [`SessionCache::invalidate`]. Every write goes
//! through [`SessionCache::update`], which re-reads before merging and drops
//! the cache afterwards so the next read sees what was stored.

use crate::state::session_config::{SessionConfig, EXPIRED_FIELD, SEEDED_FIELD};
use crate::storage::{ConfigStore, StorageResult};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Lazily loaded, explicitly invalidated view of the flow's configuration
pub struct SessionCache {
    key: String,
    store: Arc<dyn ConfigStore>,
    cached: Option<Arc<SessionConfig>>,
}

impl SessionCache {
    /// Creates an empty cache over the blob stored under `key`
    pub fn new(store: Arc<dyn ConfigStore>, key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            store,
            cached: None,
        }
    }

    /// Returns the cached blob, reading it from the store on a miss
    pub fn config(&mut self) -> StorageResult<Arc<SessionConfig>> {
        if let Some(config) = &self.cached {
            return Ok(Arc::clone(config));
        }

        tracing::trace!("Loading login flow config '{}'", self.key);
        let data = self.store.find_config(&self.key)?.unwrap_or_default();
        let config = Arc::new(SessionConfig::new(data));
        self.cached = Some(Arc::clone(&config));
        Ok(config)
    }

    /// Drops the cached blob so the next read goes to the store
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Merges `patch` into the latest stored blob and writes it back
    pub fn update(&mut self, patch: Map<String, Value>) -> StorageResult<()> {
        self.invalidate();
        let current = self.config()?;
        let next = current.merged(patch);
        let result = self.store.save_config(&self.key, next.as_map());
        self.invalidate();
        result
    }

    /// Sets the seeded flag
    pub fn mark_seeded(&mut self) -> StorageResult<()> {
        self.update(flag(SEEDED_FIELD, true))
    }

    /// Sets the expired flag
    pub fn mark_expired(&mut self) -> StorageResult<()> {
        self.update(flag(EXPIRED_FIELD, true))
    }
}

fn flag(name: &str, value: bool) -> Map<String, Value> {
    let mut patch = Map::new();
    patch.insert(name.to_string(), Value::Bool(value));
    patch
}
