//! Page records handled by the login flow
//!
//! A page is an opaque JSON object owned by the host crawl engine. The flow
//! only reads and writes a handful of recognized fields:
//! - `gid`: global page id, used as the hold record id
//! - `vars`: map carrying the session cookie under the flow's vars key
//! - `cookie`: page-level cookie
//! - `headers`: request headers, carrying a `cookie`/`Cookie` header

mod sanitizer;

pub use sanitizer::{PageSanitizer, DEFAULT_RESPONSE_KEYS};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field holding the page's global id
pub const GID_KEY: &str = "gid";

/// Field holding the page's variables
pub const VARS_KEY: &str = "vars";

/// Field holding the page-level cookie
pub const COOKIE_KEY: &str = "cookie";

/// Field holding the page's request headers
pub const HEADERS_KEY: &str = "headers";

/// A page record as submitted to, and handed back by, the crawl engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Page {
    fields: Map<String, Value>,
}

impl Page {
    /// Creates an empty page record
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts a JSON value into a page record
    ///
    /// Returns None when the value is not a JSON object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// Gets the page's global id
    ///
    /// Numeric ids are rendered as strings.
    pub fn gid(&self) -> Option<String> {
        match self.fields.get(GID_KEY)? {
            Value::String(gid) if !gid.trim().is_empty() => Some(gid.clone()),
            Value::Number(gid) => Some(gid.to_string()),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Returns the field names currently present on the page
    pub fn keys(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    /// Gets a value from the page's `vars` map
    pub fn var(&self, key: &str) -> Option<&Value> {
        self.fields.get(VARS_KEY)?.as_object()?.get(key)
    }

    /// Gets the page's `vars` map, creating it when missing or not a map
    pub fn vars_mut(&mut self) -> &mut Map<String, Value> {
        Self::object_entry(&mut self.fields, VARS_KEY)
    }

    /// Gets the page's `headers` map, creating it when missing or not a map
    pub fn headers_mut(&mut self) -> &mut Map<String, Value> {
        Self::object_entry(&mut self.fields, HEADERS_KEY)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    fn object_entry<'a>(fields: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
        let entry = fields
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        match entry {
            Value::Object(map) => map,
            _ => unreachable!("entry was just replaced with an object"),
        }
    }
}

impl From<Map<String, Value>> for Page {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}
