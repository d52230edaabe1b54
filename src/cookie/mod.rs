//! Cookie handling for session repair
//!
//! The login flow only needs three things from a cookie helper: parse a raw
//! cookie into comparable entries, merge an old cookie with a newer one, and
//! test whether one cookie's entries are contained in another's. Hosts with
//! their own cookie rules implement [`CookieUtility`]; [`StandardCookies`]
//! covers request-header strings and JSON name/value structures.

mod standard;

pub use standard::StandardCookies;

use serde_json::Value;

/// Reads a cookie given as text, e.g. on the command line
///
/// JSON objects and arrays become structured cookies; anything else is kept
/// as a request header string.
pub fn cookie_from_arg(text: &str) -> Value {
    match serde_json::from_str::<Value>(text) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => value,
        _ => Value::String(text.to_string()),
    }
}

/// Ordered cookie entries, unique by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieMap {
    entries: Vec<(String, String)>,
}

impl CookieMap {
    /// Creates an empty cookie map
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, replacing the value in place when the name exists
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Gets the value of a cookie by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Checks that both maps hold the same entries, ignoring order
    pub fn same_entries(&self, other: &CookieMap) -> bool {
        self.len() == other.len() && self.iter().all(|(n, v)| other.get(n) == Some(v))
    }

    /// Renders the entries as a `Cookie` request header value
    pub fn to_header(&self) -> String {
        self.iter()
            .map(|(n, v)| format!("{}={}", n, v))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Cookie operations the login flow relies on
///
/// Implementations must treat the newer cookie as authoritative: on a name
/// conflict, [`CookieUtility::update`] keeps the value from `new`.
pub trait CookieUtility {
    /// Parses a raw cookie (header string or JSON structure) into entries
    fn parse_from_request(&self, raw: &Value) -> CookieMap;

    /// Merges `old` with `new`, new values winning on conflict
    ///
    /// The result keeps the representation of `old` when it holds entries,
    /// so a header string stays a header string.
    fn update(&self, old: &Value, new: &Value) -> Value;

    /// Checks whether every entry of `subset` is present in `superset`
    fn includes(&self, subset: &CookieMap, superset: &CookieMap) -> bool {
        subset.iter().all(|(n, v)| superset.get(n) == Some(v))
    }

    /// Checks whether a raw cookie carries no entries at all
    fn is_blank(&self, raw: &Value) -> bool {
        self.parse_from_request(raw).is_empty()
    }

    /// Renders any raw cookie as a request header string
    fn to_header(&self, raw: &Value) -> String {
        match raw {
            Value::String(s) => s.clone(),
            other => self.parse_from_request(other).to_header(),
        }
    }
}
