//! Default cookie helper
//!
//! Accepts the shapes a page record may carry a cookie in:
//! - a request header string (`a=1; b=2`)
//! - a JSON object of name to value
//! - a JSON array of header fragments or `{"name": .., "value": ..}` objects

use crate::cookie::{CookieMap, CookieUtility};
use serde_json::{Map, Value};

/// Cookie helper for header strings and JSON name/value structures
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCookies;

impl StandardCookies {
    fn parse_header_into(map: &mut CookieMap, header: &str) {
        for pair in header.split(';') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }

            let (name, value) = match pair.split_once('=') {
                Some((name, value)) => (name.trim(), value.trim()),
                None => (pair, ""),
            };

            if !name.is_empty() {
                map.insert(name, value);
            }
        }
    }

    fn scalar_to_string(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Renders merged entries in the same shape as the original cookie
    fn represent_like(original: &Value, merged: &CookieMap) -> Value {
        match original {
            Value::Object(_) => {
                let object: Map<String, Value> = merged
                    .iter()
                    .map(|(n, v)| (n.to_string(), Value::String(v.to_string())))
                    .collect();
                Value::Object(object)
            }
            Value::Array(_) => Value::Array(
                merged
                    .iter()
                    .map(|(n, v)| Value::String(format!("{}={}", n, v)))
                    .collect(),
            ),
            _ => Value::String(merged.to_header()),
        }
    }
}

impl CookieUtility for StandardCookies {
    fn parse_from_request(&self, raw: &Value) -> CookieMap {
        let mut map = CookieMap::new();

        match raw {
            Value::String(header) => Self::parse_header_into(&mut map, header),
            Value::Object(object) => {
                for (name, value) in object {
                    let name = name.trim();
                    if !name.is_empty() {
                        map.insert(name, Self::scalar_to_string(value));
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    match item {
                        Value::String(fragment) => Self::parse_header_into(&mut map, fragment),
                        Value::Object(object) => {
                            let name = object
                                .get("name")
                                .map(Self::scalar_to_string)
                                .unwrap_or_default();
                            let name = name.trim();
                            if !name.is_empty() {
                                let value = object
                                    .get("value")
                                    .map(Self::scalar_to_string)
                                    .unwrap_or_default();
                                map.insert(name, value);
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }

        map
    }

    fn update(&self, old: &Value, new: &Value) -> Value {
        let old_entries = self.parse_from_request(old);
        if old_entries.is_empty() {
            return new.clone();
        }

        let new_entries = self.parse_from_request(new);
        if new_entries.is_empty() || old_entries.same_entries(&new_entries) {
            return old.clone();
        }

        let mut merged = old_entries;
        for (name, value) in new_entries.iter() {
            merged.insert(name, value);
        }

        Self::represent_like(old, &merged)
    }
}
