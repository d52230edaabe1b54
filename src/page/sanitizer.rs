//! Response metadata stripping
//!
//! Pages that come back from the crawl engine carry bookkeeping written
//! during fetch and parse (status, timing, counters, checksums). Those fields
//! must not travel with a page that is parked or submitted again.

use crate::page::Page;
use std::collections::HashSet;

/// Crawl bookkeeping fields removed from held and restored pages
pub const DEFAULT_RESPONSE_KEYS: &[&str] = &[
    "content_size",
    "content_type",
    "created_at",
    "effective_url",
    "failed_at",
    "failed_cid",
    "failed_content_size",
    "failed_content_type",
    "failed_effective_url",
    "failed_response_checksum",
    "failed_response_cookie",
    "failed_response_headers",
    "failed_response_proto",
    "failed_response_status_code",
    "failed_response_status",
    "fetched_at",
    "fetched_from",
    "fetching_at",
    "fetching_try_count",
    "forced_fetch",
    "fresh",
    "gid",
    "hostname",
    "job_id",
    "job_status",
    "parsed_at",
    "parsing_at",
    "parsing_fail_count",
    "parsing_failed_at",
    "parsing_status",
    "parsing_try_count",
    "parsing_updated_at",
    "response_checksum",
    "response_cookie",
    "response_headers",
    "response_proto",
    "response_status_code",
    "response_status",
    "status",
    "to_fetch",
    "total_failures",
    "total_requests",
    "total_successes",
];

/// Strips response metadata from page records
#[derive(Debug, Clone)]
pub struct PageSanitizer {
    response_keys: HashSet<String>,
}

impl PageSanitizer {
    /// Creates a sanitizer using the default response key set
    pub fn new() -> Self {
        Self::with_keys(DEFAULT_RESPONSE_KEYS.iter().copied())
    }

    /// Creates a sanitizer with a replacement response key set
    pub fn with_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            response_keys: keys
                .into_iter()
                .map(|key| key.as_ref().trim().to_string())
                .collect(),
        }
    }

    /// Checks whether a field name is response metadata
    ///
    /// The name is trimmed before the (case-sensitive) lookup.
    pub fn is_response_key(&self, name: &str) -> bool {
        self.response_keys.contains(name.trim())
    }

    /// Removes every response metadata field from the page
    pub fn strip_response_keys(&self, page: &mut Page) {
        for key in page.keys() {
            if self.is_response_key(&key) {
                page.remove(&key);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.response_keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.response_keys.is_empty()
    }
}

impl Default for PageSanitizer {
    fn default() -> Self {
        Self::new()
    }
}
