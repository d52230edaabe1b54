//! Login flow: detect stale sessions, hold pages, restore them later
//!
//! This module contains the session recovery logic, including:
//! - Staleness detection and page holding ([`LoginFlow::fix_session`])
//! - Cookie merging and page repair ([`LoginFlow::repair_page`])
//! - Draining held pages back into the fetch queue ([`LoginFlow::restore_held_pages`])
//! - The host integration trait ([`LoginEnabled`])

mod plugin;
mod repair;
mod restore;
mod session;

pub use plugin::LoginEnabled;
pub use restore::DrainReport;

use crate::config::{validate, FlowOptions};
use crate::cookie::{CookieUtility, StandardCookies};
use crate::page::{Page, PageSanitizer};
use crate::state::{SessionCache, SessionConfig, SessionState, COOKIE_FIELD, EXPIRED_FIELD};
use crate::storage::{ConfigStore, OutputStore};
use crate::{ConfigError, ConfigResult, Result};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Held record field carrying the parked page
pub const HELD_PAGE_FIELD: &str = "page";

/// Held record field carrying the drain marker
pub const FETCHED_FIELD: &str = "fetched";

/// Drain marker of a record waiting to be restored
pub const PENDING: &str = "0";

/// Drain marker of a record already restored
pub const RESTORED: &str = "1";

/// Hook applied to every repaired page
pub type CustomFix = Box<dyn Fn(&mut Page)>;

/// Outcome of handling a page whose session failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The session was valid; nothing was done
    Valid,

    /// The page was parked under `gid` until the session is renewed
    Held { gid: String },

    /// The page was repaired with the current cookie and submitted again
    Refetched,
}

/// Session recovery flow bound to one configuration key and hold collection
pub struct LoginFlow {
    options: FlowOptions,
    cache: SessionCache,
    outputs: Arc<dyn OutputStore>,
    cookies: Box<dyn CookieUtility>,
    sanitizer: PageSanitizer,
    custom_fix: Option<CustomFix>,
}

impl LoginFlow {
    /// Starts building a flow with default options
    pub fn builder() -> LoginFlowBuilder {
        LoginFlowBuilder::new()
    }

    pub fn options(&self) -> &FlowOptions {
        &self.options
    }

    /// Page `vars` key carrying the session cookie
    pub fn vars_key(&self) -> &str {
        &self.options.vars_key
    }

    pub fn sanitizer(&self) -> &PageSanitizer {
        &self.sanitizer
    }

    /// Returns the cached configuration blob, loading it on a miss
    pub fn config(&mut self) -> Result<Arc<SessionConfig>> {
        Ok(self.cache.config()?)
    }

    /// Drops the cached configuration so the next read hits the store
    pub fn reload_config(&mut self) {
        self.cache.invalidate();
    }

    /// Merges `patch` into the stored configuration blob
    pub fn update_config(&mut self, patch: Map<String, Value>) -> Result<()> {
        Ok(self.cache.update(patch)?)
    }

    /// Whether the flow has already seeded its held pages
    ///
    /// Informational only: nothing in the recovery logic branches on it.
    pub fn is_seeded(&mut self) -> Result<bool> {
        Ok(self.config()?.is_seeded())
    }

    pub fn mark_seeded(&mut self) -> Result<()> {
        Ok(self.cache.mark_seeded()?)
    }

    /// Whether the stored cookie has been marked stale
    pub fn is_expired(&mut self) -> Result<bool> {
        Ok(self.config()?.is_expired())
    }

    pub fn mark_expired(&mut self) -> Result<()> {
        Ok(self.cache.mark_expired()?)
    }

    /// Stores a freshly authenticated cookie and clears the expired flag
    ///
    /// This is the re-authentication write that starts a new episode; the
    /// recovery logic itself never calls it.
    pub fn renew_session(&mut self, cookie: Value) -> Result<()> {
        let mut patch = Map::new();
        patch.insert(COOKIE_FIELD.to_string(), cookie);
        patch.insert(EXPIRED_FIELD.to_string(), Value::Bool(false));
        self.update_config(patch)?;
        tracing::info!("Session renewed for '{}'", self.options.config_key);
        Ok(())
    }

    /// Derives the recovery state of a page
    pub fn session_state(&mut self, page: &Page) -> Result<SessionState> {
        let expired = self.config()?.expired();
        let pending_hold = match page.gid() {
            Some(gid) => self
                .outputs
                .find_output(&self.options.collection, &gid)?
                .map(|record| record.get(FETCHED_FIELD) == Some(&json!(PENDING)))
                .unwrap_or(false),
            None => false,
        };
        Ok(SessionState::derive(expired, pending_hold))
    }

    /// Counts held pages waiting to be restored
    pub fn pending_count(&self) -> Result<u64> {
        Ok(self
            .outputs
            .count_outputs(&self.options.collection, &pending_filter())?)
    }
}

/// Filter selecting held records that still wait for restoration
fn pending_filter() -> Map<String, Value> {
    let mut filter = Map::new();
    filter.insert(FETCHED_FIELD.to_string(), json!(PENDING));
    filter
}

/// Builder for [`LoginFlow`]
///
/// A configuration store and an output store are required; everything else
/// falls back to the defaults of [`FlowOptions`] and [`StandardCookies`].
pub struct LoginFlowBuilder {
    options: FlowOptions,
    config_store: Option<Arc<dyn ConfigStore>>,
    output_store: Option<Arc<dyn OutputStore>>,
    cookies: Option<Box<dyn CookieUtility>>,
    custom_fix: Option<CustomFix>,
}

impl LoginFlowBuilder {
    pub fn new() -> Self {
        Self {
            options: FlowOptions::default(),
            config_store: None,
            output_store: None,
            cookies: None,
            custom_fix: None,
        }
    }

    /// Replaces all options at once
    pub fn options(mut self, options: FlowOptions) -> Self {
        self.options = options;
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.options.per_page = per_page;
        self
    }

    pub fn collection(mut self, collection: impl Into<String>) -> Self {
        self.options.collection = collection.into();
        self
    }

    pub fn config_key(mut self, config_key: impl Into<String>) -> Self {
        self.options.config_key = config_key.into();
        self
    }

    pub fn vars_key(mut self, vars_key: impl Into<String>) -> Self {
        self.options.vars_key = vars_key.into();
        self
    }

    pub fn response_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.response_keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn keep_response_keys(mut self, keep: bool) -> Self {
        self.options.keep_response_keys = keep;
        self
    }

    pub fn config_store(mut self, store: Arc<dyn ConfigStore>) -> Self {
        self.config_store = Some(store);
        self
    }

    pub fn output_store(mut self, store: Arc<dyn OutputStore>) -> Self {
        self.output_store = Some(store);
        self
    }

    /// Uses one backend as both configuration and output store
    pub fn store<S>(self, store: Arc<S>) -> Self
    where
        S: ConfigStore + OutputStore + 'static,
    {
        let config: Arc<dyn ConfigStore> = store.clone();
        let outputs: Arc<dyn OutputStore> = store;
        self.config_store(config).output_store(outputs)
    }

    pub fn cookies(mut self, cookies: impl CookieUtility + 'static) -> Self {
        self.cookies = Some(Box::new(cookies));
        self
    }

    /// Sets a hook run on every repaired page, after the cookie repair
    pub fn custom_fix(mut self, fix: impl Fn(&mut Page) + 'static) -> Self {
        self.custom_fix = Some(Box::new(fix));
        self
    }

    /// Validates the options and assembles the flow
    ///
    /// # Returns
    ///
    /// * `Ok(LoginFlow)` - Ready to use flow
    /// * `Err(ConfigError)` - Invalid options or a missing store
    pub fn build(self) -> ConfigResult<LoginFlow> {
        validate(&self.options)?;

        let config_store = self
            .config_store
            .ok_or(ConfigError::MissingOption("config_store"))?;
        let outputs = self
            .output_store
            .ok_or(ConfigError::MissingOption("output_store"))?;

        let sanitizer = match &self.options.response_keys {
            Some(keys) => PageSanitizer::with_keys(keys),
            None => PageSanitizer::new(),
        };

        Ok(LoginFlow {
            cache: SessionCache::new(config_store, self.options.config_key.clone()),
            options: self.options,
            outputs,
            cookies: self
                .cookies
                .unwrap_or_else(|| Box::new(StandardCookies)),
            sanitizer,
            custom_fix: self.custom_fix,
        })
    }
}

impl Default for LoginFlowBuilder {
    fn default() -> Self {
        Self::new()
    }
}
