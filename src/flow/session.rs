//! Session recovery state machine
//!
//! Runs once per failed page. When the page already used the stored cookie,
//! that cookie is stale and the flow is marked expired. While the flow is
//! expired (or was never confirmed fresh) pages are parked in the hold
//! collection; once an external re-authentication clears the flag, failing
//! pages are repaired and submitted again directly.

use crate::flow::{LoginFlow, SessionOutcome, FETCHED_FIELD, HELD_PAGE_FIELD, PENDING};
use crate::page::Page;
use crate::state::SessionState;
use crate::storage::{FetchQueue, OutputRecord};
use crate::{LoginFlowError, Result};
use serde_json::{json, Value};

impl LoginFlow {
    /// Fixes the session of the current page
    ///
    /// Equivalent to [`LoginFlow::fix_session_with`] with no hold hook.
    pub fn fix_session(
        &mut self,
        page: &Page,
        queue: &mut dyn FetchQueue,
    ) -> Result<SessionOutcome> {
        self.fix_session_with(page, queue, |_| Ok(()))
    }

    /// Fixes the session of the current page
    ///
    /// # Arguments
    ///
    /// * `page` - The page whose fetch failed on a session error
    /// * `queue` - Fetch queue used to submit the repaired page
    /// * `on_hold` - Runs after the page is parked, typically to enqueue a
    ///   login page
    ///
    /// # Returns
    ///
    /// * `Ok(SessionOutcome::Held)` - The page was parked, `on_hold` ran
    /// * `Ok(SessionOutcome::Refetched)` - The page was repaired and enqueued
    /// * `Err(LoginFlowError)` - A store call failed, or the page has no gid
    pub fn fix_session_with<F>(
        &mut self,
        page: &Page,
        queue: &mut dyn FetchQueue,
        on_hold: F,
    ) -> Result<SessionOutcome>
    where
        F: FnOnce(&mut dyn FetchQueue) -> Result<()>,
    {
        let config = self.config()?;
        let old_cookie = page
            .var(&self.options.vars_key)
            .cloned()
            .unwrap_or(Value::Null);
        let old_cookie = self.cookies.parse_from_request(&old_cookie);
        let newest_cookie = self.cookies.parse_from_request(config.cookie());

        if self.cookies.includes(&old_cookie, &newest_cookie) && !config.is_expired() {
            tracing::info!(
                "Stored session for '{}' is stale ({} -> {})",
                self.options.config_key,
                SessionState::Active,
                SessionState::Expiring
            );
            self.cache.mark_expired()?;
        }

        let config = self.config()?;
        if config.expired() != Some(false) {
            let gid = self.hold_page(page)?;
            on_hold(queue)?;
            return Ok(SessionOutcome::Held { gid });
        }

        let mut new_page = page.clone();
        self.repair_page(&mut new_page)?;
        queue.enqueue(&[new_page])?;
        tracing::debug!(
            "Refetching {} with renewed session ({})",
            page.gid().as_deref().unwrap_or("page without gid"),
            SessionState::Repairing
        );

        Ok(SessionOutcome::Refetched)
    }

    /// Parks a copy of the page in the hold collection, keyed by its gid
    ///
    /// A later hold for the same gid replaces the earlier record.
    fn hold_page(&mut self, page: &Page) -> Result<String> {
        let gid = page.gid().ok_or_else(|| {
            LoginFlowError::InvalidPage("cannot hold a page without a gid".to_string())
        })?;

        let mut held_page = page.clone();
        if !self.options.keep_response_keys {
            self.sanitizer.strip_response_keys(&mut held_page);
        }

        let record = OutputRecord::new(self.options.collection.as_str(), gid.as_str())
            .with(HELD_PAGE_FIELD, held_page.into_value())
            .with(FETCHED_FIELD, json!(PENDING));
        self.outputs.save(&[record])?;

        tracing::debug!("Holding {} ({})", gid, SessionState::Held);
        Ok(gid)
    }
}
