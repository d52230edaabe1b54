//! Host integration for login-enabled parsers
//!
//! A host that fetches pages behind a login implements [`LoginEnabled`] on
//! its page handler. The only required logic is how to tell whether a page
//! was served with a valid session; everything else is provided.

use crate::flow::{LoginFlow, SessionOutcome};
use crate::page::Page;
use crate::storage::FetchQueue;
use crate::Result;
use serde_json::Value;
use sha2::{Digest, Sha256};

pub trait LoginEnabled {
    /// The flow this handler recovers sessions with
    fn login_flow(&self) -> &LoginFlow;

    fn login_flow_mut(&mut self) -> &mut LoginFlow;

    /// Checks whether the page was served with a valid session
    fn valid_session(&self, page: &Page) -> bool;

    /// Page to enqueue when a page gets held, usually the login page
    fn login_page(&self) -> Option<Page> {
        None
    }

    /// Hex SHA-256 of the page's session cookie
    ///
    /// Pages fetched with different sessions get different salts, so the
    /// crawl engine does not deduplicate a refetch against the failed fetch.
    fn salt(&self, page: &Page) -> String {
        let cookie = match page.var(self.login_flow().vars_key()) {
            Some(Value::String(cookie)) => cookie.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };

        let mut hasher = Sha256::new();
        hasher.update(cookie.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Fixes the session of a failed page, enqueuing [`LoginEnabled::login_page`]
    /// when the page gets held
    fn fix_session(&mut self, page: &Page, queue: &mut dyn FetchQueue) -> Result<SessionOutcome> {
        let login_page = self.login_page();
        self.login_flow_mut()
            .fix_session_with(page, queue, move |queue| {
                if let Some(login_page) = login_page {
                    queue.enqueue(&[login_page])?;
                }
                Ok(())
            })
    }

    /// Leaves valid pages alone and fixes the session of the others
    fn check_session(&mut self, page: &Page, queue: &mut dyn FetchQueue) -> Result<SessionOutcome> {
        if self.valid_session(page) {
            return Ok(SessionOutcome::Valid);
        }
        self.fix_session(page, queue)
    }
}
