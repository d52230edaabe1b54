//! Page repair: merge the latest cookie into a page before it is fetched again

use crate::flow::LoginFlow;
use crate::page::{Page, COOKIE_KEY};
use crate::Result;
use serde_json::Value;

/// Header names a page may carry its cookie under, preferred first
const HEADER_COOKIE_KEYS: [&str; 2] = ["cookie", "Cookie"];

impl LoginFlow {
    /// Updates an old cookie with the cookie stored in the flow config
    ///
    /// A missing or empty cookie is replaced by the stored cookie as is.
    pub fn merge_cookie(&mut self, old_cookie: Option<&Value>) -> Result<Value> {
        let config = self.config()?;
        let merged = match old_cookie {
            Some(old) if !self.cookies.is_blank(old) => self.cookies.update(old, config.cookie()),
            _ => config.cookie().clone(),
        };
        Ok(merged)
    }

    /// Stores the current session cookie under the flow's vars key
    pub fn attach_session_vars(&mut self, page: &mut Page) -> Result<()> {
        let config = self.config()?;
        page.vars_mut()
            .insert(self.options.vars_key.clone(), config.cookie().clone());
        Ok(())
    }

    /// Repairs a page's session in place
    ///
    /// Strips response metadata (unless kept), merges the page cookie and the
    /// cookie header with the current cookie, attaches the session vars and
    /// finally runs the custom fix hook.
    pub fn repair_page(&mut self, page: &mut Page) -> Result<()> {
        if !self.options.keep_response_keys {
            self.sanitizer.strip_response_keys(page);
        }

        let cookie = self.merge_cookie(page.get(COOKIE_KEY))?;
        page.insert(COOKIE_KEY, cookie);

        let header_key = {
            let headers = page.headers_mut();
            HEADER_COOKIE_KEYS
                .iter()
                .find(|key| headers.contains_key(**key))
                .copied()
                .unwrap_or("Cookie")
        };
        let current = page
            .headers_mut()
            .get(header_key)
            .cloned()
            .unwrap_or_else(|| Value::String(String::new()));
        let merged = self.merge_cookie(Some(&current))?;
        let header = Value::String(self.cookies.to_header(&merged));
        page.headers_mut().insert(header_key.to_string(), header);

        self.attach_session_vars(page)?;

        if let Some(fix) = &self.custom_fix {
            fix(page);
        }

        Ok(())
    }
}
