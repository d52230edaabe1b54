//! Session state tracking
//!
//! This module holds the flow's persisted configuration blob, the in-process
//! cache in front of it, and the per-page recovery states derived from it.

mod session_cache;
mod session_config;
mod session_state;

pub use session_cache::SessionCache;
pub use session_config::{SessionConfig, COOKIE_FIELD, EXPIRED_FIELD, SEEDED_FIELD};
pub use session_state::SessionState;
