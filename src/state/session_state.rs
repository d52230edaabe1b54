//! Recovery states of a page within a session episode

use std::fmt;

/// States are not stored per page; they are derived from the flow's expired
/// flag and whether a pending hold record exists for the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Session is not marked expired and the page is not parked
    Active,

    /// Session is marked expired but the page is not parked yet
    Expiring,

    /// Page is parked and waits for re-authentication
    Held,

    /// Session was renewed; the parked page waits to be restored
    Repairing,
}

impl SessionState {
    /// Derives the state from the expired flag and the page's hold status
    ///
    /// An unset flag holds failing pages, so a page with a pending hold is
    /// `Held`. Without a hold nothing has gone stale yet and the page is
    /// `Active`.
    pub fn derive(expired: Option<bool>, pending_hold: bool) -> Self {
        match (expired, pending_hold) {
            (Some(false), true) => Self::Repairing,
            (Some(true), false) => Self::Expiring,
            (Some(true) | None, true) => Self::Held,
            (Some(false) | None, false) => Self::Active,
        }
    }

    /// Returns true when the page is parked in the hold collection
    pub fn is_parked(&self) -> bool {
        matches!(self, Self::Held | Self::Repairing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expiring => "expiring",
            Self::Held => "held",
            Self::Repairing => "repairing",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
