use serde_json::{Map, Value};

/// Blob field set once the flow has seeded its first held pages
pub const SEEDED_FIELD: &str = "seeded";

/// Blob field set once the stored cookie is known to be stale
pub const EXPIRED_FIELD: &str = "expired";

/// Blob field holding the latest known-good session cookie
pub const COOKIE_FIELD: &str = "cookie";

static NO_COOKIE: Value = Value::Null;

/// The flow's persisted configuration blob
///
/// Unknown fields are kept so that a read-modify-write never drops data
/// written by other parts of the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionConfig {
    data: Map<String, Value>,
}

impl SessionConfig {
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }

    /// Whether the flow has been seeded
    pub fn is_seeded(&self) -> bool {
        self.data
            .get(SEEDED_FIELD)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// The raw expired flag; `None` when it was never written
    pub fn expired(&self) -> Option<bool> {
        self.data.get(EXPIRED_FIELD).and_then(Value::as_bool)
    }

    /// Whether the stored cookie is marked stale (unset reads as `false`)
    pub fn is_expired(&self) -> bool {
        self.expired().unwrap_or(false)
    }

    /// The latest stored cookie, `Null` when none was written yet
    pub fn cookie(&self) -> &Value {
        self.data.get(COOKIE_FIELD).unwrap_or(&NO_COOKIE)
    }

    /// Returns a copy of this blob with `patch` merged over it
    pub fn merged(&self, patch: Map<String, Value>) -> Self {
        let mut data = self.data.clone();
        data.extend(patch);
        Self { data }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.data
    }
}
