//! Login-Flow: session recovery for crawls whose login cookie expires mid-run
//!
//! When a page fails because its session went stale, the flow parks ("holds")
//! the page in a durable output collection, lets the host re-authenticate, and
//! later restores every held page with a freshly merged cookie.

pub mod config;
pub mod cookie;
pub mod flow;
pub mod page;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Login-Flow operations
#[derive(Debug, Error)]
pub enum LoginFlowError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Store(#[from] storage::StorageError),

    #[error("Failed to decode held page {id}: {source}")]
    Decode {
        id: String,
        source: serde_json::Error,
    },

    #[error("Invalid page record: {0}")]
    InvalidPage(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read options file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Missing required option: {0}")]
    MissingOption(&'static str),
}

/// Result type alias for Login-Flow operations
pub type Result<T> = std::result::Result<T, LoginFlowError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::FlowOptions;
pub use cookie::{CookieUtility, StandardCookies};
pub use flow::{DrainReport, LoginEnabled, LoginFlow, LoginFlowBuilder, SessionOutcome};
pub use page::{Page, PageSanitizer};
pub use state::{SessionConfig, SessionState};
pub use storage::{ConfigStore, FetchQueue, OutputStore, SqliteStore};
