//! Options module for the login flow
//!
//! This module handles loading, parsing, and validating the TOML options
//! that configure a login flow instance.
//!
//! # Example
//!
//! ```no_run
//! use login_flow::config::load_options;
//! use std::path::Path;
//!
//! let options = load_options(Path::new("login_flow.toml")).unwrap();
//! println!("Held pages are drained in batches of {}", options.per_page);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    FlowOptions, DEFAULT_COLLECTION, DEFAULT_CONFIG_KEY, DEFAULT_PER_PAGE, DEFAULT_VARS_KEY,
};

// Re-export parser functions
pub use parser::{load_options, parse_options};
pub use validation::validate;
