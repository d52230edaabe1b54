use crate::config::types::FlowOptions;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses an options file from the given path
///
/// Missing keys fall back to their defaults.
///
/// # Arguments
///
/// * `path` - Path to the TOML options file
///
/// # Returns
///
/// * `Ok(FlowOptions)` - Successfully loaded and validated options
/// * `Err(ConfigError)` - Failed to load, parse, or validate the options
pub fn load_options(path: &Path) -> Result<FlowOptions, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_options(&content)
}

/// Parses and validates options from TOML text
pub fn parse_options(content: &str) -> Result<FlowOptions, ConfigError> {
    let options: FlowOptions = toml::from_str(content)?;

    validate(&options)?;

    Ok(options)
}
