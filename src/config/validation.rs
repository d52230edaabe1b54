use crate::config::types::FlowOptions;
use crate::ConfigError;

/// Validates a full set of flow options
pub fn validate(options: &FlowOptions) -> Result<(), ConfigError> {
    if options.per_page < 1 {
        return Err(ConfigError::Validation(format!(
            "per_page must be >= 1, got {}",
            options.per_page
        )));
    }

    validate_name("collection", &options.collection)?;
    validate_name("config_key", &options.config_key)?;
    validate_name("vars_key", &options.vars_key)?;

    if let Some(keys) = &options.response_keys {
        validate_response_keys(keys)?;
    }

    Ok(())
}

/// Validates that a named option is not blank
fn validate_name(option: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "{} cannot be empty",
            option
        )));
    }
    Ok(())
}

/// Validates a response key override list
fn validate_response_keys(keys: &[String]) -> Result<(), ConfigError> {
    for key in keys {
        if key.trim().is_empty() {
            return Err(ConfigError::Validation(
                "response_keys cannot contain blank entries".to_string(),
            ));
        }
    }
    Ok(())
}
