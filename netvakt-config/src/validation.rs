//! Custom validation functions for configuration.

use validator::ValidationError;

/// Validate a log level name.
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid = ["trace", "debug", "info", "warn", "error", "off"]
        .contains(&level.to_lowercase().as_str());
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_log_level"))
    }
}

/// Validate the log output layout.
pub fn validate_log_format(format: &str) -> Result<(), ValidationError> {
    match format {
        "pretty" | "compact" => Ok(()),
        _ => Err(ValidationError::new("invalid_log_format")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_levels_are_case_insensitive() {
        assert!(validate_log_level("DEBUG").is_ok());
        assert!(validate_log_level("verbose").is_err());
    }

    #[test]
    fn only_known_formats_pass() {
        assert!(validate_log_format("pretty").is_ok());
        assert!(validate_log_format("json").is_err());
    }
}
