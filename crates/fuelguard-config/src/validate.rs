//! Post-merge configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::{Config, StorageBackend};

/// Upper bound on append attempts; beyond this a stuck writer is a bug.
const MAX_APPEND_ATTEMPTS: u32 = 20;

/// Validate a fully merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_ledger(config)?;
    validate_storage(config)?;
    validate_logging(config)?;
    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message: message.into(),
    }
}

fn validate_ledger(config: &Config) -> ConfigResult<()> {
    let l = &config.ledger;

    if l.overdue_threshold_hours == 0 {
        return Err(invalid(
            "ledger.overdue_threshold_hours",
            "overdue threshold must be at least one hour",
        ));
    }

    if l.max_append_attempts == 0 || l.max_append_attempts > MAX_APPEND_ATTEMPTS {
        return Err(invalid(
            "ledger.max_append_attempts",
            format!("max_append_attempts must be between 1 and {MAX_APPEND_ATTEMPTS}"),
        ));
    }

    if !l.confirmation_lower_bound.is_finite() || !l.confirmation_upper_bound.is_finite() {
        return Err(invalid(
            "ledger.confirmation_lower_bound",
            "confirmation bounds must be finite",
        ));
    }

    if l.confirmation_lower_bound >= l.confirmation_upper_bound {
        return Err(invalid(
            "ledger.confirmation_upper_bound",
            format!(
                "upper bound {} must exceed lower bound {}",
                l.confirmation_upper_bound, l.confirmation_lower_bound
            ),
        ));
    }

    Ok(())
}

fn validate_storage(config: &Config) -> ConfigResult<()> {
    if config.storage.backend == StorageBackend::SurrealKv
        && config
            .storage
            .path
            .as_deref()
            .is_some_and(|p| p.trim().is_empty())
    {
        return Err(invalid("storage.path", "surrealkv storage needs a non-empty path"));
    }
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let logging = &config.logging;

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&logging.level.as_str()) {
        return Err(invalid(
            "logging.level",
            format!(
                "unsupported log level '{}'; expected one of: {}",
                logging.level,
                valid_levels.join(", ")
            ),
        ));
    }

    let valid_formats = ["pretty", "compact", "json", "full"];
    if !valid_formats.contains(&logging.format.as_str()) {
        return Err(invalid(
            "logging.format",
            format!(
                "unsupported log format '{}'; expected one of: {}",
                logging.format,
                valid_formats.join(", ")
            ),
        ));
    }

    let valid_targets = ["stdout", "stderr", "file"];
    if !valid_targets.contains(&logging.target.as_str()) {
        return Err(invalid(
            "logging.target",
            format!(
                "unsupported log target '{}'; expected one of: {}",
                logging.target,
                valid_targets.join(", ")
            ),
        ));
    }

    if logging.target == "file" && logging.directory.is_none() {
        return Err(invalid("logging.directory", "file logging needs a directory"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(result: ConfigResult<()>) -> String {
        match result {
            Err(ConfigError::ValidationError { field, .. }) => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let mut config = Config::default();
        config.ledger.max_append_attempts = 0;
        assert_eq!(field_of(validate(&config)), "ledger.max_append_attempts");
    }

    #[test]
    fn test_zero_overdue_rejected() {
        let mut config = Config::default();
        config.ledger.overdue_threshold_hours = 0;
        assert_eq!(field_of(validate(&config)), "ledger.overdue_threshold_hours");
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let mut config = Config::default();
        config.ledger.confirmation_lower_bound = 100.0;
        config.ledger.confirmation_upper_bound = 100.0;
        assert_eq!(field_of(validate(&config)), "ledger.confirmation_upper_bound");
    }

    #[test]
    fn test_nan_bound_rejected() {
        let mut config = Config::default();
        config.ledger.confirmation_lower_bound = f64::NAN;
        assert_eq!(field_of(validate(&config)), "ledger.confirmation_lower_bound");
    }

    #[test]
    fn test_blank_storage_path_rejected() {
        let mut config = Config::default();
        config.storage.path = Some("  ".to_owned());
        assert_eq!(field_of(validate(&config)), "storage.path");

        config.storage.backend = StorageBackend::Memory;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_logging_values_checked() {
        let mut config = Config::default();
        config.logging.level = "loud".to_owned();
        assert_eq!(field_of(validate(&config)), "logging.level");

        let mut config = Config::default();
        config.logging.format = "xml".to_owned();
        assert_eq!(field_of(validate(&config)), "logging.format");

        let mut config = Config::default();
        config.logging.target = "file".to_owned();
        assert_eq!(field_of(validate(&config)), "logging.directory");
    }
}
