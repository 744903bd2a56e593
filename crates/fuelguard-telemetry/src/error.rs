//! Logging setup errors.

use thiserror::Error;

/// Why the subscriber could not be installed.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A level or directive did not parse.
    #[error("invalid log filter: {0}")]
    ConfigError(String),

    /// The appender or the global subscriber could not be set up.
    #[error("cannot install logger: {0}")]
    InitError(String),

    /// The log directory could not be created.
    #[error("log directory: {0}")]
    IoError(#[from] std::io::Error),
}

/// Shorthand for telemetry results.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
