//! Errors raised while locating, reading and checking configuration.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why configuration could not be produced.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file exists (or was named explicitly) but cannot be read.
    #[error("cannot read {}: {source}", path.display())]
    ReadError {
        /// The file in question.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: io::Error,
    },

    /// A config file is not valid TOML for the expected shape.
    #[error("invalid TOML in {}: {source}", path.display())]
    ParseError {
        /// The file in question.
        path: PathBuf,
        /// Parser diagnostics.
        #[source]
        source: toml::de::Error,
    },

    /// A merged value is out of range or inconsistent.
    #[error("{field}: {message}")]
    ValidationError {
        /// Dotted field path, e.g. `ledger.max_append_attempts`.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// A `FUELGUARD_*` variable holds an unusable value.
    #[error("${var_name}: {message}")]
    EnvError {
        /// The variable name.
        var_name: String,
        /// What is wrong with it.
        message: String,
    },

    /// Neither `FUELGUARD_HOME` nor a user home directory is available.
    #[error("no home directory; set FUELGUARD_HOME")]
    NoHomeDir,
}

/// Shorthand for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
