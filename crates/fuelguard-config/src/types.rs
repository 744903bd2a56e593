use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ledger behaviour.
    pub ledger: LedgerSection,
    /// Where the ledger is kept.
    pub storage: StorageSection,
    /// Logging output.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// LedgerSection
// ---------------------------------------------------------------------------

/// Ledger behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSection {
    /// Hours a journey may stay in transit before it reads as overdue.
    pub overdue_threshold_hours: u32,
    /// Tries per append before a lost race is reported, first try included.
    pub max_append_attempts: u32,
    /// Deltas below this need confirmation before they are logged.
    pub confirmation_lower_bound: f64,
    /// Deltas above this need confirmation before they are logged.
    pub confirmation_upper_bound: f64,
}

impl Default for LedgerSection {
    fn default() -> Self {
        Self {
            overdue_threshold_hours: 72,
            max_append_attempts: 3,
            confirmation_lower_bound: -200.0,
            confirmation_upper_bound: 1500.0,
        }
    }
}

// ---------------------------------------------------------------------------
// StorageSection
// ---------------------------------------------------------------------------

/// Storage backend kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Persistent `SurrealKV` database at `storage.path`.
    #[default]
    SurrealKv,
    /// Process-local map; nothing survives exit.
    Memory,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SurrealKv => write!(f, "surrealkv"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Where the ledger is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Backend kind.
    pub backend: StorageBackend,
    /// Database path. Filled with `<fuelguard home>/ledger.db` on load
    /// when unset.
    pub path: Option<String>,
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"json"` or `"full"`.
    pub format: String,
    /// Output target: `"stdout"`, `"stderr"` or `"file"`.
    pub target: String,
    /// Log directory when `target = "file"`.
    pub directory: Option<String>,
    /// Per-crate tracing directives (e.g. `["fuelguard_ledger=debug"]`).
    pub directives: Vec<String>,
    /// Prefix each line with a timestamp.
    pub timestamps: bool,
    /// Include the source file and line of each event.
    pub file_info: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
            format: "compact".to_owned(),
            target: "stderr".to_owned(),
            directory: None,
            directives: Vec::new(),
            timestamps: true,
            file_info: false,
        }
    }
}
