//! Bridge from `fuelguard_config::Config` to ledger and telemetry types.

use std::path::PathBuf;

use anyhow::Context;
use fuelguard_config::{Config, StorageBackend};
use fuelguard_core::RetryConfig;
use fuelguard_ledger::{ConfirmationPolicy, JourneyLedger, LedgerSettings};
use fuelguard_telemetry::{LogConfig, LogFormat, LogTarget};

/// Log configuration from the `[logging]` section.
///
/// Values are validated on load, so unknown strings fall back to defaults.
pub(crate) fn to_log_config(config: &Config) -> LogConfig {
    let logging = &config.logging;
    let format = match logging.format.as_str() {
        "pretty" => LogFormat::Pretty,
        "json" => LogFormat::Json,
        "full" => LogFormat::Full,
        _ => LogFormat::Compact,
    };

    let mut log_config = LogConfig::new(logging.level.clone()).with_format(format);
    for directive in &logging.directives {
        log_config = log_config.with_directive(directive.clone());
    }
    if !logging.timestamps {
        log_config = log_config.without_timestamps();
    }
    if logging.file_info {
        log_config = log_config.with_file_info();
    }

    match (logging.target.as_str(), &logging.directory) {
        ("stdout", _) => log_config.with_target(LogTarget::Stdout),
        ("file", Some(dir)) => log_config.with_file_logging(dir, fuelguard_telemetry::FileRotation::Daily),
        _ => log_config.with_target(LogTarget::Stderr),
    }
}

/// Ledger settings from the `[ledger]` section.
pub(crate) fn to_ledger_settings(config: &Config) -> LedgerSettings {
    let ledger = &config.ledger;
    LedgerSettings {
        overdue_threshold: chrono::Duration::hours(i64::from(ledger.overdue_threshold_hours)),
        append_retry: RetryConfig::local(ledger.max_append_attempts),
        confirmation: ConfirmationPolicy::new(
            ledger.confirmation_lower_bound,
            ledger.confirmation_upper_bound,
        ),
    }
}

/// Open the ledger described by the `[storage]` section.
pub(crate) fn open_ledger(config: &Config) -> anyhow::Result<JourneyLedger> {
    let ledger = match config.storage.backend {
        StorageBackend::Memory => JourneyLedger::in_memory(),
        StorageBackend::SurrealKv => {
            let path = config
                .storage
                .path
                .as_deref()
                .map(PathBuf::from)
                .context("storage.path is not set")?;
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create ledger directory {}", parent.display())
                })?;
            }
            JourneyLedger::open(&path)
                .with_context(|| format!("failed to open ledger at {}", path.display()))?
        },
    };
    Ok(ledger.with_settings(to_ledger_settings(config)))
}
