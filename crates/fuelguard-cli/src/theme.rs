//! CLI theme and styling.

use colored::Colorize;
use fuelguard_core::Timestamp;
use fuelguard_ledger::{DerivedStatus, Severity};

/// CLI theme configuration.
pub(crate) struct Theme;

impl Theme {
    /// Format a header.
    pub(crate) fn header(text: &str) -> String {
        format!("{}", text.bold().cyan())
    }

    /// Format a success message.
    pub(crate) fn success(text: &str) -> String {
        format!("{} {}", "✓".green(), text)
    }

    /// Format an error message.
    pub(crate) fn error(text: &str) -> String {
        format!("{} {}", "✗".red(), text.red())
    }

    /// Format a warning message.
    pub(crate) fn warning(text: &str) -> String {
        format!("{} {}", "!".yellow(), text.yellow())
    }

    /// Format an info message.
    pub(crate) fn info(text: &str) -> String {
        format!("{} {}", "i".blue(), text)
    }

    /// Format a dimmed message.
    pub(crate) fn dimmed(text: &str) -> String {
        format!("{}", text.dimmed())
    }

    /// Format a separator line.
    pub(crate) fn separator() -> String {
        "━".repeat(72).dimmed().to_string()
    }

    /// Format a key-value pair.
    pub(crate) fn kv(key: &str, value: &str) -> String {
        format!("{:>14}  {}", key.bold(), value)
    }

    /// Format a hash (already abbreviated by the caller).
    pub(crate) fn hash(text: &str) -> String {
        format!("{}", text.cyan())
    }

    /// Format a severity, colored by how bad it is.
    pub(crate) fn severity(severity: Severity) -> String {
        let label = severity.label();
        match severity {
            Severity::Normal => label.green().to_string(),
            Severity::SuspiciousLoss | Severity::AnomalyIncrease => label.yellow().to_string(),
            Severity::CriticalLoss => label.red().bold().to_string(),
        }
    }

    /// Format a derived journey status.
    pub(crate) fn status(status: DerivedStatus) -> String {
        let text = status.to_string();
        match status {
            DerivedStatus::InTransit => text.blue().to_string(),
            DerivedStatus::Completed => text.green().to_string(),
            DerivedStatus::Overdue => text.red().bold().to_string(),
        }
    }

    /// Format a timestamp.
    pub(crate) fn timestamp(ts: &Timestamp) -> String {
        ts.0.format("%Y-%m-%d %H:%M").to_string()
    }

    /// Format a fuel volume in liters.
    pub(crate) fn liters(value: f64) -> String {
        format!("{value:.1} L")
    }
}
