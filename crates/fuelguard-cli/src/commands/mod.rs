//! CLI command implementations.

pub(crate) mod checkpoint;
pub(crate) mod config;
pub(crate) mod journey;
pub(crate) mod report;
pub(crate) mod verify;

/// How command results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// Colored, human-readable text.
    Pretty,
    /// One JSON document per command.
    Json,
}

/// Print a value as pretty JSON.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
