//! `FUELGUARD_*` environment overrides.
//!
//! Overrides are applied after every file layer and replace what the files
//! set.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::merge::{ConfigLayer, FieldSources};

/// Environment variable naming an alternate fuelguard home directory.
pub const HOME_VAR: &str = "FUELGUARD_HOME";

/// How an override value is written into the TOML tree.
#[derive(Clone, Copy)]
enum ValueKind {
    Text,
    Integer,
}

struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
    kind: ValueKind,
}

const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "FUELGUARD_LOG_LEVEL",
        field_path: "logging.level",
        kind: ValueKind::Text,
    },
    EnvMapping {
        var_name: "FUELGUARD_STORAGE_BACKEND",
        field_path: "storage.backend",
        kind: ValueKind::Text,
    },
    EnvMapping {
        var_name: "FUELGUARD_STORAGE_PATH",
        field_path: "storage.path",
        kind: ValueKind::Text,
    },
    EnvMapping {
        var_name: "FUELGUARD_OVERDUE_HOURS",
        field_path: "ledger.overdue_threshold_hours",
        kind: ValueKind::Integer,
    },
];

/// Snapshot the process environment.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars().collect()
}

/// Apply every `FUELGUARD_*` override present in `env_vars`.
///
/// Returns the number of overrides applied.
///
/// # Errors
///
/// Returns [`ConfigError::EnvError`] if a numeric override does not parse.
pub fn apply_env_overrides<S: ::std::hash::BuildHasher>(
    merged: &mut toml::Value,
    sources: &mut FieldSources,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<usize> {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        let Some(raw) = env_vars.get(mapping.var_name) else {
            continue;
        };
        let value = match mapping.kind {
            ValueKind::Text => toml::Value::String(raw.trim().to_owned()),
            ValueKind::Integer => {
                let n: i64 = raw.trim().parse().map_err(|_| ConfigError::EnvError {
                    var_name: mapping.var_name.to_owned(),
                    message: format!("expected an integer, got '{raw}'"),
                })?;
                toml::Value::Integer(n)
            },
        };

        debug!(
            var = mapping.var_name,
            field = mapping.field_path,
            "applying env override"
        );
        set_field(merged, mapping.field_path, value);
        sources.insert(mapping.field_path.to_owned(), ConfigLayer::Environment);
        count = count.saturating_add(1);
    }

    Ok(count)
}

/// Set a dotted field path, creating intermediate tables as needed.
fn set_field(root: &mut toml::Value, path: &str, value: toml::Value) {
    let mut current = root;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        let Some(table) = current.as_table_mut() else {
            return;
        };
        if segments.peek().is_none() {
            table.insert(segment.to_owned(), value);
            return;
        }
        current = table
            .entry(segment.to_owned())
            .or_insert(toml::Value::Table(toml::map::Map::new()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let mut merged: toml::Value = toml::from_str("[storage]\nbackend = \"surrealkv\"\n").unwrap();
        let mut sources = FieldSources::new();
        sources.insert("storage.backend".to_owned(), ConfigLayer::User);

        let count = apply_env_overrides(
            &mut merged,
            &mut sources,
            &env(&[("FUELGUARD_STORAGE_BACKEND", "memory")]),
        )
        .unwrap();

        assert_eq!(count, 1);
        assert_eq!(merged["storage"]["backend"].as_str(), Some("memory"));
        assert_eq!(sources.get("storage.backend"), Some(&ConfigLayer::Environment));
    }

    #[test]
    fn test_integer_override() {
        let mut merged = toml::Value::Table(toml::map::Map::new());
        let mut sources = FieldSources::new();

        apply_env_overrides(
            &mut merged,
            &mut sources,
            &env(&[("FUELGUARD_OVERDUE_HOURS", " 48 ")]),
        )
        .unwrap();

        assert_eq!(merged["ledger"]["overdue_threshold_hours"].as_integer(), Some(48));
    }

    #[test]
    fn test_bad_integer_override() {
        let mut merged = toml::Value::Table(toml::map::Map::new());
        let mut sources = FieldSources::new();

        let err = apply_env_overrides(
            &mut merged,
            &mut sources,
            &env(&[("FUELGUARD_OVERDUE_HOURS", "three days")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::EnvError { .. }));
    }

    #[test]
    fn test_unrelated_vars_ignored() {
        let mut merged = toml::Value::Table(toml::map::Map::new());
        let mut sources = FieldSources::new();

        let count = apply_env_overrides(&mut merged, &mut sources, &env(&[("HOME", "/root")])).unwrap();
        assert_eq!(count, 0);
        assert!(sources.is_empty());
    }
}
