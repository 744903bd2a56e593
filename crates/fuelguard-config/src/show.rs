//! Source-annotated display for `config show`.

use std::fmt::{self, Write as _};
use std::path::PathBuf;

use crate::merge::FieldSources;
use crate::types::Config;

/// A resolved configuration together with source annotations.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The final merged configuration.
    pub config: Config,
    /// Dotted field path → which layer set the value.
    pub field_sources: FieldSources,
    /// Config file paths that were loaded (in precedence order).
    pub loaded_files: Vec<String>,
    /// The fuelguard home directory used for discovery.
    pub home: PathBuf,
}

/// Output format for `config show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowFormat {
    /// TOML with inline comments showing source.
    Toml,
    /// JSON (for programmatic consumption).
    Json,
}

impl ResolvedConfig {
    /// Render the resolved config, optionally limited to one section.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or `section` does not exist.
    pub fn show(&self, format: ShowFormat, section: Option<&str>) -> Result<String, fmt::Error> {
        let tree = toml::Value::try_from(&self.config).map_err(|_| fmt::Error)?;
        let (value, prefix) = match section {
            Some(name) => (
                tree.as_table()
                    .and_then(|t| t.get(name))
                    .ok_or(fmt::Error)?
                    .clone(),
                name,
            ),
            None => (tree, ""),
        };

        match format {
            ShowFormat::Json => serde_json::to_string_pretty(&value).map_err(|_| fmt::Error),
            ShowFormat::Toml => self.show_toml(&value, prefix),
        }
    }

    fn show_toml(&self, value: &toml::Value, prefix: &str) -> Result<String, fmt::Error> {
        let toml_str = toml::to_string_pretty(value).map_err(|_| fmt::Error)?;

        let mut output = String::new();
        output.push_str("# Resolved fuelguard configuration\n");
        output.push_str("# Source annotations: [defaults] [user] [--config] [env]\n");
        writeln!(output, "# Home: {}", self.home.display())?;
        if !self.loaded_files.is_empty() {
            output.push_str("#\n# Loaded files (in precedence order):\n");
            for (i, path) in self.loaded_files.iter().enumerate() {
                writeln!(output, "#   {}. {path}", i.saturating_add(1))?;
            }
        }
        output.push('\n');

        let mut section = prefix.to_owned();
        for line in toml_str.lines() {
            let trimmed = line.trim();
            if let Some(header) = trimmed.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
                section = if prefix.is_empty() {
                    header.to_owned()
                } else {
                    format!("{prefix}.{header}")
                };
            }
            match self.annotate_line(trimmed, &section) {
                Some(annotation) => writeln!(output, "{line}  # {annotation}")?,
                None => writeln!(output, "{line}")?,
            }
        }

        Ok(output)
    }

    /// Source annotation for a `key = value` line within `section`.
    fn annotate_line(&self, trimmed: &str, section: &str) -> Option<String> {
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('[') {
            return None;
        }
        let key = trimmed.split('=').next()?.trim();
        let field_path = if section.is_empty() {
            key.to_owned()
        } else {
            format!("{section}.{key}")
        };
        self.field_sources
            .get(&field_path)
            .map(|layer| format!("[{layer}]"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::ConfigLayer;

    fn resolved() -> ResolvedConfig {
        let mut field_sources = FieldSources::new();
        field_sources.insert("ledger.max_append_attempts".to_owned(), ConfigLayer::User);
        field_sources.insert("logging.level".to_owned(), ConfigLayer::Environment);
        ResolvedConfig {
            config: Config::default(),
            field_sources,
            loaded_files: vec!["/home/a/.fuelguard/config.toml".to_owned()],
            home: PathBuf::from("/home/a/.fuelguard"),
        }
    }

    #[test]
    fn test_show_toml_annotates_sources() {
        let output = resolved().show(ShowFormat::Toml, None).unwrap();
        assert!(output.contains("Resolved fuelguard configuration"));
        assert!(output.contains("max_append_attempts = 3  # [user]"));
        assert!(output.contains("level = \"warn\"  # [env]"));
        assert!(output.contains("1. /home/a/.fuelguard/config.toml"));
    }

    #[test]
    fn test_show_json_default() {
        let output = resolved().show(ShowFormat::Json, None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["ledger"]["overdue_threshold_hours"], 72);
    }

    #[test]
    fn test_show_section() {
        let output = resolved().show(ShowFormat::Toml, Some("ledger")).unwrap();
        assert!(output.contains("max_append_attempts = 3  # [user]"));
        assert!(!output.contains("directives"));
    }

    #[test]
    fn test_show_unknown_section() {
        assert!(resolved().show(ShowFormat::Json, Some("budget")).is_err());
    }
}
