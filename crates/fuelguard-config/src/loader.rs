//! Config file discovery and layered loading.
//!
//! 1. Parse embedded `defaults.toml`
//! 2. Merge `<home>/config.toml` (user), where home is `$FUELGUARD_HOME`
//!    or `~/.fuelguard`
//! 3. Merge the explicit `--config` file, which must exist
//! 4. Apply `FUELGUARD_*` env overrides
//! 5. Deserialize, fill the default storage path, validate

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{HOME_VAR, apply_env_overrides, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::{ConfigLayer, FieldSources, deep_merge_tracking, record_leaves};
use crate::show::ResolvedConfig;
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Name of the ledger database inside the fuelguard home.
const LEDGER_DB: &str = "ledger.db";

/// Merged TOML tree plus the bookkeeping `config show` needs.
struct Layers {
    merged: toml::Value,
    sources: FieldSources,
    files: Vec<String>,
}

impl Layers {
    fn from_defaults() -> ConfigResult<Self> {
        let merged = parse(DEFAULTS_TOML, Path::new("<embedded defaults>"))?;
        let mut sources = FieldSources::new();
        record_leaves(&merged, "", &ConfigLayer::Defaults, &mut sources);
        Ok(Self {
            merged,
            sources,
            files: Vec::new(),
        })
    }

    fn overlay(&mut self, layer: &ConfigLayer, path: &Path, value: &toml::Value) {
        deep_merge_tracking(&mut self.merged, value, "", layer, &mut self.sources);
        self.files.push(path.display().to_string());
        info!(path = %path.display(), layer = %layer, "Loaded config file");
    }
}

/// Load configuration from the process environment.
///
/// `home_override` replaces the fuelguard home directory (the directory
/// holding `config.toml` and the default database).
///
/// # Errors
///
/// Returns a [`ConfigError`] if a file is missing or malformed, an env
/// override is invalid, or the merged configuration fails validation.
pub fn load(explicit: Option<&Path>, home_override: Option<&Path>) -> ConfigResult<ResolvedConfig> {
    load_with_env(explicit, home_override, &collect_env_vars())
}

/// Load configuration against an explicit environment snapshot.
///
/// # Errors
///
/// See [`load`].
pub fn load_with_env<S: ::std::hash::BuildHasher>(
    explicit: Option<&Path>,
    home_override: Option<&Path>,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<ResolvedConfig> {
    let home = match home_override {
        Some(h) => h.to_path_buf(),
        None => fuelguard_home(env_vars)?,
    };

    let mut layers = Layers::from_defaults()?;

    let user_path = home.join("config.toml");
    if let Some(value) = read_optional(&user_path)? {
        layers.overlay(&ConfigLayer::User, &user_path, &value);
    }

    if let Some(path) = explicit {
        // A file named on the command line has to exist.
        let value = read_optional(path)?.ok_or_else(|| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })?;
        layers.overlay(&ConfigLayer::Explicit, path, &value);
    }

    let Layers {
        mut merged,
        mut sources,
        files,
    } = layers;

    let overridden = apply_env_overrides(&mut merged, &mut sources, env_vars)?;
    if overridden > 0 {
        debug!(count = overridden, "Applied environment overrides");
    }

    let mut config: Config = merged.try_into().map_err(|e| ConfigError::ParseError {
        path: PathBuf::from("<merged config>"),
        source: e,
    })?;

    if config.storage.path.is_none() {
        config.storage.path = Some(home.join(LEDGER_DB).display().to_string());
        sources.insert("storage.path".to_owned(), ConfigLayer::Defaults);
    }

    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        field_sources: sources,
        loaded_files: files,
        home,
    })
}

/// Load a config from a single file (no layering, no env overrides).
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed or
/// validated.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    check_size(path, &content)?;
    let config: Config = toml::from_str(&content).map_err(|source| ConfigError::ParseError {
        path: path.to_path_buf(),
        source,
    })?;
    validate::validate(&config)?;
    Ok(config)
}

/// The fuelguard home: `$FUELGUARD_HOME` if set, else `~/.fuelguard`.
///
/// # Errors
///
/// Returns [`ConfigError::NoHomeDir`] if neither can be determined.
pub fn fuelguard_home<S: ::std::hash::BuildHasher>(
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<PathBuf> {
    if let Some(dir) = env_vars.get(HOME_VAR).filter(|d| !d.trim().is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    directories::BaseDirs::new()
        .map(|d| d.home_dir().join(".fuelguard"))
        .ok_or(ConfigError::NoHomeDir)
}

fn parse(content: &str, origin: &Path) -> ConfigResult<toml::Value> {
    toml::from_str(content).map_err(|source| ConfigError::ParseError {
        path: origin.to_path_buf(),
        source,
    })
}

fn check_size(path: &Path, content: &str) -> ConfigResult<()> {
    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "file is {} bytes; the limit is {MAX_CONFIG_FILE_SIZE}",
                content.len()
            ),
        });
    }
    Ok(())
}

/// Parse a config file, or `None` when it does not exist.
fn read_optional(path: &Path) -> ConfigResult<Option<toml::Value>> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            check_size(path, &content)?;
            parse(&content, path).map(Some)
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No config file");
            Ok(None)
        },
        Err(source) => Err(ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        }),
    }
}
