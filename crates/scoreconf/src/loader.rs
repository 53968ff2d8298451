//! Config file discovery, layered merging, and environment variable overlay.

use crate::{ConfigError, ExpressiveConfig};
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files, optionally with a CLI override path.
///
/// If `cli_path` is provided and exists, it replaces the local override.
/// Returns paths in load order (system, user, local/cli). Only returns
/// files that exist.
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/expressive/config.toml");
    if system.exists() {
        files.push(system);
    }

    // XDG_CONFIG_HOME or ~/.config
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("expressive/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    let local = PathBuf::from("expressive.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Merge `files` in order over the defaults, then apply environment
/// overrides read through `lookup`.
pub fn load_layers<F>(files: &[PathBuf], lookup: F) -> Result<(ExpressiveConfig, ConfigSources), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut sources = ConfigSources::default();
    let mut merged = toml::Table::new();

    for path in files {
        let table = load_table(path)?;
        // Validate each file on its own so errors name the file at fault.
        into_config(table.clone(), path)?;
        merge_tables(&mut merged, table);
        sources.files.push(path.clone());
    }

    let mut config = into_config(merged, files.last().map_or(Path::new("<defaults>"), |p| p.as_path()))?;
    apply_env_overrides(&mut config, &mut sources, lookup);

    Ok((config, sources))
}

/// Read a TOML file into a raw table.
pub fn load_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    contents
        .parse()
        .map_err(|e: toml::de::Error| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

fn into_config(table: toml::Table, path: &Path) -> Result<ExpressiveConfig, ConfigError> {
    toml::Value::Table(table)
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Merge `overlay` into `base`. Nested tables merge key by key; any other
/// value in the overlay replaces the base value.
pub fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        if let toml::Value::Table(incoming) = value {
            if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                merge_tables(existing, incoming);
                continue;
            }
            base.insert(key, toml::Value::Table(incoming));
        } else {
            base.insert(key, value);
        }
    }
}

/// Apply environment variable overrides to config.
///
/// Values that fail to parse are ignored and the file value stays.
pub fn apply_env_overrides<F>(config: &mut ExpressiveConfig, sources: &mut ConfigSources, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let mut record = |name: &str| sources.env_overrides.push(name.to_string());

    // Analysis
    if let Some(v) = lookup("EXPRESSIVE_PRIMARY_PART") {
        if let Ok(index) = v.trim().parse() {
            config.analysis.primary_part = index;
            record("EXPRESSIVE_PRIMARY_PART");
        }
    }
    if let Some(v) = lookup("EXPRESSIVE_FAILURE_POLICY") {
        if let Ok(policy) = v.parse() {
            config.analysis.failure_policy = policy;
            record("EXPRESSIVE_FAILURE_POLICY");
        }
    }
    if let Some(v) = lookup("EXPRESSIVE_KEY_PROFILE") {
        if let Ok(profile) = v.parse() {
            config.analysis.key_profile = profile;
            record("EXPRESSIVE_KEY_PROFILE");
        }
    }
    if let Some(v) = lookup("EXPRESSIVE_PARALLEL") {
        if let Some(flag) = parse_flag(&v) {
            config.analysis.parallel = flag;
            record("EXPRESSIVE_PARALLEL");
        }
    }

    // Import
    if let Some(v) = lookup("EXPRESSIVE_QUANTIZE") {
        if let Some(flag) = parse_flag(&v) {
            config.import.quantize = flag;
            record("EXPRESSIVE_QUANTIZE");
        }
    }
    if let Some(v) = lookup("EXPRESSIVE_ASSUME_COMMON_TIME") {
        if let Some(flag) = parse_flag(&v) {
            config.import.assume_common_time = flag;
            record("EXPRESSIVE_ASSUME_COMMON_TIME");
        }
    }

    // Logging
    if let Some(v) = lookup("EXPRESSIVE_LOG_LEVEL") {
        config.logging.level = v;
        record("EXPRESSIVE_LOG_LEVEL");
    }
    // Also support RUST_LOG
    if let Some(v) = lookup("RUST_LOG") {
        config.logging.level = v;
        record("RUST_LOG");
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
