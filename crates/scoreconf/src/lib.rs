//! Configuration loading for expressive.
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/expressive/config.toml` (system)
//! 2. `~/.config/expressive/config.toml` (user)
//! 3. `./expressive.toml` (local override) or the path given on the command line
//! 4. Environment variables (`EXPRESSIVE_*`, plus `RUST_LOG`)
//!
//! Files are merged table by table, so a local file that only sets
//! `[analysis] failure_policy` keeps everything else from the user file.
//!
//! # Example Config
//!
//! ```toml
//! [analysis]
//! primary_part = 0
//! failure_policy = "placeholder"   # or "skip"
//! key_profile = "krumhansl-kessler"
//! parallel = false
//!
//! [import]
//! quantize = true
//! assume_common_time = true
//! split_channels = true
//!
//! [excerpt]
//! chords = 10
//! rhythm = 5
//! pitch_ranges = 5
//! contour = 5
//!
//! [logging]
//! level = "info"
//! ```

pub mod loader;

pub use loader::{discover_config_files_with_override, ConfigSources};

use midi_score::ImportOptions;
use score_analysis::{AnalysisOptions, ExcerptLimits};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Failed to serialize config: {0}")]
    Serialize(String),
}

/// Complete expressive configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpressiveConfig {
    pub analysis: AnalysisOptions,
    pub import: ImportOptions,
    pub excerpt: ExcerptLimits,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `score_analysis=debug`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl ExpressiveConfig {
    /// Load configuration from all sources.
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load configuration with an explicit file in place of `./expressive.toml`.
    ///
    /// System and user configs still load first.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration and report where the values came from.
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let files = loader::discover_config_files_with_override(config_path);
        loader::load_layers(&files, |name| std::env::var(name).ok())
    }

    /// Serialize config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notation::KeyProfile;
    use score_analysis::FailurePolicy;

    #[test]
    fn test_default_config() {
        let config = ExpressiveConfig::default();
        assert_eq!(config.analysis.failure_policy, FailurePolicy::Placeholder);
        assert_eq!(config.analysis.key_profile, KeyProfile::KrumhanslKessler);
        assert_eq!(config.excerpt.chords, 10);
        assert_eq!(config.logging.level, "info");
        assert!(config.import.assume_common_time);
    }

    #[test]
    fn test_to_toml() {
        let config = ExpressiveConfig::default();
        let text = config.to_toml().unwrap();
        assert!(text.contains("[analysis]"));
        assert!(text.contains("failure_policy = \"placeholder\""));
        assert!(text.contains("key_profile = \"krumhansl-kessler\""));
        assert!(text.contains("[excerpt]"));

        let parsed: ExpressiveConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
