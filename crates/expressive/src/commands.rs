//! CLI command implementations

use std::path::PathBuf;

use anyhow::{Context, Result};
use notation::KeyProfile;
use score_analysis::{AnalysisOptions, FailurePolicy, ScoreAnalyzer};
use scoreconf::{ConfigSources, ExpressiveConfig};
use serde::Serialize;
use tracing::debug;

/// Command-line overrides for one analysis.
pub struct AnalyzeArgs {
    pub file: PathBuf,
    pub pretty: bool,
    pub excerpt: bool,
    pub text: bool,
    pub policy: Option<FailurePolicy>,
    pub primary_part: Option<usize>,
    pub key_profile: Option<KeyProfile>,
    pub parallel: bool,
}

impl AnalyzeArgs {
    /// Config values with flags layered on top.
    fn options(&self, config: &ExpressiveConfig) -> AnalysisOptions {
        let mut options = config.analysis.clone();
        if let Some(policy) = self.policy {
            options.failure_policy = policy;
        }
        if let Some(index) = self.primary_part {
            options.primary_part = index;
        }
        if let Some(profile) = self.key_profile {
            options.key_profile = profile;
        }
        if self.parallel {
            options.parallel = true;
        }
        options
    }
}

/// Import a MIDI file, analyze it and print the report
pub fn analyze(config: &ExpressiveConfig, args: &AnalyzeArgs) -> Result<()> {
    let path = args.file.display();
    let bytes = std::fs::read(&args.file).with_context(|| format!("Failed to read {}", path))?;

    let score = midi_score::import(&bytes, &config.import)
        .with_context(|| format!("Failed to import {}", path))?;
    debug!(parts = score.parts.len(), notes = score.note_count(), "score imported");

    let analyzer = ScoreAnalyzer::new(args.options(config));
    let report = analyzer
        .analyze(&score)
        .with_context(|| format!("Failed to analyze {}", path))?;

    if args.excerpt {
        let excerpt = report.excerpt(&config.excerpt);
        if args.text {
            print!("{}", excerpt);
        } else {
            println!("{}", to_json(&excerpt, args.pretty)?);
        }
    } else {
        println!("{}", to_json(&report, args.pretty)?);
    }

    Ok(())
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.context("Failed to serialize report")
}

/// Print the effective configuration, preceded by where it came from
pub fn show_config(config: &ExpressiveConfig, sources: &ConfigSources) -> Result<()> {
    if sources.files.is_empty() {
        println!("# No config files found, using defaults");
    }
    for file in &sources.files {
        println!("# Loaded: {}", file.display());
    }
    for var in &sources.env_overrides {
        println!("# Env override: {}", var);
    }
    println!();
    print!("{}", config.to_toml()?);
    Ok(())
}
