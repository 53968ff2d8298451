//! expressive - measure-wise harmonic and melodic analysis of MIDI files
//!
//! Subcommands:
//! - `expressive analyze <file>` - Print the analysis report as JSON
//! - `expressive config` - Print the effective configuration and its sources

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use notation::KeyProfile;
use score_analysis::FailurePolicy;
use scoreconf::ExpressiveConfig;

mod commands;

#[derive(Parser)]
#[command(name = "expressive")]
#[command(about = "Key, harmony, rhythm and contour analysis of MIDI files")]
#[command(version)]
struct Cli {
    /// Config file to load in place of ./expressive.toml
    #[arg(short, long, global = true, env = "EXPRESSIVE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a MIDI file and print the report
    Analyze {
        /// Standard MIDI file (.mid)
        file: PathBuf,

        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,

        /// Print only the bounded summary excerpt
        #[arg(long)]
        excerpt: bool,

        /// Render the excerpt as plain text sections instead of JSON
        #[arg(long, requires = "excerpt")]
        text: bool,

        /// What to do with measures whose chord cannot be labeled (placeholder, skip)
        #[arg(long)]
        policy: Option<FailurePolicy>,

        /// Index of the part analyzed measure by measure
        #[arg(long)]
        primary_part: Option<usize>,

        /// Key profile family (krumhansl-kessler, aarden-essen, temperley-kostka-payne)
        #[arg(long)]
        key_profile: Option<KeyProfile>,

        /// Run key, measure and contour analysis concurrently
        #[arg(long)]
        parallel: bool,
    },

    /// Show the effective configuration as TOML
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, sources) = ExpressiveConfig::load_with_sources_from(cli.config.as_deref())
        .context("Failed to load configuration")?;

    // Logs go to stderr so stdout stays machine readable.
    let filter = tracing_subscriber::EnvFilter::try_new(&config.logging.level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    match cli.command {
        Commands::Analyze {
            file,
            pretty,
            excerpt,
            text,
            policy,
            primary_part,
            key_profile,
            parallel,
        } => {
            commands::analyze(
                &config,
                &commands::AnalyzeArgs {
                    file,
                    pretty,
                    excerpt,
                    text,
                    policy,
                    primary_part,
                    key_profile,
                    parallel,
                },
            )?;
        }
        Commands::Config => {
            commands::show_config(&config, &sources)?;
        }
    }

    Ok(())
}
