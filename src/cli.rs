//! Command-line interface for scorediff

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scorediff")]
#[command(about = "Pull CodingBat class reports and show student progress since the last pull")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to ./scorediff.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Logger threshold selected by `--verbose`.
    pub fn log_level(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a template config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Fetch the current reports, store them and show progress since the previous pull
    Pull {
        #[command(flatten)]
        overrides: RunOverrides,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,
    },

    /// Show progress between the two newest stored snapshots without fetching
    Diff {
        #[command(flatten)]
        overrides: RunOverrides,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,
    },

    /// List stored snapshots, newest first
    List {
        /// Directory holding the snapshot files
        #[arg(long)]
        snapshot_dir: Option<PathBuf>,
    },
}

/// Command-line overrides for config file settings
#[derive(Args, Debug, Clone, Default)]
pub struct RunOverrides {
    /// Leave out students without progress
    #[arg(long)]
    pub suppress_silent: bool,

    /// Skip the custom problem report
    #[arg(long)]
    pub no_custom: bool,

    /// Directory holding the snapshot files
    #[arg(long)]
    pub snapshot_dir: Option<PathBuf>,

    /// Also save the report as a text file next to the snapshots
    #[arg(long)]
    pub report_file: bool,
}

/// Parse output format string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {}. Use 'pretty' or 'json'", s)),
        }
    }
}
