//! Command implementations for scorediff CLI

use crate::cli::{Commands, OutputFormat, RunOverrides};
use crate::config::{Config, DEFAULT_CONFIG_FILE};
use crate::error::{Result, ScorediffError};
use crate::fetch::CodingBatClient;
use crate::output::{JsonFormatter, PrettyPrinter, ReportRenderer};
use crate::progress::ProgressReporter;
use crate::run::{self, SeriesRun};
use crate::store::SnapshotStore;
use chrono::Local;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Execute a command
pub fn execute_command(command: Commands, config_path: Option<&Path>) -> Result<()> {
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    match command {
        Commands::Init { force } => init_command(&config_path, force),
        Commands::Pull { overrides, format } => {
            let config = load_config(&config_path, &overrides)?;
            pull_command(&config, &format)
        }
        Commands::Diff { overrides, format } => {
            let config = load_config(&config_path, &overrides)?;
            diff_command(&config, &format)
        }
        Commands::List { snapshot_dir } => {
            let overrides = RunOverrides {
                snapshot_dir,
                ..RunOverrides::default()
            };
            let config = load_config(&config_path, &overrides)?;
            list_command(&config)
        }
    }
}

/// Load the config file and apply command-line overrides
pub fn load_config(path: &Path, overrides: &RunOverrides) -> Result<Config> {
    let mut config = Config::load(path)?;
    apply_overrides(&mut config, overrides);
    Ok(config)
}

pub fn apply_overrides(config: &mut Config, overrides: &RunOverrides) {
    if overrides.suppress_silent {
        config.suppress_silent_students = true;
    }
    if overrides.no_custom {
        config.process_secondary_series = false;
    }
    if overrides.report_file {
        config.write_report_file = true;
    }
    if let Some(dir) = &overrides.snapshot_dir {
        config.snapshot_directory = dir.clone();
    }
}

/// Write a template config file
fn init_command(config_path: &Path, force: bool) -> Result<()> {
    Config::write_template(config_path, force)?;

    println!("✅ Wrote config template to: {}", config_path.display());
    println!("📝 Fill in your CodingBat teacher login before running 'scorediff pull'");

    Ok(())
}

/// Fetch, store and compare every enabled series
fn pull_command(config: &Config, format: &str) -> Result<()> {
    let format = OutputFormat::parse(format).map_err(ScorediffError::invalid_input)?;
    let credentials = config.credentials()?;
    let store = SnapshotStore::open(config.snapshot_directory.clone())?;

    let show_progress = format == OutputFormat::Pretty && std::io::stderr().is_terminal();
    let mut progress = ProgressReporter::new(show_progress);

    progress.start("Logging in to CodingBat...");
    let client = CodingBatClient::login(&credentials.username, &credentials.password);
    progress.finish();
    let client = client?;

    let at = Local::now().naive_local();
    let runs = run::pull_all(config, &store, &client, at, &mut progress)?;

    emit_runs(config, &store, &runs, &format)
}

/// Compare the stored snapshots of every enabled series
fn diff_command(config: &Config, format: &str) -> Result<()> {
    let format = OutputFormat::parse(format).map_err(ScorediffError::invalid_input)?;
    let store = SnapshotStore::new(config.snapshot_directory.clone());

    let runs = run::compare_all(config, &store)?;
    if runs.is_empty() {
        return Err(ScorediffError::store(format!(
            "no snapshots found in {}",
            store.root.display()
        )));
    }

    emit_runs(config, &store, &runs, &format)
}

/// List stored snapshots of every enabled series
fn list_command(config: &Config) -> Result<()> {
    let store = SnapshotStore::new(config.snapshot_directory.clone());

    for series in run::enabled_series(config) {
        let snapshots = store.list(series)?;
        PrettyPrinter::print_snapshot_list(series, &snapshots);
    }

    Ok(())
}

/// Print the runs and, if configured, save each rendered report
pub fn emit_runs(config: &Config, store: &SnapshotStore, runs: &[SeriesRun], format: &OutputFormat) -> Result<()> {
    let suppress = config.suppress_silent_students;

    if config.write_report_file {
        for run in runs {
            let lines = ReportRenderer::render_run(run, suppress);
            store.write_report(run.series, run.newer.captured, &lines)?;
        }
    }

    match format {
        OutputFormat::Pretty => {
            for run in runs {
                PrettyPrinter::print_lines(&ReportRenderer::render_run(run, suppress));
            }
        }
        OutputFormat::Json => println!("{}", JsonFormatter::format_runs(runs, suppress)?),
    }

    Ok(())
}
