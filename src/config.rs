//! Run configuration

use crate::error::{Result, ScorediffError};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "scorediff.json";

/// Everything a run needs, passed explicitly from the entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub username: String,
    pub password: String,
    /// Two-line file (username, then password) that takes precedence over
    /// the inline credentials. Relative paths resolve against the config
    /// file's directory.
    pub credentials_file: Option<PathBuf>,
    /// Leave students without progress out of the report.
    pub suppress_silent_students: bool,
    /// Also fetch and compare the custom problem report.
    pub process_secondary_series: bool,
    pub snapshot_directory: PathBuf,
    /// Save each rendered report next to the snapshots.
    pub write_report_file: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            credentials_file: None,
            suppress_silent_students: false,
            process_secondary_series: true,
            snapshot_directory: PathBuf::from("."),
            write_report_file: false,
        }
    }
}

/// Login credentials for the report service.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Load a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let mut config: Config = serde_json::from_str(&content)
            .map_err(|e| ScorediffError::config(format!("{}: {}", path.display(), e)))?;

        if let (Some(creds), Some(dir)) = (&config.credentials_file, path.parent()) {
            if creds.is_relative() {
                config.credentials_file = Some(dir.join(creds));
            }
        }

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Resolve the credentials, reading the credentials file if one is set.
    pub fn credentials(&self) -> Result<Credentials> {
        let credentials = match &self.credentials_file {
            Some(path) => read_credentials_file(path)?,
            None => Credentials {
                username: self.username.clone(),
                password: self.password.clone(),
            },
        };

        if credentials.username.is_empty() {
            return Err(ScorediffError::config(
                "no username configured; set 'username' or 'credentials_file'",
            ));
        }

        Ok(credentials)
    }

    /// Write a template config file.
    pub fn write_template(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            return Err(ScorediffError::config(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            )));
        }

        let template = Config {
            username: "username".to_string(),
            password: "password".to_string(),
            ..Config::default()
        };
        fs::write(path, serde_json::to_string_pretty(&template)?)?;

        log::info!("Wrote config template to {}", path.display());
        Ok(())
    }
}

fn read_credentials_file(path: &Path) -> Result<Credentials> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading credentials file {}", path.display()))?;
    let mut lines = content.lines().map(str::trim);

    Ok(Credentials {
        username: lines.next().unwrap_or_default().to_string(),
        password: lines.next().unwrap_or_default().to_string(),
    })
}
