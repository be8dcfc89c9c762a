//! Directory-backed store of timestamped snapshot files

use crate::csv;
use crate::error::{Result, ScorediffError};
use crate::snapshot::{RawTable, Snapshot};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Timestamp embedded in snapshot file names. Sorts chronologically as text.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

const SNAPSHOT_PREFIX: &str = "codingbat_scores_";
const SNAPSHOT_SUFFIX: &str = ".csv";
const CUSTOM_PREFIX: &str = "custom_";
const REPORT_PREFIX: &str = "codingbat_scores_report_";

/// Report variant; each one has an independent snapshot history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Series {
    Standard,
    Custom,
}

impl Series {
    pub const ALL: [Series; 2] = [Series::Standard, Series::Custom];

    pub fn file_prefix(&self) -> String {
        match self {
            Series::Standard => SNAPSHOT_PREFIX.to_string(),
            Series::Custom => format!("{}{}", CUSTOM_PREFIX, SNAPSHOT_PREFIX),
        }
    }

    pub fn snapshot_file_name(&self, at: NaiveDateTime) -> String {
        format!("{}{}{}", self.file_prefix(), at.format(TIMESTAMP_FORMAT), SNAPSHOT_SUFFIX)
    }

    pub fn report_file_name(&self, at: NaiveDateTime) -> String {
        match self {
            Series::Standard => format!("{}{}.txt", REPORT_PREFIX, at.format(TIMESTAMP_FORMAT)),
            Series::Custom => format!("{}{}_custom.txt", REPORT_PREFIX, at.format(TIMESTAMP_FORMAT)),
        }
    }

    /// Capture time encoded in `file_name`, if it belongs to this series.
    pub fn parse_file_name(&self, file_name: &str) -> Option<NaiveDateTime> {
        let stamp = file_name
            .strip_prefix(self.file_prefix().as_str())?
            .strip_suffix(SNAPSHOT_SUFFIX)?;
        NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Series::Standard => write!(f, "standard"),
            Series::Custom => write!(f, "custom"),
        }
    }
}

/// A snapshot file on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredSnapshot {
    pub series: Series,
    pub path: PathBuf,
    pub captured: NaiveDateTime,
}

/// The newest snapshot of a series and the one before it, if any.
#[derive(Debug, Clone)]
pub struct LatestPair {
    pub newer: StoredSnapshot,
    pub older: Option<StoredSnapshot>,
}

/// Snapshot files for every series live side by side in one directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    pub root: PathBuf,
}

impl SnapshotStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Open the store, creating the directory if needed.
    pub fn open(root: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root)?;
        Ok(Self::new(root))
    }

    pub fn snapshot_path(&self, series: Series, at: NaiveDateTime) -> PathBuf {
        self.root.join(series.snapshot_file_name(at))
    }

    pub fn report_path(&self, series: Series, at: NaiveDateTime) -> PathBuf {
        self.root.join(series.report_file_name(at))
    }

    /// Persist `snapshot` as the newest member of `series`.
    ///
    /// Files are created exclusively; an existing file with the same
    /// timestamp is never overwritten.
    pub fn write(&self, series: Series, snapshot: &Snapshot, at: NaiveDateTime) -> Result<StoredSnapshot> {
        let stored = self.write_rows(series, &snapshot.serialize(), at)?;
        log::info!("Stored {} snapshot with {} students at {}", series, snapshot.len(), stored.path.display());
        Ok(stored)
    }

    /// Persist a table that did not parse as a snapshot, cell for cell.
    pub fn write_raw(&self, series: Series, table: &RawTable, at: NaiveDateTime) -> Result<StoredSnapshot> {
        let stored = self.write_rows(series, table, at)?;
        log::warn!("Stored unparsed {} table with {} rows at {}", series, table.len(), stored.path.display());
        Ok(stored)
    }

    fn write_rows(&self, series: Series, table: &RawTable, at: NaiveDateTime) -> Result<StoredSnapshot> {
        let path = self.snapshot_path(series, at);

        let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(ScorediffError::store(format!(
                    "snapshot already exists: {}",
                    path.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let mut writer = BufWriter::new(file);
        csv::write_table(&mut writer, table)?;

        Ok(StoredSnapshot {
            series,
            path,
            captured: at,
        })
    }

    /// All snapshots of `series`, newest first.
    pub fn list(&self, series: Series) -> Result<Vec<StoredSnapshot>> {
        let mut stored = Vec::new();

        if !self.root.exists() {
            return Ok(stored);
        }

        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            if let Some(captured) = series.parse_file_name(name) {
                stored.push(StoredSnapshot {
                    series,
                    path: entry.path().to_path_buf(),
                    captured,
                });
            }
        }

        stored.sort_by(|a, b| b.captured.cmp(&a.captured).then_with(|| b.path.cmp(&a.path)));
        Ok(stored)
    }

    pub fn load(&self, stored: &StoredSnapshot) -> Result<Snapshot> {
        load_snapshot(&stored.path)
    }

    /// The two newest snapshots of `series`, or `None` if it has none.
    pub fn latest_pair(&self, series: Series) -> Result<Option<LatestPair>> {
        let mut listed = self.list(series)?.into_iter();

        Ok(listed.next().map(|newer| LatestPair {
            newer,
            older: listed.next(),
        }))
    }

    /// Write rendered report lines next to the snapshots.
    pub fn write_report(&self, series: Series, at: NaiveDateTime, lines: &[String]) -> Result<PathBuf> {
        let path = self.report_path(series, at);
        let mut writer = BufWriter::new(fs::File::create(&path)?);
        for line in lines {
            writeln!(writer, "{}", line)?;
        }
        writer.flush()?;

        log::info!("Wrote {} report to {}", series, path.display());
        Ok(path)
    }
}

/// Read and parse one snapshot file.
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let text = fs::read_to_string(path)?;
    Snapshot::parse(&csv::parse_rows(&text))
}
