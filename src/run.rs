//! Per-series pull and compare pipeline

use crate::config::Config;
use crate::error::{Result, ScorediffError};
use crate::fetch::ReportSource;
use crate::progress::ProgressReporter;
use crate::reconcile::{Comparison, Reconciler, StudentReport};
use crate::snapshot::Snapshot;
use crate::store::{LatestPair, Series, SnapshotStore, StoredSnapshot};
use chrono::NaiveDateTime;

/// What happened when comparing a series' two newest snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesOutcome {
    NoPriorSnapshot,
    Compared(Vec<StudentReport>),
    /// The snapshots could not be reconciled; the newest one is still stored.
    Skipped { reason: String },
}

#[derive(Debug, Clone)]
pub struct SeriesRun {
    pub series: Series,
    pub newer: StoredSnapshot,
    pub older: Option<StoredSnapshot>,
    pub outcome: SeriesOutcome,
}

/// Series processed under `config`, standard first.
pub fn enabled_series(config: &Config) -> Vec<Series> {
    Series::ALL
        .into_iter()
        .filter(|s| *s == Series::Standard || config.process_secondary_series)
        .collect()
}

/// Fetch, persist and compare one series. A table with uneven rows is
/// still persisted as fetched; only its comparison is skipped.
pub fn pull_series(
    store: &SnapshotStore,
    source: &dyn ReportSource,
    series: Series,
    at: NaiveDateTime,
) -> Result<SeriesRun> {
    let table = source.fetch(series)?;
    let (stored, parsed) = match Snapshot::parse(&table) {
        Ok(snapshot) => (store.write(series, &snapshot, at)?, Ok(snapshot)),
        Err(e @ ScorediffError::MalformedInput { .. }) => (store.write_raw(series, &table, at)?, Err(e)),
        Err(e) => return Err(e),
    };

    let older = store
        .list(series)?
        .into_iter()
        .find(|s| s.path != stored.path && s.captured <= stored.captured);

    let outcome = match parsed {
        Ok(snapshot) => compare_with(store, series, &snapshot, older.as_ref())?,
        Err(e) => skipped(series, e),
    };
    Ok(SeriesRun {
        series,
        newer: stored,
        older,
        outcome,
    })
}

/// Compare the two newest stored snapshots of a series without fetching.
/// Returns `None` when the series has no snapshots at all.
pub fn compare_latest(store: &SnapshotStore, series: Series) -> Result<Option<SeriesRun>> {
    let Some(LatestPair { newer, older }) = store.latest_pair(series)? else {
        return Ok(None);
    };

    let outcome = match store.load(&newer) {
        Ok(snapshot) => compare_with(store, series, &snapshot, older.as_ref())?,
        Err(e) if e.is_malformed() => skipped(series, e),
        Err(e) => return Err(e),
    };

    Ok(Some(SeriesRun {
        series,
        newer,
        older,
        outcome,
    }))
}

/// Pull every enabled series in turn.
pub fn pull_all(
    config: &Config,
    store: &SnapshotStore,
    source: &dyn ReportSource,
    at: NaiveDateTime,
    progress: &mut ProgressReporter,
) -> Result<Vec<SeriesRun>> {
    let mut runs = Vec::new();
    for series in enabled_series(config) {
        progress.start(&format!("Fetching {} report...", series));
        let run = pull_series(store, source, series, at);
        progress.finish();
        runs.push(run?);
    }
    Ok(runs)
}

/// Compare the stored snapshots of every enabled series.
pub fn compare_all(config: &Config, store: &SnapshotStore) -> Result<Vec<SeriesRun>> {
    let mut runs = Vec::new();
    for series in enabled_series(config) {
        match compare_latest(store, series)? {
            Some(run) => runs.push(run),
            None => log::warn!("No {} snapshots in {}", series, store.root.display()),
        }
    }
    Ok(runs)
}

fn compare_with(
    store: &SnapshotStore,
    series: Series,
    newer: &Snapshot,
    older: Option<&StoredSnapshot>,
) -> Result<SeriesOutcome> {
    let result = older
        .map(|stored| store.load(stored))
        .transpose()
        .and_then(|previous| Reconciler::compare(newer, previous.as_ref()));

    match result {
        Ok(Comparison::NoPriorSnapshot) => Ok(SeriesOutcome::NoPriorSnapshot),
        Ok(Comparison::Compared(reports)) => Ok(SeriesOutcome::Compared(reports)),
        Err(e) if e.is_malformed() => Ok(skipped(series, e)),
        Err(e) => Err(e),
    }
}

fn skipped(series: Series, error: ScorediffError) -> SeriesOutcome {
    log::error!("Skipping {} comparison: {}", series, error);
    SeriesOutcome::Skipped {
        reason: error.to_string(),
    }
}
