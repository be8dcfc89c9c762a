//! # scorediff
//!
//! Pulls CodingBat class reports into timestamped CSV snapshots and reports
//! which students made progress between the two most recent pulls.

pub mod cli;
pub mod commands;
pub mod config;
pub mod csv;
pub mod error;
pub mod fetch;
pub mod html;
pub mod output;
pub mod progress;
pub mod reconcile;
pub mod run;
pub mod snapshot;
pub mod store;

pub use config::Config;
pub use error::{Result, ScorediffError};
pub use output::ReportRenderer;
pub use reconcile::{Comparison, Reconciler, SectionDelta, StudentReport};
pub use snapshot::{RawTable, Snapshot, StudentRecord};
pub use store::{Series, SnapshotStore, StoredSnapshot};
