//! Output formatting utilities

use crate::error::Result;
use crate::reconcile::StudentReport;
use crate::run::{SeriesOutcome, SeriesRun};
use crate::store::{Series, StoredSnapshot};

/// Turns reconciliation results into report lines.
pub struct ReportRenderer;

impl ReportRenderer {
    /// Render student reports in order, one block per student followed by a
    /// blank line. Silent students are left out when `suppress_silent` is set.
    pub fn render(reports: &[StudentReport], suppress_silent: bool) -> Vec<String> {
        let mut lines = Vec::new();

        for report in reports {
            let student = format!("{} <{}>", report.name, report.identifier);

            if report.has_progress() {
                for delta in &report.deltas {
                    lines.push(format!(
                        "{} has done {} more problems in section {} -- total = {}",
                        student, delta.delta, delta.section, delta.total
                    ));
                }
                lines.push(String::new());
            } else if !suppress_silent {
                lines.push(format!("{} hasn't done any problems since the last score pull.", student));
                lines.push(String::new());
            }
        }

        lines
    }

    /// Render a whole series run, including the informational header.
    pub fn render_run(run: &SeriesRun, suppress_silent: bool) -> Vec<String> {
        match &run.outcome {
            SeriesOutcome::NoPriorSnapshot => vec![no_prior_snapshot_message(&run.newer)],
            SeriesOutcome::Compared(reports) => {
                let mut lines = Vec::with_capacity(reports.len() * 2 + 2);
                if let Some(older) = &run.older {
                    lines.push(format!("Generating changes since \"{}\"", older.path.display()));
                    lines.push(String::new());
                }
                lines.extend(Self::render(reports, suppress_silent));
                lines
            }
            SeriesOutcome::Skipped { reason } => {
                vec![format!("Could not compare {} snapshots: {}", run.series, reason)]
            }
        }
    }
}

/// Shown instead of a report when a series has only one snapshot.
pub fn no_prior_snapshot_message(stored: &StoredSnapshot) -> String {
    format!(
        "First set of CodingBat scores have been read and stored in {}.",
        stored.path.display()
    )
}

/// Pretty printer for terminal output
pub struct PrettyPrinter;

impl PrettyPrinter {
    pub fn print_lines(lines: &[String]) {
        for line in lines {
            println!("{}", line);
        }
    }

    /// Print stored snapshots of a series, newest first
    pub fn print_snapshot_list(series: Series, snapshots: &[StoredSnapshot]) {
        if snapshots.is_empty() {
            println!("No {} snapshots found.", series);
            return;
        }

        println!("📸 {} snapshots ({}):", series, snapshots.len());
        for (i, snapshot) in snapshots.iter().enumerate() {
            let prefix = if i == snapshots.len() - 1 { "└─" } else { "├─" };
            let name = snapshot
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            println!("{} {}  {}", prefix, snapshot.captured.format("%Y-%m-%d %H:%M:%S"), name);
        }
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format any serializable data as JSON
    pub fn format<T: serde::Serialize + ?Sized>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }

    /// Format series runs as a JSON array, one object per series.
    pub fn format_runs(runs: &[SeriesRun], suppress_silent: bool) -> Result<String> {
        let values: Vec<serde_json::Value> = runs
            .iter()
            .map(|run| Self::run_value(run, suppress_silent))
            .collect();
        Self::format(&values)
    }

    fn run_value(run: &SeriesRun, suppress_silent: bool) -> serde_json::Value {
        let (status, students, reason) = match &run.outcome {
            SeriesOutcome::NoPriorSnapshot => ("no_prior_snapshot", Vec::new(), None),
            SeriesOutcome::Compared(reports) => {
                let students: Vec<&StudentReport> = reports
                    .iter()
                    .filter(|r| !(suppress_silent && r.is_silent()))
                    .collect();
                ("compared", students, None)
            }
            SeriesOutcome::Skipped { reason } => ("skipped", Vec::new(), Some(reason.as_str())),
        };

        serde_json::json!({
            "series": run.series,
            "newer": run.newer.path.display().to_string(),
            "older": run.older.as_ref().map(|o| o.path.display().to_string()),
            "status": status,
            "reason": reason,
            "students": students,
        })
    }
}
