//! Reconciliation of two snapshots into per-student progress

use crate::error::{Result, ScorediffError};
use crate::snapshot::{Snapshot, StudentRecord, TOTAL_COLUMN};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Progress in one section between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDelta {
    pub section: String,
    /// Problems completed since the older snapshot.
    pub delta: u64,
    /// Count in the newer snapshot.
    pub total: u64,
}

/// Reconciliation result for one student of the newer snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentReport {
    pub name: String,
    pub identifier: String,
    /// The student has no row in the older snapshot.
    pub newly_observed: bool,
    pub deltas: Vec<SectionDelta>,
}

impl StudentReport {
    pub fn has_progress(&self) -> bool {
        !self.deltas.is_empty()
    }

    pub fn is_silent(&self) -> bool {
        self.deltas.is_empty()
    }
}

/// Outcome of comparing the newest snapshot of a series with its predecessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison {
    /// Fewer than two snapshots exist; nothing was reconciled.
    NoPriorSnapshot,
    Compared(Vec<StudentReport>),
}

pub struct Reconciler;

impl Reconciler {
    /// Compare `newer` against `older` if there is one.
    pub fn compare(newer: &Snapshot, older: Option<&Snapshot>) -> Result<Comparison> {
        match older {
            Some(older) => Ok(Comparison::Compared(Self::reconcile(newer, older)?)),
            None => Ok(Comparison::NoPriorSnapshot),
        }
    }

    /// Compute per-student deltas, ordered by (name, identifier).
    ///
    /// Students are matched on identifier only. Sections only known to the
    /// older snapshot are ignored, sections only known to the newer one count
    /// from zero. Students missing from `newer` are not reported.
    pub fn reconcile(newer: &Snapshot, older: &Snapshot) -> Result<Vec<StudentReport>> {
        index_by_identifier(newer, "newer")?;
        let older_index = index_by_identifier(older, "older")?;

        let mut ordered: Vec<&StudentRecord> = newer.students().iter().collect();
        ordered.sort_by(|a, b| (&a.name, &a.identifier).cmp(&(&b.name, &b.identifier)));

        let reports = ordered
            .into_iter()
            .map(|student| match older_index.get(student.identifier.as_str()) {
                Some(previous) => compare_student(student, previous, older),
                None => new_student(student),
            })
            .collect::<Vec<_>>();

        log::debug!(
            "Reconciled {} students, {} with progress",
            reports.len(),
            reports.iter().filter(|r| r.has_progress()).count()
        );

        Ok(reports)
    }
}

fn index_by_identifier<'a>(snapshot: &'a Snapshot, label: &str) -> Result<HashMap<&'a str, &'a StudentRecord>> {
    let mut index = HashMap::with_capacity(snapshot.len());
    for student in snapshot.students() {
        if index.insert(student.identifier.as_str(), student).is_some() {
            return Err(ScorediffError::malformed_input(format!(
                "identifier '{}' appears more than once in the {} snapshot",
                student.identifier, label
            )));
        }
    }
    Ok(index)
}

fn is_section(column: &str) -> bool {
    column != TOTAL_COLUMN
}

fn new_student(student: &StudentRecord) -> StudentReport {
    let deltas = student
        .counts
        .iter()
        .filter(|(section, &count)| is_section(section) && count > 0)
        .map(|(section, &count)| SectionDelta {
            section: section.clone(),
            delta: count,
            total: count,
        })
        .collect();

    StudentReport {
        name: student.name.clone(),
        identifier: student.identifier.clone(),
        newly_observed: true,
        deltas,
    }
}

fn compare_student(student: &StudentRecord, previous: &StudentRecord, older: &Snapshot) -> StudentReport {
    let mut deltas = Vec::new();

    for (section, &new) in student.counts.iter().filter(|(s, _)| is_section(s)) {
        let old = if older.has_section(section) {
            previous.count(section).unwrap_or(0)
        } else {
            0
        };

        if new > old {
            deltas.push(SectionDelta {
                section: section.clone(),
                delta: new - old,
                total: new,
            });
        } else if new < old {
            log::warn!(
                "{} <{}> went from {} to {} problems in section {}",
                student.name,
                student.identifier,
                old,
                new,
                section
            );
        }
    }

    StudentReport {
        name: student.name.clone(),
        identifier: student.identifier.clone(),
        newly_observed: false,
        deltas,
    }
}
