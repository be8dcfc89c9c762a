//! In-memory model of one score snapshot

use crate::error::{Result, ScorediffError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A table of text cells, header row first.
pub type RawTable = Vec<Vec<String>>;

/// Header of the identifier column (the student's login, usually an email).
pub const IDENTIFIER_COLUMN: &str = "User ID";
/// Header of the display name column.
pub const NAME_COLUMN: &str = "Memo";
/// Header of the trailing aggregate column.
pub const TOTAL_COLUMN: &str = "Total";

/// Number of leading identity columns in every snapshot table.
const IDENTITY_COLUMNS: usize = 2;

/// One student's row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub name: String,
    pub identifier: String,
    /// Problem counts keyed by column name, in column order.
    pub counts: IndexMap<String, u64>,
}

impl StudentRecord {
    pub fn new<I, S>(name: impl Into<String>, identifier: impl Into<String>, counts: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            identifier: identifier.into(),
            counts: counts.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn count(&self, section: &str) -> Option<u64> {
        self.counts.get(section).copied()
    }
}

/// One captured score table: column names plus student rows in table order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    columns: Vec<String>,
    students: Vec<StudentRecord>,
}

impl Snapshot {
    /// Build a snapshot from a header and records.
    ///
    /// Every record must carry exactly the non-identity columns as counts, in
    /// header order.
    pub fn new(columns: Vec<String>, students: Vec<StudentRecord>) -> Result<Self> {
        validate_columns(&columns)?;

        let sections = &columns[IDENTITY_COLUMNS..];
        for (index, student) in students.iter().enumerate() {
            if !student.counts.keys().eq(sections.iter()) {
                return Err(ScorediffError::malformed_input(format!(
                    "student '{}' (row {}) does not match the header columns",
                    student.identifier,
                    index + 1
                )));
            }
        }

        Ok(Self { columns, students })
    }

    /// Parse a raw table whose first row is the header.
    ///
    /// Identity cells are kept verbatim; every other cell is a problem count.
    pub fn parse(table: &RawTable) -> Result<Self> {
        let (header, rows) = table
            .split_first()
            .ok_or_else(|| ScorediffError::malformed_input("table has no header row"))?;
        validate_columns(header)?;

        let sections = &header[IDENTITY_COLUMNS..];
        let mut students = Vec::with_capacity(rows.len());

        for (index, row) in rows.iter().enumerate() {
            let row_number = index + 1;
            if row.len() != header.len() {
                return Err(ScorediffError::malformed_input(format!(
                    "row {} has {} cells but the header has {} columns",
                    row_number,
                    row.len(),
                    header.len()
                )));
            }

            let mut counts = IndexMap::with_capacity(sections.len());
            for (section, cell) in sections.iter().zip(&row[IDENTITY_COLUMNS..]) {
                let value = parse_count(cell)
                    .ok_or_else(|| ScorediffError::malformed_cell(row_number, section.as_str(), cell.as_str()))?;
                counts.insert(section.clone(), value);
            }

            students.push(StudentRecord {
                identifier: row[0].clone(),
                name: row[1].clone(),
                counts,
            });
        }

        Ok(Self {
            columns: header.clone(),
            students,
        })
    }

    /// Inverse of [`Snapshot::parse`].
    pub fn serialize(&self) -> RawTable {
        let mut table = Vec::with_capacity(self.students.len() + 1);
        table.push(self.columns.clone());

        for student in &self.students {
            let mut row = Vec::with_capacity(self.columns.len());
            row.push(student.identifier.clone());
            row.push(student.name.clone());
            row.extend(student.counts.values().map(|v| v.to_string()));
            table.push(row);
        }

        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Non-identity column names, the trailing total included.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.columns[IDENTITY_COLUMNS..].iter().map(String::as_str)
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.columns[IDENTITY_COLUMNS..].iter().any(|c| c == section)
    }

    pub fn students(&self) -> &[StudentRecord] {
        &self.students
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }
}

fn validate_columns(columns: &[String]) -> Result<()> {
    if columns.len() < IDENTITY_COLUMNS {
        return Err(ScorediffError::malformed_input(format!(
            "header has {} columns, at least {} are required",
            columns.len(),
            IDENTITY_COLUMNS
        )));
    }

    let mut seen = HashSet::new();
    for column in &columns[IDENTITY_COLUMNS..] {
        if !seen.insert(column.as_str()) {
            return Err(ScorediffError::malformed_input(format!(
                "column '{}' appears more than once",
                column
            )));
        }
    }

    Ok(())
}

/// Parse a score cell. Blank is zero, fractions are truncated.
pub fn parse_count(cell: &str) -> Option<u64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Some(0);
    }

    if let Ok(count) = trimmed.parse::<u64>() {
        return Some(count);
    }

    let value: f64 = trimmed.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some(value.trunc() as u64)
}
