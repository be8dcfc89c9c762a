//! Minimal CSV reader/writer for snapshot files

use crate::snapshot::RawTable;
use std::io::{self, Write};
use std::mem::take;

const SEPARATOR: char = ',';

/// Parse CSV text into rows. Quotes and CRLF tolerant, blank lines skipped.
pub fn parse_rows(text: &str) -> RawTable {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            c if c == SEPARATOR && !in_quotes => row.push(take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(take(&mut field));
                flush_row(&mut rows, &mut row);
            }
            _ => field.push(ch),
        }
    }

    // Trailing row without a line terminator.
    row.push(field);
    flush_row(&mut rows, &mut row);

    rows
}

fn flush_row(rows: &mut RawTable, row: &mut Vec<String>) {
    if row.len() == 1 && row[0].is_empty() {
        row.clear();
    } else {
        rows.push(take(row));
    }
}

fn needs_quotes(field: &str) -> bool {
    field.contains(SEPARATOR)
        || field.contains('"')
        || field.contains('\n')
        || field.contains('\r')
        || field.trim() != field
}

/// Write one row, quoting fields where needed.
pub fn write_row<W: Write>(w: &mut W, row: &[String]) -> io::Result<()> {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            write!(w, "{}", SEPARATOR)?;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            w.write_all(cell.as_bytes())?;
        }
    }
    w.write_all(b"\n")
}

pub fn write_table<W: Write>(w: &mut W, rows: &[Vec<String>]) -> io::Result<()> {
    for row in rows {
        write_row(w, row)?;
    }
    w.flush()
}

pub fn to_string(rows: &[Vec<String>]) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_table(&mut buf, rows);
    String::from_utf8_lossy(&buf).into_owned()
}
