//! Extraction of the score table from a CodingBat report page

use crate::error::{Result, ScorediffError};
use crate::snapshot::{RawTable, IDENTIFIER_COLUMN, NAME_COLUMN, TOTAL_COLUMN};

/// Rows before the first student row (title, navigation and header rows).
const LEADING_ROWS: usize = 5;

/// Build the raw score table from a report page.
///
/// The header is the two identity columns, the `value` of every
/// `name="sectionkey"` element in document order, then the total column.
/// Student rows are the `<td>` texts of every `<tr>` after the leading rows.
pub fn extract_report_table(page: &str) -> Result<RawTable> {
    let lower = page.to_ascii_lowercase();

    let mut header = vec![IDENTIFIER_COLUMN.to_string(), NAME_COLUMN.to_string()];
    header.extend(section_keys(page, &lower));
    header.push(TOTAL_COLUMN.to_string());

    let mut table = vec![header];
    for (start, end) in element_blocks(&lower, "tr", 0, lower.len()).skip(LEADING_ROWS) {
        let cells: Vec<String> = element_blocks(&lower, "td", start, end)
            .map(|(s, e)| cell_text(&page[s..e]))
            .collect();
        if !cells.is_empty() {
            table.push(cells);
        }
    }

    if table.len() == 1 && !lower.contains("<table") {
        return Err(ScorediffError::fetch(
            "report page contains no score table (login may have failed)",
        ));
    }

    log::debug!("Extracted {} columns and {} student rows", table[0].len(), table.len() - 1);
    Ok(table)
}

/// `value` attributes of all tags carrying `name="sectionkey"`.
fn section_keys(page: &str, lower: &str) -> Vec<String> {
    let mut keys = Vec::new();
    let mut from = 0;

    while let Some(rel) = lower[from..].find('<') {
        let start = from + rel;
        let Some(close) = lower[start..].find('>') else {
            break;
        };
        let end = start + close;
        let tag = &page[start + 1..end];

        let attrs = attributes(tag);
        let is_key = attrs
            .iter()
            .any(|(k, v)| k.eq_ignore_ascii_case("name") && v == "sectionkey");
        if is_key {
            if let Some((_, value)) = attrs.iter().find(|(k, _)| k.eq_ignore_ascii_case("value")) {
                keys.push(decode_entities(value));
            }
        }

        from = end + 1;
    }

    keys
}

/// Parse `name=value` pairs out of the inside of a tag.
fn attributes(tag: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut chars = tag.char_indices().peekable();

    // Skip the tag name.
    while let Some(&(_, c)) = chars.peek() {
        if c.is_whitespace() {
            break;
        }
        chars.next();
    }

    loop {
        while matches!(chars.peek(), Some(&(_, c)) if c.is_whitespace() || c == '/') {
            chars.next();
        }
        let Some(&(name_start, _)) = chars.peek() else {
            break;
        };

        let mut name_end = tag.len();
        while let Some(&(i, c)) = chars.peek() {
            if c == '=' || c.is_whitespace() {
                name_end = i;
                break;
            }
            chars.next();
        }
        let name = tag[name_start..name_end].to_string();

        while matches!(chars.peek(), Some(&(_, c)) if c.is_whitespace()) {
            chars.next();
        }
        if !matches!(chars.peek(), Some(&(_, '='))) {
            attrs.push((name, String::new()));
            continue;
        }
        chars.next();
        while matches!(chars.peek(), Some(&(_, c)) if c.is_whitespace()) {
            chars.next();
        }

        let mut value = String::new();
        match chars.peek().copied() {
            Some((_, quote @ ('"' | '\''))) => {
                chars.next();
                for (_, c) in chars.by_ref() {
                    if c == quote {
                        break;
                    }
                    value.push(c);
                }
            }
            _ => {
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_whitespace() {
                        break;
                    }
                    value.push(c);
                    chars.next();
                }
            }
        }
        attrs.push((name, value));
    }

    attrs
}

/// Byte ranges of the contents of each `<tag ...>` element between `from`
/// and `limit`. An element ends at its closing tag or at the next opening
/// tag of the same kind, whichever comes first.
fn element_blocks<'a>(
    lower: &'a str,
    tag: &'a str,
    from: usize,
    limit: usize,
) -> impl Iterator<Item = (usize, usize)> + 'a {
    let open = format!("<{}", tag);
    let close = format!("</{}", tag);
    let mut pos = from;

    std::iter::from_fn(move || {
        let start = find_open_tag(lower, &open, pos, limit)?;
        let content_start = lower[start..limit].find('>').map(|i| start + i + 1)?;

        let closing = lower[content_start..limit].find(close.as_str()).map(|i| content_start + i);
        let next_open = find_open_tag(lower, &open, content_start, limit);
        let content_end = match (closing, next_open) {
            (Some(c), Some(n)) => c.min(n),
            (Some(c), None) => c,
            (None, Some(n)) => n,
            (None, None) => limit,
        };

        pos = content_end.max(content_start);
        Some((content_start, content_end))
    })
}

/// Position of the next `<tag` that is followed by whitespace, `/` or `>`.
fn find_open_tag(lower: &str, open: &str, from: usize, limit: usize) -> Option<usize> {
    let mut pos = from;
    while pos < limit {
        let start = pos + lower[pos..limit].find(open)?;
        let after = lower[start + open.len()..limit].chars().next();
        if matches!(after, Some(c) if c.is_whitespace() || c == '>' || c == '/') {
            return Some(start);
        }
        pos = start + open.len();
    }
    None
}

fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn cell_text(inner: &str) -> String {
    normalize_ws(&decode_entities(&strip_tags(inner)))
}

fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest.find(';').filter(|&semi| semi <= 10).and_then(|semi| {
            let entity = &rest[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, semi))
        });

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
