//! Header-driven CSV parsing.

use std::collections::HashMap;

use poetryhub_shared::{PoetryHubError, Result};
use tracing::{debug, warn};

/// One data row keyed by the header row's column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularRow {
    line: u64,
    values: HashMap<String, String>,
}

impl TabularRow {
    /// 1-based line in the source text where this row starts.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Cell value for a column, or `None` if the header has no such column.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }
}

/// Parse CSV text into rows, in input order.
///
/// The first row is the header. Blank rows are skipped and short rows yield
/// empty values. A row with malformed quoting is dropped and parsing resumes
/// on the next line. Fails with [`PoetryHubError::EmptyInput`] when there is
/// no usable header.
pub fn parse(text: &str) -> Result<Vec<TabularRow>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = split_records(text).into_iter();

    let headers: Vec<String> = match records.next() {
        Some(Ok(raw)) => match read_record(raw.text) {
            Some(record) => record.iter().map(|h| h.trim().to_string()).collect(),
            None => return Err(PoetryHubError::EmptyInput),
        },
        Some(Err(line)) => {
            warn!(line, "unreadable header row");
            return Err(PoetryHubError::EmptyInput);
        }
        None => return Err(PoetryHubError::EmptyInput),
    };

    if headers.iter().all(String::is_empty) {
        return Err(PoetryHubError::EmptyInput);
    }

    let mut rows = Vec::new();
    let mut dropped = 0usize;

    for raw in records {
        let raw = match raw {
            Ok(raw) => raw,
            Err(line) => {
                dropped += 1;
                warn!(line, "dropping row with malformed quoting");
                continue;
            }
        };
        let Some(record) = read_record(raw.text) else {
            dropped += 1;
            warn!(line = raw.line, "dropping unreadable row");
            continue;
        };

        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let mut values = HashMap::with_capacity(headers.len());
        for (i, header) in headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            values
                .entry(header.clone())
                .or_insert_with(|| record.get(i).unwrap_or_default().to_string());
        }

        rows.push(TabularRow {
            line: raw.line,
            values,
        });
    }

    debug!(rows = rows.len(), dropped, columns = headers.len(), "parsed CSV");
    Ok(rows)
}

/// The source text of one logical CSV record.
struct RawRecord<'a> {
    line: u64,
    text: &'a str,
}

/// Where the scanner is within the current field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Start,
    Unquoted,
    Quoted,
    /// Just saw a quote inside a quoted field: either an escape or the close.
    QuoteInQuoted,
}

/// Group physical lines into logical records.
///
/// A quoted field may span lines. A quoted field that never closes, or whose
/// closing quote is followed by anything but a delimiter or line end, makes
/// the record malformed: its first line is reported as `Err(line)` and
/// scanning restarts on the following line. Empty lines are skipped.
fn split_records(text: &str) -> Vec<std::result::Result<RawRecord<'_>, u64>> {
    let mut lines = Vec::new();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        lines.push((offset, line));
        offset += line.len();
    }

    let mut records = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let (start, first) = lines[i];
        let line_no = i as u64 + 1;
        if first.trim_end_matches(['\r', '\n']).is_empty() {
            i += 1;
            continue;
        }

        let mut field = Field::Start;
        let mut j = i;
        let closed = loop {
            if !scan_line(lines[j].1, &mut field) {
                break false;
            }
            if field != Field::Quoted {
                break true;
            }
            j += 1;
            if j == lines.len() {
                break false;
            }
        };

        if closed {
            let (last_start, last) = lines[j];
            records.push(Ok(RawRecord {
                line: line_no,
                text: &text[start..last_start + last.len()],
            }));
            i = j + 1;
        } else {
            records.push(Err(line_no));
            i += 1;
        }
    }
    records
}

/// Advance `field` over one physical line. Returns `false` on malformed quoting.
fn scan_line(line: &str, field: &mut Field) -> bool {
    for ch in line.chars() {
        *field = match (*field, ch) {
            (Field::Start, '"') => Field::Quoted,
            (Field::Start | Field::Unquoted, ',' | '\r' | '\n') => Field::Start,
            (Field::Start | Field::Unquoted, _) => Field::Unquoted,
            (Field::Quoted, '"') => Field::QuoteInQuoted,
            (Field::Quoted, _) => Field::Quoted,
            (Field::QuoteInQuoted, '"') => Field::Quoted,
            (Field::QuoteInQuoted, ',' | '\r' | '\n') => Field::Start,
            (Field::QuoteInQuoted, _) => return false,
        };
    }
    true
}

fn read_record(text: &str) -> Option<csv::StringRecord> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    match reader.records().next()? {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(error = %e, "csv decode failed");
            None
        }
    }
}
