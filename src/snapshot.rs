use std::collections::HashMap;

use chrono::NaiveDate;

use crate::schema::{
    ColumnKind, DATE_FORMAT, MATCH_DATE, canonical_headers, history_column_kind,
    is_identity_column,
};

/// One player's stats as captured on one date.
///
/// Cells are kept verbatim as scraped; numeric coercion happens in the aggregator so the
/// history file round-trips exactly. Empty cells are never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRow {
    pub name: String,
    pub match_date: NaiveDate,
    fields: HashMap<String, String>,
}

impl SnapshotRow {
    pub fn new(name: impl Into<String>, match_date: NaiveDate) -> Self {
        Self {
            name: name.into().trim().to_string(),
            match_date,
            fields: HashMap::new(),
        }
    }

    pub fn with(mut self, column: &str, value: impl Into<String>) -> Self {
        self.set(column, value);
        self
    }

    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        let value = value.into();
        let trimmed = value.trim();
        if is_identity_column(column) {
            self.name = trimmed.to_string();
            return;
        }
        if history_column_kind(column) == ColumnKind::Date {
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
                self.match_date = date;
            }
            return;
        }
        if trimmed.is_empty() {
            self.fields.remove(column);
        } else {
            self.fields.insert(column.to_string(), trimmed.to_string());
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(parse_number)
    }

    pub fn cell_text(&self, column: &str) -> String {
        if is_identity_column(column) {
            self.name.clone()
        } else if column == MATCH_DATE {
            self.match_date.format(DATE_FORMAT).to_string()
        } else {
            self.get(column).unwrap_or_default().to_string()
        }
    }
}

/// One extraction run's rows, all tagged with the same capture date.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub captured_on: NaiveDate,
    pub columns: Vec<String>,
    pub rows: Vec<SnapshotRow>,
}

impl Snapshot {
    /// Builds a snapshot from a header row and raw data rows. `Match_Date` is appended as
    /// the last column and stamped with `captured_on` on every row. Repeated headers are
    /// numbered so no cell is dropped.
    pub fn from_table(captured_on: NaiveDate, headers: &[String], data: &[Vec<String>]) -> Self {
        let headers = canonical_headers(headers);
        let mut columns: Vec<String> = headers
            .iter()
            .filter(|h| h.as_str() != MATCH_DATE)
            .cloned()
            .collect();
        columns.push(MATCH_DATE.to_string());

        let rows = data
            .iter()
            .map(|cells| {
                let mut row = SnapshotRow::new("", captured_on);
                for (header, cell) in headers.iter().zip(cells) {
                    if header != MATCH_DATE {
                        row.set(header, cell.as_str());
                    }
                }
                row
            })
            .collect();

        Self {
            captured_on,
            columns,
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryTable {
    pub columns: Vec<String>,
    pub rows: Vec<SnapshotRow>,
}

impl HistoryTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn ensure_column(&mut self, column: &str) {
        if !self.columns.iter().any(|c| c == column) {
            self.columns.push(column.to_string());
        }
    }
}

/// Lenient numeric parse for scraped stat cells.
///
/// Accepts not-out markers (`"105*"`) and thousands separators; `"-"` and empty are
/// missing.
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() || s == "-" {
        return None;
    }
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(*c, ',' | '*'))
        .collect();
    cleaned.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
