use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::{debug, info};

use crate::error::{PipelineError, Result};
use crate::schema::{DATE_FORMAT, MATCH_DATE, NAME, canonical_headers};
use crate::snapshot::{HistoryTable, Snapshot, SnapshotRow};

pub const DEFAULT_HISTORY_FILE: &str = "ipl_2025_matchwise_stats.csv";

#[derive(Debug, Clone)]
pub struct CsvHistoryStore {
    path: PathBuf,
}

impl CsvHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole table. A missing or zero-byte file is an empty history; anything
    /// unparseable is an error rather than a silent drop.
    pub fn load(&self) -> Result<HistoryTable> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("no history at {}, starting empty", self.path.display());
                return Ok(HistoryTable::default());
            }
            Err(err) => return Err(PipelineError::storage_read(&self.path, err)),
        };
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(HistoryTable::default());
        }
        let table = parse_history(raw.as_slice())
            .map_err(|message| PipelineError::storage_read(&self.path, message))?;
        info!(
            "loaded {} history rows from {}",
            table.len(),
            self.path.display()
        );
        Ok(table)
    }

    /// Rewrites the whole file. Writes go to a sibling temp file that is renamed over the
    /// target, so a failed write leaves the previous content intact.
    pub fn persist(&self, history: &HistoryTable) -> Result<()> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir).map_err(|e| PipelineError::storage_write(&self.path, e))?;
        }
        let tmp = self.path.with_extension("csv.tmp");
        if let Err(err) = write_history(&tmp, history) {
            let _ = fs::remove_file(&tmp);
            return Err(PipelineError::storage_write(&self.path, err));
        }
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            PipelineError::storage_write(&self.path, e)
        })?;
        info!(
            "persisted {} history rows to {}",
            history.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Concatenates `snapshot` onto `history`. No dedup and no merge by key: re-running on the
/// same day appends the same rows again.
pub fn append(mut history: HistoryTable, snapshot: Snapshot) -> HistoryTable {
    if history.columns.is_empty() && !snapshot.columns.is_empty() {
        history.ensure_column(NAME);
    }
    for column in &snapshot.columns {
        history.ensure_column(column);
    }
    history.rows.extend(snapshot.rows);
    history
}

fn parse_history<R: io::Read>(rdr: R) -> std::result::Result<HistoryTable, String> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(rdr);
    let raw_headers: Vec<String> = reader
        .headers()
        .map_err(|e| format!("bad header row: {e}"))?
        .iter()
        .map(str::to_string)
        .collect();
    let columns = canonical_headers(&raw_headers);

    let (Some(name_idx), Some(date_idx)) = (
        columns.iter().position(|c| c == NAME),
        columns.iter().position(|c| c == MATCH_DATE),
    ) else {
        return Err(format!("header must contain {NAME} and {MATCH_DATE}"));
    };

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| format!("bad record: {e}"))?;
        let raw_date = record.get(date_idx).unwrap_or_default().trim();
        let match_date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT)
            .map_err(|e| format!("row {}: bad {MATCH_DATE} {raw_date:?}: {e}", line + 2))?;
        let mut row = SnapshotRow::new(record.get(name_idx).unwrap_or_default(), match_date);
        for (idx, cell) in record.iter().enumerate() {
            if idx != name_idx && idx != date_idx {
                row.set(&columns[idx], cell);
            }
        }
        rows.push(row);
    }

    Ok(HistoryTable { columns, rows })
}

fn write_history(path: &Path, history: &HistoryTable) -> std::result::Result<(), String> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| e.to_string())?;
    writer
        .write_record(&history.columns)
        .map_err(|e| e.to_string())?;
    for row in &history.rows {
        let cells = history.columns.iter().map(|c| row.cell_text(c));
        writer.write_record(cells).map_err(|e| e.to_string())?;
    }
    writer.flush().map_err(|e| e.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
    }

    fn snapshot(d: u32, names: &[&str]) -> Snapshot {
        let headers = vec!["Name".to_string(), "Runs".to_string()];
        let data: Vec<Vec<String>> = names
            .iter()
            .map(|n| vec![n.to_string(), "12".to_string()])
            .collect();
        Snapshot::from_table(day(d), &headers, &data)
    }

    #[test]
    fn append_accumulates_duplicates() {
        let h = append(HistoryTable::default(), snapshot(1, &["A", "B"]));
        let h = append(h, snapshot(1, &["A", "B"]));
        assert_eq!(h.len(), 4);
        assert_eq!(h.columns, vec!["Name", "Runs", "Match_Date"]);
    }

    #[test]
    fn append_unions_new_columns_after_existing() {
        let h = append(HistoryTable::default(), snapshot(1, &["A"]));
        let headers = vec!["Name".to_string(), "Team".to_string(), "Runs".to_string()];
        let data = vec![vec!["C".to_string(), "MI".to_string(), "3".to_string()]];
        let h = append(h, Snapshot::from_table(day(2), &headers, &data));
        assert_eq!(h.columns, vec!["Name", "Runs", "Match_Date", "Team"]);
        assert_eq!(h.rows[0].get("Team"), None);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let raw = "Name,Runs,Match_Date\nA,1,2025-04-01\nB,2\n";
        assert!(parse_history(raw.as_bytes()).is_err());
    }

    #[test]
    fn unparseable_date_is_rejected() {
        let raw = "Name,Runs,Match_Date\nA,1,yesterday\n";
        let err = parse_history(raw.as_bytes()).unwrap_err();
        assert!(err.contains("Match_Date"));
    }

    #[test]
    fn header_only_file_is_empty_history() {
        let raw = "Name,Runs,Match_Date\n";
        let table = parse_history(raw.as_bytes()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns.len(), 3);
    }

    #[test]
    fn header_without_key_columns_is_rejected_even_without_rows() {
        let err = parse_history("Player,Runs\n".as_bytes()).unwrap_err();
        assert!(err.contains("Name"));
    }
}
