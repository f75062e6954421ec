use std::collections::BTreeMap;

use crate::schema::FORM_SOURCE_COLUMNS;
use crate::snapshot::{HistoryTable, SnapshotRow};

pub const RECENT_WINDOW: usize = 5;

/// Per-player means over the most recent snapshots. `None` when every selected value for
/// that stat was missing.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentForm {
    pub name: String,
    pub avg_runs: Option<f64>,
    pub avg_batting_avg: Option<f64>,
    pub avg_wickets: Option<f64>,
    pub avg_bowling_avg: Option<f64>,
}

/// One record per distinct name, ordered by name.
///
/// Rows are taken newest `Match_Date` first; rows sharing a date keep their history order.
/// This is "last 5 snapshots", so the number of real matches it spans depends on how often
/// the scrape runs.
pub fn compute_recent_form(history: &HistoryTable) -> Vec<RecentForm> {
    let mut groups: BTreeMap<&str, Vec<&SnapshotRow>> = BTreeMap::new();
    for row in &history.rows {
        if row.name.is_empty() {
            continue;
        }
        groups.entry(row.name.as_str()).or_default().push(row);
    }

    groups
        .into_iter()
        .map(|(name, mut rows)| {
            rows.sort_by(|a, b| b.match_date.cmp(&a.match_date));
            rows.truncate(RECENT_WINDOW);
            let [avg_runs, avg_batting_avg, avg_wickets, avg_bowling_avg] =
                FORM_SOURCE_COLUMNS.map(|column| mean_of(&rows, column));
            RecentForm {
                name: name.to_string(),
                avg_runs,
                avg_batting_avg,
                avg_wickets,
                avg_bowling_avg,
            }
        })
        .collect()
}

fn mean_of(rows: &[&SnapshotRow], column: &str) -> Option<f64> {
    let (sum, count) = rows
        .iter()
        .filter_map(|row| row.number(column))
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}
