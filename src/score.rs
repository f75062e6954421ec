use crate::form::RecentForm;
use crate::frame::{Cell, Column, Frame};
use crate::schema::FORM_COLUMNS;

pub const RUNS_WEIGHT: f64 = 0.5;
pub const BATTING_AVG_WEIGHT: f64 = 0.3;
pub const WICKETS_WEIGHT: f64 = 0.1;
pub const BOWLING_AVG_WEIGHT: f64 = 0.1;

/// A recent-form record with missing aggregates filled with 0 and the weighted score
/// attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredForm {
    pub name: String,
    pub avg_runs: f64,
    pub avg_batting_avg: f64,
    pub avg_wickets: f64,
    pub avg_bowling_avg: f64,
    pub recent_form_score: f64,
}

/// Scores each record. `None` for empty input so later stages can skip.
pub fn compute_score(records: &[RecentForm]) -> Option<Vec<ScoredForm>> {
    if records.is_empty() {
        return None;
    }
    Some(records.iter().map(score_one).collect())
}

fn score_one(form: &RecentForm) -> ScoredForm {
    let avg_runs = form.avg_runs.unwrap_or(0.0);
    let avg_batting_avg = form.avg_batting_avg.unwrap_or(0.0);
    let avg_wickets = form.avg_wickets.unwrap_or(0.0);
    let avg_bowling_avg = form.avg_bowling_avg.unwrap_or(0.0);
    ScoredForm {
        name: form.name.clone(),
        avg_runs,
        avg_batting_avg,
        avg_wickets,
        avg_bowling_avg,
        recent_form_score: avg_runs * RUNS_WEIGHT
            + avg_batting_avg * BATTING_AVG_WEIGHT
            + avg_wickets * WICKETS_WEIGHT
            + avg_bowling_avg * BOWLING_AVG_WEIGHT,
    }
}

pub fn scored_frame(scored: &[ScoredForm]) -> Frame {
    let pick = |f: fn(&ScoredForm) -> Cell| scored.iter().map(f).collect::<Vec<_>>();
    let cells = [
        pick(|s| Cell::Text(s.name.clone())),
        pick(|s| Cell::Number(s.avg_runs)),
        pick(|s| Cell::Number(s.avg_batting_avg)),
        pick(|s| Cell::Number(s.avg_wickets)),
        pick(|s| Cell::Number(s.avg_bowling_avg)),
        pick(|s| Cell::Number(s.recent_form_score)),
    ];
    let columns = FORM_COLUMNS
        .iter()
        .zip(cells)
        .map(|((name, kind), cells)| Column {
            name: name.to_string(),
            kind: *kind,
            cells,
        })
        .collect();
    Frame::new(columns)
}
