//! Column names and declared column kinds.
//!
//! Stages look column kinds up here instead of sniffing cell contents, so picking the
//! categorical and numeric columns for the normalizer is a static lookup.

pub const NAME: &str = "Name";
pub const RUNS: &str = "Runs";
pub const BAT_AVG: &str = "Bat Avg";
pub const WICKETS: &str = "Wickets";
pub const BOWL_AVG: &str = "Bowl Avg";
pub const MATCH_DATE: &str = "Match_Date";

pub const AVG_RUNS: &str = "Avg Runs (Last 5 Matches)";
pub const AVG_BATTING_AVG: &str = "Avg Batting Avg";
pub const AVG_WICKETS: &str = "Avg Wickets";
pub const AVG_BOWLING_AVG: &str = "Avg Bowling Avg";
pub const RECENT_FORM_SCORE: &str = "Recent_Form_Score";

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Text,
    Date,
}

pub const FORM_SOURCE_COLUMNS: [&str; 4] = [RUNS, BAT_AVG, WICKETS, BOWL_AVG];

pub const FORM_COLUMNS: [(&str, ColumnKind); 6] = [
    (NAME, ColumnKind::Text),
    (AVG_RUNS, ColumnKind::Numeric),
    (AVG_BATTING_AVG, ColumnKind::Numeric),
    (AVG_WICKETS, ColumnKind::Numeric),
    (AVG_BOWLING_AVG, ColumnKind::Numeric),
    (RECENT_FORM_SCORE, ColumnKind::Numeric),
];

/// Kind of a history column. Anything the source site adds beyond the known stats is
/// passthrough text.
pub fn history_column_kind(column: &str) -> ColumnKind {
    match column {
        MATCH_DATE => ColumnKind::Date,
        RUNS | BAT_AVG | WICKETS | BOWL_AVG => ColumnKind::Numeric,
        _ => ColumnKind::Text,
    }
}

pub fn is_identity_column(column: &str) -> bool {
    column.eq_ignore_ascii_case(NAME)
}

/// Trims header cells, spells the identity column as `Name` and makes repeats unique as
/// `Avg`, `Avg.1`, `Avg.2`, so every cell keeps a column of its own.
pub fn canonical_headers<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for header in raw {
        let header = header.as_ref().trim();
        let base = if is_identity_column(header) { NAME } else { header };
        let mut candidate = base.to_string();
        let mut n = 0;
        while out.contains(&candidate) {
            n += 1;
            candidate = format!("{base}.{n}");
        }
        out.push(candidate);
    }
    out
}
