use chrono::NaiveDate;
use log::{info, warn};
use serde::Serialize;

use crate::error::Result;
use crate::extract::Extractor;
use crate::form::compute_recent_form;
use crate::frame::Frame;
use crate::history::{CsvHistoryStore, append};
use crate::normalize::{categorical_columns, normalize, numeric_columns};
use crate::publish::{Publisher, publish};
use crate::score::{compute_score, scored_frame};
use crate::snapshot::HistoryTable;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub rows_appended: usize,
    pub history_rows: usize,
    pub players: usize,
    pub published: bool,
}

/// Recent form, scores and normalization over a loaded history. `None` when there is
/// nothing to report.
pub fn build_form_table(history: &HistoryTable) -> Option<Frame> {
    let form = compute_recent_form(history);
    let scored = compute_score(&form)?;
    let frame = scored_frame(&scored);
    let categorical = categorical_columns(&frame);
    let numeric = numeric_columns(&frame);
    Some(normalize(&frame, &categorical, &numeric))
}

/// One daily run: scrape, append to history, recompute form and publish.
///
/// A failed scrape is logged and the run carries on with the existing history. Storage and
/// publish failures end the run. `publisher` is `None` for dry runs.
pub fn run_daily_update(
    extractor: &dyn Extractor,
    store: &CsvHistoryStore,
    publisher: Option<&dyn Publisher>,
    season: &str,
    today: NaiveDate,
) -> Result<RunSummary> {
    let snapshot = match extractor.extract(season, today) {
        Ok(snapshot) if !snapshot.is_empty() => Some(snapshot),
        Ok(_) => {
            warn!("extraction for season {season} returned no rows, history left untouched");
            None
        }
        Err(err) => {
            warn!("{err}; history left untouched");
            None
        }
    };

    let mut history = store.load()?;
    let mut rows_appended = 0;
    if let Some(snapshot) = snapshot {
        rows_appended = snapshot.len();
        history = append(history, snapshot);
        store.persist(&history)?;
    }

    let table = build_form_table(&history);
    let players = table.as_ref().map_or(0, Frame::row_count);
    info!("recent form computed for {players} players");

    let published = match publisher {
        Some(publisher) => publish(publisher, table.as_ref())?,
        None => {
            info!("dry run, skipping publish");
            false
        }
    };

    Ok(RunSummary {
        rows_appended,
        history_rows: history.len(),
        players,
        published,
    })
}
