use anyhow::Result;

use ipl_form::config::{RunConfig, arg_value};
use ipl_form::form::compute_recent_form;
use ipl_form::history::CsvHistoryStore;
use ipl_form::score::compute_score;

const DEFAULT_TOP: usize = 20;

/// Prints the current recent-form leaderboard from the local history file. Reads only.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let config = RunConfig::load();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let top = arg_value(&args, "--top")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(DEFAULT_TOP)
        .max(1);

    let store = CsvHistoryStore::new(config.history_file.clone());
    let history = store.load()?;
    let Some(mut scored) = compute_score(&compute_recent_form(&history)) else {
        println!("No history at {}", store.path().display());
        return Ok(());
    };
    scored.sort_by(|a, b| b.recent_form_score.total_cmp(&a.recent_form_score));

    println!("History: {} rows", history.len());
    println!(
        "{:<28} {:>9} {:>9} {:>8} {:>9} {:>9}",
        "Name", "Runs", "Bat Avg", "Wkts", "Bowl Avg", "Score"
    );
    for row in scored.iter().take(top) {
        println!(
            "{:<28} {:>9.2} {:>9.2} {:>8.2} {:>9.2} {:>9.2}",
            row.name,
            row.avg_runs,
            row.avg_batting_avg,
            row.avg_wickets,
            row.avg_bowling_avg,
            row.recent_form_score
        );
    }
    if scored.len() > top {
        println!("... {} more", scored.len() - top);
    }
    Ok(())
}
