use anyhow::{Context, Result, anyhow};
use chrono::Local;
use log::info;

use ipl_form::config::RunConfig;
use ipl_form::extract::{Extractor, HowstatExtractor};
use ipl_form::history::CsvHistoryStore;
use ipl_form::pipeline::run_daily_update;
use ipl_form::publish::{Fanout, Publisher, SheetsPublisher, WorkbookPublisher};
use ipl_form::retry::with_backoff;
use ipl_form::snapshot::Snapshot;

struct RetryingExtractor<'a> {
    inner: HowstatExtractor,
    config: &'a RunConfig,
}

impl Extractor for RetryingExtractor<'_> {
    fn extract(&self, season: &str, captured_on: chrono::NaiveDate) -> ipl_form::Result<Snapshot> {
        with_backoff(
            "extract",
            self.config.retry_attempts,
            self.config.retry_step,
            || self.inner.extract(season, captured_on),
        )
    }
}

struct RetryingPublisher<'a> {
    inner: &'a dyn Publisher,
    config: &'a RunConfig,
}

impl Publisher for RetryingPublisher<'_> {
    fn replace_contents(&self, table: &ipl_form::frame::Frame) -> ipl_form::Result<()> {
        with_backoff(
            "publish",
            self.config.retry_attempts,
            self.config.retry_step,
            || self.inner.replace_contents(table),
        )
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let config = RunConfig::load();
    info!(
        "season {} history {}",
        config.season,
        config.history_file.display()
    );

    let sheets = config.publishing_sheet()?.map(|(target, token)| {
        SheetsPublisher::new(
            target.spreadsheet_id.clone(),
            target.range.clone(),
            token.to_string(),
        )
    });
    let workbook = config.xlsx_out.clone().map(WorkbookPublisher::new);

    let mut targets: Vec<&dyn Publisher> = Vec::new();
    if let Some(sheets) = &sheets {
        targets.push(sheets);
    }
    if let Some(workbook) = &workbook {
        targets.push(workbook);
    }
    if targets.is_empty() && !config.dry_run {
        return Err(anyhow!(
            "no publish target configured; set IPL_SHEET_ID or IPL_XLSX_OUT, or pass --dry-run"
        ));
    }

    let fanout = Fanout::new(targets);
    let retrying = RetryingPublisher {
        inner: &fanout,
        config: &config,
    };
    let publisher: Option<&dyn Publisher> = (!config.dry_run).then_some(&retrying as &dyn Publisher);

    let extractor = RetryingExtractor {
        inner: HowstatExtractor::new(config.source_url.clone()),
        config: &config,
    };
    let store = CsvHistoryStore::new(config.history_file.clone());
    let today = Local::now().date_naive();

    let summary = run_daily_update(&extractor, &store, publisher, &config.season, today)?;

    let line = serde_json::to_string(&summary).context("serialize run summary")?;
    info!("run complete {line}");
    Ok(())
}
