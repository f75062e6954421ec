use anyhow::{Context, anyhow};
use chrono::NaiveDate;
use log::{debug, info};
use scraper::{ElementRef, Html, Selector};

use crate::error::{PipelineError, Result};
use crate::http_client::http_client;
use crate::schema::NAME;
use crate::snapshot::Snapshot;

pub const DEFAULT_SOURCE_URL: &str =
    "https://www.howstat.com/Cricket/Statistics/IPL/PlayerList.asp?s={season}";

/// Produces today's snapshot for a season. Any failure is reported as
/// `ExtractionUnavailable`; the pipeline carries on without new data.
pub trait Extractor {
    fn extract(&self, season: &str, captured_on: NaiveDate) -> Result<Snapshot>;
}

#[derive(Debug, Clone)]
pub struct HowstatExtractor {
    url_template: String,
}

impl HowstatExtractor {
    pub fn new(url_template: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
        }
    }

    pub fn season_url(&self, season: &str) -> String {
        self.url_template.replace("{season}", season)
    }

    fn fetch_html(&self, url: &str) -> anyhow::Result<String> {
        let client = http_client()?;
        client
            .get(url)
            .send()
            .with_context(|| format!("request {url}"))?
            .error_for_status()
            .with_context(|| format!("status for {url}"))?
            .text()
            .with_context(|| format!("read body {url}"))
    }
}

impl Default for HowstatExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE_URL)
    }
}

impl Extractor for HowstatExtractor {
    fn extract(&self, season: &str, captured_on: NaiveDate) -> Result<Snapshot> {
        let unavailable = |err: anyhow::Error| PipelineError::ExtractionUnavailable {
            season: season.to_string(),
            message: format!("{err:#}"),
        };
        let url = self.season_url(season);
        info!("fetching player list for season {season}");
        let html = self.fetch_html(&url).map_err(unavailable)?;
        let (headers, rows) = parse_player_table(&html).map_err(unavailable)?;
        info!("scraped {} players for season {season}", rows.len());
        Ok(Snapshot::from_table(captured_on, &headers, &rows))
    }
}

/// Pulls the header and data rows out of the `TableLined` stats table.
///
/// Headers come from the first row's `th` cells, or its `td` cells when the site renders
/// the header as plain cells. Rows whose width differs from the header are skipped.
pub fn parse_player_table(html: &str) -> anyhow::Result<(Vec<String>, Vec<Vec<String>>)> {
    let document = Html::parse_document(html);
    let table_sel = selector("table.TableLined")?;
    let row_sel = selector("tr")?;
    let th_sel = selector("th")?;
    let td_sel = selector("td")?;

    let table = document
        .select(&table_sel)
        .next()
        .ok_or_else(|| anyhow!("stats table not found"))?;
    let mut rows = table.select(&row_sel);
    let header_row = rows.next().ok_or_else(|| anyhow!("stats table is empty"))?;

    let mut headers: Vec<String> = header_row.select(&th_sel).map(cell_text).collect();
    if headers.is_empty() {
        headers = header_row.select(&td_sel).map(cell_text).collect();
    }
    if !headers.iter().any(|h| h == NAME) {
        return Err(anyhow!("no {NAME} column in headers {headers:?}"));
    }

    let mut data = Vec::new();
    for (idx, row) in rows.enumerate() {
        let cells: Vec<String> = row.select(&td_sel).map(cell_text).collect();
        if cells.len() != headers.len() {
            debug!(
                "skipping row {}: {} cells for {} headers",
                idx + 1,
                cells.len(),
                headers.len()
            );
            continue;
        }
        data.push(cells);
    }
    if data.is_empty() {
        return Err(anyhow!("stats table has no player rows"));
    }
    Ok((headers, data))
}

fn selector(css: &str) -> anyhow::Result<Selector> {
    Selector::parse(css).map_err(|err| anyhow!("bad selector {css}: {err}"))
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
