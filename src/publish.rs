use std::path::{Path, PathBuf};

use anyhow::Context;
use log::info;
use reqwest::StatusCode;
use reqwest::Url;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use serde_json::{Value, json};

use crate::error::{PipelineError, Result};
use crate::frame::{Cell, Frame};
use crate::http_client::http_client;

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// A sink whose whole content is replaced by the final table.
pub trait Publisher {
    fn replace_contents(&self, table: &Frame) -> Result<()>;
}

/// Publishes `table` unless it is absent or empty. Returns whether anything was written.
pub fn publish(publisher: &dyn Publisher, table: Option<&Frame>) -> Result<bool> {
    let Some(table) = table.filter(|t| !t.is_empty()) else {
        info!("nothing to publish");
        return Ok(false);
    };
    publisher.replace_contents(table)?;
    Ok(true)
}

pub fn table_values(table: &Frame) -> Vec<Vec<Value>> {
    let mut values = Vec::with_capacity(table.row_count() + 1);
    values.push(table.header().into_iter().map(Value::String).collect());
    for row in table.rows() {
        values.push(row.into_iter().map(cell_value).collect());
    }
    values
}

fn cell_value(cell: &Cell) -> Value {
    match cell {
        Cell::Number(v) => serde_json::Number::from_f64(*v).map_or(Value::Null, Value::Number),
        Cell::Text(s) => Value::String(s.clone()),
        Cell::Missing => Value::String(String::new()),
    }
}

#[derive(Debug, Clone)]
pub struct SheetsPublisher {
    spreadsheet_id: String,
    range: String,
    access_token: String,
}

impl SheetsPublisher {
    pub fn new(
        spreadsheet_id: impl Into<String>,
        range: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            range: range.into(),
            access_token: access_token.into(),
        }
    }

    fn values_url(&self, suffix: &str) -> anyhow::Result<Url> {
        let mut url = Url::parse(SHEETS_API).context("parse sheets api url")?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("sheets api url cannot be a base"))?
            .push(&self.spreadsheet_id)
            .push("values")
            .push(&format!("{}{suffix}", self.range));
        Ok(url)
    }

    fn send(&self, req: reqwest::blocking::RequestBuilder, what: &str) -> Result<()> {
        let resp = req
            .bearer_auth(&self.access_token)
            .send()
            .map_err(|e| PipelineError::PublishWrite(format!("{what}: {e}")))?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().unwrap_or_default();
        Err(classify_status(status, &format!("{what}: http {status}: {body}")))
    }
}

fn classify_status(status: StatusCode, message: &str) -> PipelineError {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        PipelineError::PublishAuth(message.to_string())
    } else {
        PipelineError::PublishWrite(message.to_string())
    }
}

impl Publisher for SheetsPublisher {
    fn replace_contents(&self, table: &Frame) -> Result<()> {
        let client = http_client().map_err(|e| PipelineError::PublishWrite(format!("{e:#}")))?;
        let to_write = |e: anyhow::Error| PipelineError::PublishWrite(format!("{e:#}"));

        let clear_url = self.values_url(":clear").map_err(to_write)?;
        self.send(client.post(clear_url).json(&json!({})), "clear sheet")?;

        let mut update_url = self.values_url("").map_err(to_write)?;
        update_url
            .query_pairs_mut()
            .append_pair("valueInputOption", "RAW");
        let body = json!({
            "range": self.range,
            "majorDimension": "ROWS",
            "values": table_values(table),
        });
        self.send(client.put(update_url).json(&body), "update sheet")?;

        info!(
            "published {} rows to spreadsheet {} ({})",
            table.row_count(),
            self.spreadsheet_id,
            self.range
        );
        Ok(())
    }
}

/// Writes the table to a local `.xlsx` file, replacing any previous file.
#[derive(Debug, Clone)]
pub struct WorkbookPublisher {
    path: PathBuf,
}

impl WorkbookPublisher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, table: &Frame) -> anyhow::Result<()> {
        let mut workbook = Workbook::new();
        {
            let sheet = workbook.add_worksheet();
            sheet.set_name("RecentForm")?;
            write_table(sheet, table)?;
        }
        workbook
            .save(&self.path)
            .with_context(|| format!("failed writing workbook to {}", self.path.display()))?;
        Ok(())
    }
}

impl Publisher for WorkbookPublisher {
    fn replace_contents(&self, table: &Frame) -> Result<()> {
        self.write(table)
            .map_err(|e| PipelineError::PublishWrite(format!("{e:#}")))?;
        info!(
            "wrote {} rows to {}",
            table.row_count(),
            self.path.display()
        );
        Ok(())
    }
}

fn write_table(worksheet: &mut Worksheet, table: &Frame) -> anyhow::Result<()> {
    let bold = Format::new().set_bold();
    for (col_idx, name) in table.header().iter().enumerate() {
        worksheet
            .write_string_with_format(0, col_idx as u16, name, &bold)
            .with_context(|| format!("write header ({col_idx})"))?;
    }
    for (row_idx, row) in table.rows().enumerate() {
        let r = row_idx as u32 + 1;
        for (col_idx, cell) in row.into_iter().enumerate() {
            let c = col_idx as u16;
            let written = match cell {
                Cell::Number(v) => worksheet.write_number(r, c, *v),
                Cell::Text(s) => worksheet.write_string(r, c, s),
                Cell::Missing => continue,
            };
            written.with_context(|| format!("write cell ({r},{c})"))?;
        }
    }
    Ok(())
}

/// Fans one table out to several sinks in order; stops at the first failure.
pub struct Fanout<'a> {
    targets: Vec<&'a dyn Publisher>,
}

impl<'a> Fanout<'a> {
    pub fn new(targets: Vec<&'a dyn Publisher>) -> Self {
        Self { targets }
    }
}

impl Publisher for Fanout<'_> {
    fn replace_contents(&self, table: &Frame) -> Result<()> {
        for target in &self.targets {
            target.replace_contents(table)?;
        }
        Ok(())
    }
}
