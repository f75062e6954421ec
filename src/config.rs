use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

use crate::extract::DEFAULT_SOURCE_URL;
use crate::history::DEFAULT_HISTORY_FILE;

pub const DEFAULT_SEASON: &str = "2025";
const DEFAULT_SHEET_RANGE: &str = "Sheet1";
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
const RETRY_STEP_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub season: String,
    pub history_file: PathBuf,
    pub source_url: String,
    pub sheet: Option<SheetTarget>,
    pub xlsx_out: Option<PathBuf>,
    pub retry_attempts: u32,
    pub retry_step: Duration,
    pub dry_run: bool,
}

#[derive(Clone, PartialEq)]
pub struct SheetTarget {
    pub spreadsheet_id: String,
    pub range: String,
    pub access_token: Option<String>,
}

impl std::fmt::Debug for SheetTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetTarget")
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("range", &self.range)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl RunConfig {
    /// Loads `.env.local` / `.env`, then reads the process environment and arguments.
    pub fn load() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        let args = std::env::args().skip(1).collect::<Vec<_>>();
        Self::from_sources(|key| std::env::var(key).ok(), &args)
    }

    pub fn from_sources(env: impl Fn(&str) -> Option<String>, args: &[String]) -> Self {
        let env = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let season = arg_value(args, "--season")
            .or_else(|| env("IPL_SEASON"))
            .unwrap_or_else(|| DEFAULT_SEASON.to_string());
        let history_file = arg_value(args, "--history")
            .or_else(|| env("IPL_HISTORY_FILE"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_HISTORY_FILE));
        let source_url = env("IPL_SOURCE_URL").unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string());
        let sheet = env("IPL_SHEET_ID").map(|spreadsheet_id| SheetTarget {
            spreadsheet_id,
            range: env("IPL_SHEET_RANGE").unwrap_or_else(|| DEFAULT_SHEET_RANGE.to_string()),
            access_token: env("GOOGLE_ACCESS_TOKEN"),
        });
        let xlsx_out = arg_value(args, "--xlsx")
            .or_else(|| env("IPL_XLSX_OUT"))
            .map(PathBuf::from);
        let retry_attempts = env("IPL_RETRY_ATTEMPTS")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(DEFAULT_RETRY_ATTEMPTS)
            .clamp(1, 6);

        Self {
            season,
            history_file,
            source_url,
            sheet,
            xlsx_out,
            retry_attempts,
            retry_step: Duration::from_millis(RETRY_STEP_MS),
            dry_run: args.iter().any(|a| a == "--dry-run"),
        }
    }

    /// Sheet target and its token when this run publishes to Sheets. Dry runs never do, so
    /// a missing token only matters outside them.
    pub fn publishing_sheet(&self) -> anyhow::Result<Option<(&SheetTarget, &str)>> {
        if self.dry_run {
            return Ok(None);
        }
        let Some(target) = &self.sheet else {
            return Ok(None);
        };
        let token = target
            .access_token
            .as_deref()
            .context("IPL_SHEET_ID is set but GOOGLE_ACCESS_TOKEN is missing")?;
        Ok(Some((target, token)))
    }
}

pub fn arg_value(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn cfg(vars: &[(&str, &str)], args: &[&str]) -> RunConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        RunConfig::from_sources(|k| vars.get(k).cloned(), &args)
    }

    #[test]
    fn defaults_without_env_or_args() {
        let c = cfg(&[], &[]);
        assert_eq!(c.season, "2025");
        assert_eq!(c.history_file, PathBuf::from("ipl_2025_matchwise_stats.csv"));
        assert!(c.sheet.is_none());
        assert!(c.xlsx_out.is_none());
        assert_eq!(c.retry_attempts, 3);
        assert!(!c.dry_run);
    }

    #[test]
    fn args_override_env() {
        let c = cfg(
            &[("IPL_SEASON", "2024"), ("IPL_HISTORY_FILE", "env.csv")],
            &["--season", "2023", "--history=cli.csv", "--dry-run"],
        );
        assert_eq!(c.season, "2023");
        assert_eq!(c.history_file, PathBuf::from("cli.csv"));
        assert!(c.dry_run);
    }

    #[test]
    fn sheet_target_needs_an_id() {
        let c = cfg(&[("GOOGLE_ACCESS_TOKEN", "tok")], &[]);
        assert!(c.sheet.is_none());
        let c = cfg(&[("IPL_SHEET_ID", "abc"), ("GOOGLE_ACCESS_TOKEN", "s3cr3t")], &[]);
        let sheet = c.sheet.unwrap();
        assert_eq!(sheet.range, "Sheet1");
        assert_eq!(sheet.access_token.as_deref(), Some("s3cr3t"));
        assert!(!format!("{sheet:?}").contains("s3cr3t"));
    }

    #[test]
    fn retry_attempts_are_clamped() {
        assert_eq!(cfg(&[("IPL_RETRY_ATTEMPTS", "50")], &[]).retry_attempts, 6);
        assert_eq!(cfg(&[("IPL_RETRY_ATTEMPTS", "0")], &[]).retry_attempts, 1);
    }

    #[test]
    fn missing_token_only_fails_real_runs() {
        let vars = [("IPL_SHEET_ID", "abc")];
        assert!(cfg(&vars, &[]).publishing_sheet().is_err());
        assert!(cfg(&vars, &["--dry-run"]).publishing_sheet().unwrap().is_none());

        let c = cfg(&[("IPL_SHEET_ID", "abc"), ("GOOGLE_ACCESS_TOKEN", "s3cr3t")], &[]);
        let (target, token) = c.publishing_sheet().unwrap().unwrap();
        assert_eq!((target.spreadsheet_id.as_str(), token), ("abc", "s3cr3t"));
    }
}
