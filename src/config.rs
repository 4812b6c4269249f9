//! Command-line and environment configuration.

use anyhow::{bail, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use std::{path::PathBuf, time::Duration};

use crate::report::Filters;
use crate::roster::{cache::DEFAULT_TTL, SheetCredentials, Source, PARTNER_SHEET};

#[derive(Debug, Parser)]
#[command(name = "renewals")]
#[command(about = "Partner renewal buckets by cohort, from a roster file or a live Google Sheet")]
#[command(version)]
pub struct Cli {
    /// Google Sheet ID of the live roster
    #[arg(long, env = "GOOGLE_SHEET_ID")]
    pub sheet_id: Option<String>,

    /// Local roster file: an .xlsx/.xls/.ods workbook, or a CSV export of the worksheet
    #[arg(long, env = "ROSTER_FILE")]
    pub file: Option<PathBuf>,

    /// Worksheet holding the partner roster
    #[arg(long, env = "ROSTER_WORKSHEET", default_value = PARTNER_SHEET)]
    pub worksheet: String,

    /// OAuth bearer token for the Sheets API
    #[arg(long, env = "GOOGLE_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// API key for the Sheets API (used when no token is given)
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Reference date (YYYY-MM-DD); defaults to today
    #[arg(long, value_parser = parse_as_of)]
    pub as_of: Option<NaiveDate>,

    /// Keep only these risk bandings (repeatable)
    #[arg(long = "risk")]
    pub risk_bandings: Vec<String>,

    /// Keep only these rate types, e.g. "CPL" or "Flat Rate" (repeatable)
    #[arg(long = "rate-type")]
    pub rate_types: Vec<String>,

    /// Keep partners whose name contains this text (case-insensitive)
    #[arg(long)]
    pub name_contains: Option<String>,

    /// Write one CSV per bucket and cohort into this directory
    #[arg(long)]
    pub export_dir: Option<PathBuf>,

    /// Print the report as JSON instead of text tables
    #[arg(long)]
    pub json: bool,

    /// Print the risk bandings and rate types in the roster instead of the report
    #[arg(long)]
    pub list_filters: bool,

    /// Seconds a loaded roster stays fresh
    #[arg(long, default_value_t = DEFAULT_TTL.as_secs())]
    pub cache_ttl_secs: u64,

    /// Recompute every N seconds; press Enter to force a refetch
    #[arg(long)]
    pub watch_secs: Option<u64>,
}

fn parse_as_of(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

impl Cli {
    /// The live sheet wins when both are configured through the environment.
    pub fn source(&self) -> Result<Source> {
        if let Some(id) = self.sheet_id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            return Ok(Source::Sheet {
                id: id.to_string(),
                worksheet: self.worksheet.clone(),
            });
        }
        match &self.file {
            Some(path) => {
                if !path.exists() {
                    bail!("File not found: {}", path.display());
                }
                Ok(Source::local(path.clone(), &self.worksheet))
            }
            None => bail!("Google Sheet ID or roster file is required (--sheet-id or --file)"),
        }
    }

    pub fn credentials(&self) -> SheetCredentials {
        SheetCredentials {
            access_token: self.access_token.clone(),
            api_key: self.api_key.clone(),
        }
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn filters(&self) -> Filters {
        Filters {
            risk_bandings: self.risk_bandings.clone(),
            rate_types: self.rate_types.clone(),
            name_contains: self.name_contains.clone(),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn watch_interval(&self) -> Result<Option<Duration>> {
        match self.watch_secs {
            Some(0) => bail!("--watch-secs must be positive"),
            other => Ok(other.map(Duration::from_secs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("renewals").chain(args.iter().copied()))
            .expect("args should parse")
    }

    #[test]
    fn test_file_source_and_filters() -> Result<()> {
        let tmp = NamedTempFile::new()?;
        let path = tmp.path().to_string_lossy().to_string();
        let cli = parse(&[
            "--file",
            &path,
            "--as-of",
            "2024-01-10",
            "--risk",
            "High",
            "--risk",
            "Low",
            "--name-contains",
            "motors",
        ]);

        assert_eq!(cli.source()?, Source::File(tmp.path().to_path_buf()));
        assert_eq!(cli.as_of(), NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        let f = cli.filters();
        assert_eq!(f.risk_bandings, vec!["High", "Low"]);
        assert_eq!(f.name_contains.as_deref(), Some("motors"));
        assert_eq!(cli.cache_ttl(), Duration::from_secs(60));
        Ok(())
    }

    #[test]
    fn test_workbook_file_reads_named_worksheet() -> Result<()> {
        let tmp = tempfile::Builder::new().suffix(".xlsx").tempfile()?;
        let path = tmp.path().to_string_lossy().to_string();
        let cli = parse(&["--file", &path, "--worksheet", "Partners", "--list-filters"]);
        assert_eq!(
            cli.source()?,
            Source::Workbook {
                path: tmp.path().to_path_buf(),
                worksheet: "Partners".into(),
            }
        );
        assert!(cli.list_filters);
        Ok(())
    }

    #[test]
    fn test_sheet_source_uses_default_worksheet() -> Result<()> {
        let cli = parse(&["--sheet-id", " abc ", "--access-token", "t"]);
        assert_eq!(
            cli.source()?,
            Source::Sheet {
                id: "abc".into(),
                worksheet: PARTNER_SHEET.into(),
            }
        );
        assert_eq!(cli.credentials().access_token.as_deref(), Some("t"));
        Ok(())
    }

    #[test]
    fn test_missing_file_is_reported() {
        let cli = parse(&["--file", "/no/such/roster.csv"]);
        let err = cli.source().unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }

    #[test]
    fn test_bad_as_of_is_rejected() {
        let res = Cli::try_parse_from(["renewals", "--file", "x.csv", "--as-of", "10/01/2024"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_zero_watch_interval_is_rejected() {
        let cli = parse(&["--file", "x.csv", "--watch-secs", "0"]);
        assert!(cli.watch_interval().is_err());
    }
}
