// src/roster/mod.rs
use csv::ReaderBuilder;
use reqwest::Client;
use std::{
    fmt,
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::error::RosterError;

pub mod cache;
pub mod sheets;
pub mod workbook;

pub use cache::SourceCache;
pub use sheets::SheetCredentials;

/// Worksheet the partner roster lives on.
pub const PARTNER_SHEET: &str = "Overall Used car partners Feb";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    /// Header labels, trimmed, exactly as the source names them.
    pub headers: Vec<String>,
    /// Each data row as one String per header. Short rows are padded with "".
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Build a table from a header row and data rows.
    ///
    /// - headers are trimmed
    /// - the width is the widest of the header row and every data row;
    ///   headers and short rows are padded with ""
    /// - rows where every cell is blank are dropped
    ///
    /// Columns are never dropped: a column's index is its position in the sheet.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = rows.iter().map(Vec::len).fold(headers.len(), usize::max);

        let mut headers: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
        headers.resize(width, String::new());

        let rows = rows
            .into_iter()
            .filter(|r| r.iter().any(|c| !c.trim().is_empty()))
            .map(|mut r| {
                r.resize(width, String::new());
                r
            })
            .collect();

        Self { headers, rows }
    }

    /// Build a table from a 2-D grid where the first row holds the headers.
    pub fn from_grid(mut grid: Vec<Vec<String>>) -> Self {
        if grid.is_empty() {
            return Self::new(Vec::new(), Vec::new());
        }
        let headers = grid.remove(0);
        Self::new(headers, grid)
    }

    /// Parse CSV text (first record = headers). Bytes that are not UTF-8
    /// (a `£` saved as Windows-1252) become U+FFFD instead of failing the load.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, RosterError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut grid = Vec::new();
        for result in rdr.byte_records() {
            let record = result?;
            grid.push(
                record
                    .iter()
                    .map(|field| String::from_utf8_lossy(field).into_owned())
                    .collect::<Vec<_>>(),
            );
        }
        Ok(Self::from_grid(grid))
    }

    /// Read a CSV export of the roster worksheet from disk.
    #[tracing::instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, RosterError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| RosterError::unavailable(path.display().to_string(), e))?;
        let table = Self::from_csv_reader(BufReader::new(file))?;
        debug!(
            columns = table.headers.len(),
            rows = table.rows.len(),
            "read roster file"
        );
        Ok(table)
    }

    /// Cell at `(row, col)`; `None` for out-of-range indices.
    #[cfg(test)]
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Where a roster comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Local CSV export of the roster worksheet.
    File(PathBuf),
    /// Local Excel/ODS workbook, read from one worksheet.
    Workbook { path: PathBuf, worksheet: String },
    /// Live Google Sheets worksheet.
    Sheet { id: String, worksheet: String },
}

impl Source {
    /// A local file source; workbook extensions read `worksheet`, anything else is CSV.
    pub fn local(path: PathBuf, worksheet: &str) -> Self {
        if workbook::is_workbook(&path) {
            Source::Workbook {
                path,
                worksheet: worksheet.to_string(),
            }
        } else {
            Source::File(path)
        }
    }

    /// Stable cache key for this source.
    pub fn key(&self) -> String {
        match self {
            Source::File(path) => format!("file:{}", path.display()),
            Source::Workbook { path, worksheet } => {
                format!("workbook:{}#{}", path.display(), worksheet)
            }
            Source::Sheet { id, worksheet } => format!("sheet:{}/{}", id, worksheet),
        }
    }

    /// Fetch the raw table. Any I/O, HTTP or auth failure is fatal for this load.
    pub async fn load(
        &self,
        client: &Client,
        creds: &SheetCredentials,
    ) -> Result<RawTable, RosterError> {
        let table = match self {
            Source::File(path) => {
                let path = path.clone();
                tokio::task::spawn_blocking(move || RawTable::from_csv_path(path))
                    .await
                    .map_err(|e| RosterError::unavailable(self.key(), e))??
            }
            Source::Workbook { path, worksheet } => {
                let (path, worksheet) = (path.clone(), worksheet.clone());
                tokio::task::spawn_blocking(move || workbook::read_worksheet(path, &worksheet))
                    .await
                    .map_err(|e| RosterError::unavailable(self.key(), e))??
            }
            Source::Sheet { id, worksheet } => {
                sheets::fetch_worksheet(client, id, worksheet, creds).await?
            }
        };
        info!(source = %self, rows = table.rows.len(), "loaded roster");
        Ok(table)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::File(path) => write!(f, "{}", path.display()),
            Source::Workbook { path, worksheet } => {
                write!(f, "{} ({})", path.display(), worksheet)
            }
            Source::Sheet { id, worksheet } => write!(f, "sheet {} ({})", id, worksheet),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_new_drops_blank_rows_but_keeps_every_column() {
        let table = RawTable::new(
            strings(&[" Dealership Group Name ", "", "CPL"]),
            vec![
                strings(&["Acme", "", "15"]),
                strings(&["", " ", ""]),
                strings(&["Bravo"]),
            ],
        );
        assert_eq!(table.headers, strings(&["Dealership Group Name", "", "CPL"]));
        assert_eq!(
            table.rows,
            vec![strings(&["Acme", "", "15"]), strings(&["Bravo", "", ""])]
        );
    }

    #[test]
    fn test_rows_wider_than_headers_widen_the_table() {
        let table = RawTable::from_grid(vec![
            strings(&["A", "B"]),
            strings(&["x", "y", "z"]),
            strings(&["w"]),
        ]);
        assert_eq!(table.headers, strings(&["A", "B", ""]));
        assert_eq!(table.cell(0, 2), Some("z"));
        assert_eq!(table.cell(1, 2), Some(""));
    }

    #[test]
    fn test_from_csv_path() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        write!(
            tmp,
            "Dealership Group Name,Actual renewal date,Monthly subscription cost\n\
             Acme,2024-03-15,\"£1,250.00\"\n\
             ,,\n\
             Bravo,03/15/2024\n"
        )?;

        let table = RawTable::from_csv_path(tmp.path())?;
        assert_eq!(table.headers.len(), 3);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.cell(0, 2), Some("£1,250.00"));
        assert_eq!(table.cell(1, 2), Some(""));
        Ok(())
    }

    #[test]
    fn test_non_utf8_bytes_only_damage_their_cell() -> Result<()> {
        let bytes: &[u8] =
            b"Dealership Group Name,Actual renewal date,Monthly subscription cost\nAcme,2024-03-15,\xa3100\n";
        let table = RawTable::from_csv_reader(bytes)?;
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.cell(0, 0), Some("Acme"));
        assert_eq!(table.cell(0, 2), Some("\u{FFFD}100"));
        assert_eq!(
            crate::normalize::numeric::clean_currency(&table.rows[0][2]),
            Some(100.0)
        );
        Ok(())
    }

    #[test]
    fn test_missing_file_is_source_unavailable() {
        let err = RawTable::from_csv_path("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, RosterError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_source_keys_are_distinct() {
        let a = Source::File(PathBuf::from("roster.csv"));
        let b = Source::Sheet {
            id: "abc".into(),
            worksheet: PARTNER_SHEET.into(),
        };
        assert_eq!(a.key(), "file:roster.csv");
        assert_eq!(b.key(), format!("sheet:abc/{}", PARTNER_SHEET));
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_local_source_picks_format_by_extension() {
        assert_eq!(
            Source::local(PathBuf::from("roster.XLSX"), PARTNER_SHEET),
            Source::Workbook {
                path: PathBuf::from("roster.XLSX"),
                worksheet: PARTNER_SHEET.into(),
            }
        );
        assert_eq!(
            Source::local(PathBuf::from("roster.csv"), PARTNER_SHEET),
            Source::File(PathBuf::from("roster.csv"))
        );
    }
}
