// src/roster/workbook.rs

use calamine::{open_workbook_auto, Data, DataType, Reader};
use std::path::Path;
use tracing::debug;

use super::RawTable;
use crate::error::RosterError;

/// File extensions read as spreadsheets; everything else is treated as CSV.
pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

pub fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| WORKBOOK_EXTENSIONS.iter().any(|w| w.eq_ignore_ascii_case(ext)))
}

/// Read every cell of `worksheet` into a [`RawTable`].
///
/// The used range may start right of column A; leading cells are padded back
/// in so column indices match the sheet.
#[tracing::instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
pub fn read_worksheet<P: AsRef<Path>>(path: P, worksheet: &str) -> Result<RawTable, RosterError> {
    let path = path.as_ref();
    let source_id = path.display().to_string();

    let mut workbook =
        open_workbook_auto(path).map_err(|e| RosterError::unavailable(&source_id, e))?;
    let range = workbook.worksheet_range(worksheet).map_err(|e| {
        RosterError::unavailable(&source_id, format!("worksheet {:?}: {}", worksheet, e))
    })?;

    let first_col = range.start().map_or(0, |(_, col)| col as usize);
    let grid: Vec<Vec<String>> = range
        .rows()
        .map(|row| {
            std::iter::repeat(String::new())
                .take(first_col)
                .chain(row.iter().map(cell_to_string))
                .collect()
        })
        .collect();

    debug!(rows = grid.len(), first_col, "read workbook worksheet");
    Ok(RawTable::from_grid(grid))
}

/// Excel dates come out as `YYYY-MM-DD`; other cells use their display form.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}
