// src/roster/sheets.rs

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::RawTable;
use crate::error::RosterError;

static SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets/";

/// Credentials for the Sheets `values` endpoint. A bearer token wins over an API key.
#[derive(Debug, Clone, Default)]
pub struct SheetCredentials {
    pub access_token: Option<String>,
    pub api_key: Option<String>,
}

impl SheetCredentials {
    pub fn is_empty(&self) -> bool {
        self.access_token.as_deref().map_or(true, str::is_empty)
            && self.api_key.as_deref().map_or(true, str::is_empty)
    }
}

/// Body of `GET spreadsheets/{id}/values/{range}`.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// Build the `values` URL for a whole worksheet.
pub fn values_url(
    sheet_id: &str,
    worksheet: &str,
    api_key: Option<&str>,
) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(SHEETS_API_BASE)?;
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend([sheet_id, "values", worksheet]);
    if let Some(key) = api_key {
        url.query_pairs_mut().append_pair("key", key);
    }
    Ok(url)
}

/// Fetch every cell of `worksheet` and turn it into a [`RawTable`].
pub async fn fetch_worksheet(
    client: &Client,
    sheet_id: &str,
    worksheet: &str,
    creds: &SheetCredentials,
) -> Result<RawTable, RosterError> {
    if creds.is_empty() {
        return Err(RosterError::MissingCredentials);
    }
    let source_id = format!("Google Sheet {}", sheet_id);

    let token = creds.access_token.as_deref().filter(|t| !t.is_empty());
    let key = if token.is_none() {
        creds.api_key.as_deref()
    } else {
        None
    };
    let url = values_url(sheet_id, worksheet, key)
        .map_err(|e| RosterError::unavailable(&source_id, e))?;

    let mut req = client.get(url);
    if let Some(token) = token {
        req = req.bearer_auth(token);
    }

    let body: ValueRange = req
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| RosterError::unavailable(&source_id, e))?
        .json()
        .await
        .map_err(|e| RosterError::unavailable(&source_id, e))?;

    debug!(rows = body.values.len(), "fetched worksheet values");
    Ok(table_from_values(body.values))
}

/// Cells arrive as JSON strings (formatted values) but numbers and bools are
/// tolerated in case the request asked for unformatted values.
fn table_from_values(values: Vec<Vec<serde_json::Value>>) -> RawTable {
    let grid = values
        .into_iter()
        .map(|row| row.into_iter().map(cell_to_string).collect())
        .collect();
    RawTable::from_grid(grid)
}

fn cell_to_string(v: serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
