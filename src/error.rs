// src/error.rs

use thiserror::Error;

/// Load-level failures. Row-level problems (bad dates, blank names, junk
/// numerics) never surface here; they are counted in `NormalizeStats`.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("missing required columns: {}. Found columns: {}", .missing.join(", "), .found.join(", "))]
    MissingColumns {
        missing: Vec<String>,
        found: Vec<String>,
    },

    #[error("could not read {source_id}: {reason}")]
    SourceUnavailable { source_id: String, reason: String },

    #[error("no Google credentials provided; set an access token or an API key")]
    MissingCredentials,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl RosterError {
    pub fn unavailable(source_id: impl Into<String>, reason: impl ToString) -> Self {
        RosterError::SourceUnavailable {
            source_id: source_id.into(),
            reason: reason.to_string(),
        }
    }
}
