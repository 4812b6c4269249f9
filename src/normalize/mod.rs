// src/normalize/mod.rs
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::error::RosterError;
use crate::roster::RawTable;

pub mod cohort;
pub mod columns;
pub mod date_parser;
pub mod numeric;

pub use cohort::Cohort;
use columns::{
    resolve_index, resolve_renewal_index, CPL_COLUMN, MONTHLY_COST_COLUMN, PARTNER_COLUMN,
    PARTNER_ID_COLUMN, RATE_TYPE_COLUMN, RENEWAL_COLUMN, RISK_BANDING_COLUMN,
};
use date_parser::{parse_renewal_date, DateSource};
use numeric::{clean_currency, parse_numeric};

/// One partner row after normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Partner {
    pub id: Option<String>,
    pub name: String,
    pub rate_type: Option<String>,
    pub cpl_raw: Option<String>,
    pub cpl: Option<f64>,
    pub cohort: Cohort,
    pub monthly_cost_raw: Option<String>,
    pub monthly_cost: Option<f64>,
    pub risk_banding: Option<String>,
    /// Working renewal date.
    pub renewal_date: NaiveDate,
    /// `renewal_date - as_of`, negative when overdue.
    pub days_to_renewal: i64,
}

impl Partner {
    pub fn days_until(&self, as_of: NaiveDate) -> i64 {
        (self.renewal_date - as_of).num_days()
    }
}

/// A resolved source column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Column {
    pub header: String,
    pub index: usize,
}

impl Column {
    fn at(headers: &[String], index: usize) -> Self {
        Self {
            header: headers[index].clone(),
            index,
        }
    }
}

/// Which source column each logical column resolved to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RosterColumns {
    pub partner: Column,
    pub renewal: Column,
    pub partner_id: Option<Column>,
    pub rate_type: Option<Column>,
    pub cpl: Option<Column>,
    pub monthly_cost: Option<Column>,
    pub risk_banding: Option<Column>,
}

impl RosterColumns {
    /// Resolve every logical column against `headers`.
    /// Fails when the partner or renewal column cannot be found.
    pub fn resolve(headers: &[String]) -> Result<Self, RosterError> {
        let partner = resolve_index(headers, PARTNER_COLUMN, &[]);
        let renewal = resolve_renewal_index(headers);

        let (partner, renewal) = match (partner, renewal) {
            (Some(p), Some(r)) => (Column::at(headers, p), Column::at(headers, r)),
            (p, r) => {
                let mut missing = Vec::new();
                if p.is_none() {
                    missing.push(PARTNER_COLUMN.to_string());
                }
                if r.is_none() {
                    missing.push(RENEWAL_COLUMN.to_string());
                }
                return Err(RosterError::MissingColumns {
                    missing,
                    found: headers.to_vec(),
                });
            }
        };

        let optional =
            |name: &str| resolve_index(headers, name, &[]).map(|i| Column::at(headers, i));
        Ok(Self {
            partner,
            renewal,
            partner_id: optional(PARTNER_ID_COLUMN),
            rate_type: optional(RATE_TYPE_COLUMN),
            cpl: optional(CPL_COLUMN),
            monthly_cost: optional(MONTHLY_COST_COLUMN),
            risk_banding: optional(RISK_BANDING_COLUMN),
        })
    }
}

/// Row-level outcomes. None of these abort a load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeStats {
    pub rows_in: usize,
    pub missing_name: usize,
    pub unparseable_date: usize,
    pub fallback_dates: usize,
    pub invalid_cpl: usize,
    pub invalid_cost: usize,
}

impl NormalizeStats {
    pub fn dropped(&self) -> usize {
        self.missing_name + self.unparseable_date
    }
}

/// Normalized roster for one as-of date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Roster {
    pub as_of: NaiveDate,
    pub columns: RosterColumns,
    pub partners: Vec<Partner>,
    pub stats: NormalizeStats,
}

impl Roster {
    /// Same partners against a different as-of date.
    pub fn rebase(&self, as_of: NaiveDate) -> Roster {
        let partners = self
            .partners
            .iter()
            .map(|p| Partner {
                days_to_renewal: p.days_until(as_of),
                ..p.clone()
            })
            .collect();
        Roster {
            as_of,
            columns: self.columns.clone(),
            partners,
            stats: self.stats,
        }
    }
}

/// raw table → resolved columns → per-row enrichment → drop rows without a
/// name or date → sort by (renewal date, name).
#[tracing::instrument(level = "debug", skip(table), fields(rows = table.rows.len()))]
pub fn normalize_partners(table: &RawTable, as_of: NaiveDate) -> Result<Roster, RosterError> {
    let columns = RosterColumns::resolve(&table.headers)?;
    debug!(
        partner = %columns.partner.header,
        renewal = %columns.renewal.header,
        renewal_index = columns.renewal.index,
        "resolved columns"
    );

    let mut stats = NormalizeStats {
        rows_in: table.rows.len(),
        ..Default::default()
    };
    let mut partners = Vec::with_capacity(table.rows.len());

    for (i, row) in table.rows.iter().enumerate() {
        let cell = |c: usize| row.get(c).map(String::as_str).unwrap_or("");
        let optional = |c: &Option<Column>| c.as_ref().map(|c| cell(c.index).to_string());

        let name = cell(columns.partner.index).trim();
        if name.is_empty() {
            trace!(row = i, "dropping row without partner name");
            stats.missing_name += 1;
            continue;
        }

        let raw_date = cell(columns.renewal.index);
        let Some((renewal_date, how)) = parse_renewal_date(raw_date) else {
            debug!(row = i, partner = name, raw = raw_date, "dropping unparseable renewal date");
            stats.unparseable_date += 1;
            continue;
        };
        if how == DateSource::Fallback {
            trace!(row = i, raw = raw_date, %renewal_date, "renewal date via fallback parser");
            stats.fallback_dates += 1;
        }

        let cpl_raw = optional(&columns.cpl);
        let cpl = cpl_raw.as_deref().and_then(parse_numeric);
        if cpl.is_none() && cpl_raw.as_deref().is_some_and(|s| !s.trim().is_empty()) {
            stats.invalid_cpl += 1;
        }

        let monthly_cost_raw = optional(&columns.monthly_cost);
        let monthly_cost = monthly_cost_raw.as_deref().and_then(clean_currency);
        if monthly_cost.is_none()
            && monthly_cost_raw
                .as_deref()
                .is_some_and(|s| !s.trim().is_empty())
        {
            stats.invalid_cost += 1;
        }

        partners.push(Partner {
            id: optional(&columns.partner_id),
            name: name.to_string(),
            rate_type: optional(&columns.rate_type),
            cohort: Cohort::classify(cpl),
            cpl_raw,
            cpl,
            monthly_cost_raw,
            monthly_cost,
            risk_banding: optional(&columns.risk_banding),
            renewal_date,
            days_to_renewal: (renewal_date - as_of).num_days(),
        });
    }

    partners.sort_by(|a, b| {
        a.renewal_date
            .cmp(&b.renewal_date)
            .then_with(|| a.name.cmp(&b.name))
    });

    if stats.dropped() > 0 {
        warn!(
            missing_name = stats.missing_name,
            unparseable_date = stats.unparseable_date,
            "dropped roster rows"
        );
    }
    info!(kept = partners.len(), %as_of, "normalized partners");

    Ok(Roster {
        as_of,
        columns,
        partners,
        stats,
    })
}
