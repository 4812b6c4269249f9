// src/normalize/columns.rs

use std::collections::HashMap;

pub const PARTNER_COLUMN: &str = "Dealership Group Name";
pub const RENEWAL_COLUMN: &str = "Actual renewal date";
pub const PARTNER_ID_COLUMN: &str = "Dealership Group ID";
pub const RATE_TYPE_COLUMN: &str = "CPL or Flat Rate";
pub const CPL_COLUMN: &str = "CPL";
pub const MONTHLY_COST_COLUMN: &str = "Monthly subscription cost";
pub const RISK_BANDING_COLUMN: &str = "Risk banding";

pub const RENEWAL_ALIASES: &[&str] = &["Actual Renewal Date", "Renewal Date", "renewal date"];

/// Live sheets drift in header text but keep their column order; the renewal
/// date sits in column M.
pub const RENEWAL_FALLBACK_INDEX: usize = 12;

/// Trim, collapse runs of whitespace to one space, lowercase.
pub fn normalize_colname(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Position of the header matching `target`, else of the first alias that
/// matches. When two headers normalize to the same key the later one wins.
pub fn resolve_index(headers: &[String], target: &str, aliases: &[&str]) -> Option<usize> {
    let normalized: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (normalize_colname(h), i))
        .collect();

    std::iter::once(target)
        .chain(aliases.iter().copied())
        .find_map(|wanted| normalized.get(&normalize_colname(wanted)).copied())
}

/// Header label matching `target` or one of `aliases`.
#[cfg(test)]
fn resolve_column<'a>(
    headers: &'a [String],
    target: &str,
    aliases: &[&str],
) -> Option<&'a str> {
    resolve_index(headers, target, aliases).map(|i| headers[i].as_str())
}

/// Name match first, then the fixed position. Never fuzzy.
pub fn resolve_renewal_index(headers: &[String]) -> Option<usize> {
    resolve_index(headers, RENEWAL_COLUMN, RENEWAL_ALIASES)
        .or_else(|| (headers.len() > RENEWAL_FALLBACK_INDEX).then_some(RENEWAL_FALLBACK_INDEX))
}

#[cfg(test)]
fn resolve_renewal_column(headers: &[String]) -> Option<&str> {
    resolve_renewal_index(headers).map(|i| headers[i].as_str())
}
