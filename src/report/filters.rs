use std::collections::BTreeSet;

use crate::normalize::Partner;

/// Sidebar-style filters. Empty selections leave the roster untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub risk_bandings: Vec<String>,
    pub rate_types: Vec<String>,
    pub name_contains: Option<String>,
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        self.risk_bandings.is_empty()
            && self.rate_types.is_empty()
            && self.name_contains.as_deref().map_or(true, str::is_empty)
    }

    pub fn apply(&self, partners: &[Partner]) -> Vec<Partner> {
        let query = self
            .name_contains
            .as_deref()
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);

        partners
            .iter()
            .filter(|p| {
                self.risk_bandings.is_empty()
                    || p.risk_banding
                        .as_deref()
                        .is_some_and(|r| self.risk_bandings.iter().any(|s| s == r.trim()))
            })
            .filter(|p| {
                self.rate_types.is_empty()
                    || p.rate_type
                        .as_deref()
                        .is_some_and(|r| self.rate_types.iter().any(|s| s == r))
            })
            .filter(|p| {
                query
                    .as_deref()
                    .map_or(true, |q| p.name.to_lowercase().contains(q))
            })
            .cloned()
            .collect()
    }
}

/// Distinct non-blank risk bandings, trimmed and sorted.
pub fn risk_banding_options(partners: &[Partner]) -> Vec<String> {
    partners
        .iter()
        .filter_map(|p| p.risk_banding.as_deref())
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct rate types as written, sorted.
pub fn rate_type_options(partners: &[Partner]) -> Vec<String> {
    partners
        .iter()
        .filter_map(|p| p.rate_type.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
