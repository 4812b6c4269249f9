// src/report/mod.rs
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::normalize::{Cohort, NormalizeStats, Partner, Roster, RosterColumns};

pub mod aggregate;
pub mod bucket;
pub mod export;
pub mod filters;
pub mod render;

pub use aggregate::{cohort_summary, format_currency, revenue, BucketSummary, CohortCounts};
pub use bucket::{renewal_bucket, Bucket};
pub use filters::Filters;

/// One tab of the dashboard: a bucket's partners and their totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketView {
    pub summary: BucketSummary,
    pub partners: Vec<Partner>,
}

impl BucketView {
    pub fn bucket(&self) -> Bucket {
        self.summary.bucket
    }

    /// Partners of one cohort, still in renewal order.
    pub fn cohort(&self, cohort: Cohort) -> Vec<Partner> {
        self.partners
            .iter()
            .filter(|p| p.cohort == cohort)
            .cloned()
            .collect()
    }
}

/// Everything the presentation layer needs for one recomputation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenewalReport {
    pub as_of: NaiveDate,
    pub columns: RosterColumns,
    pub stats: NormalizeStats,
    /// Partner count after filters.
    pub partners: usize,
    /// In `Bucket::ALL` order.
    pub buckets: Vec<BucketView>,
    pub cohort_summary: Vec<aggregate::CohortSummaryRow>,
}

impl RenewalReport {
    /// Filter the roster, bucket it and aggregate each bucket.
    pub fn build(roster: &Roster, filters: &Filters) -> Self {
        let partners = filters.apply(&roster.partners);

        let buckets: Vec<BucketView> = Bucket::ALL
            .iter()
            .map(|b| {
                let rows = b.select(&partners);
                BucketView {
                    summary: BucketSummary::from_partners(*b, &rows),
                    partners: rows,
                }
            })
            .collect();

        let summaries: Vec<BucketSummary> = buckets.iter().map(|b| b.summary.clone()).collect();
        let cohort_summary = cohort_summary(&summaries);

        info!(
            partners = partners.len(),
            overdue = summaries.iter().find(|s| s.bucket == Bucket::Overdue).map_or(0, |s| s.count),
            "built renewal report"
        );

        Self {
            as_of: roster.as_of,
            columns: roster.columns.clone(),
            stats: roster.stats,
            partners: partners.len(),
            buckets,
            cohort_summary,
        }
    }

    pub fn bucket(&self, bucket: Bucket) -> Option<&BucketView> {
        self.buckets.iter().find(|b| b.bucket() == bucket)
    }
}
