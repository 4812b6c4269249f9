use serde::Serialize;
use std::fmt;

use crate::normalize::Partner;

/// Days-to-renewal ranges used for reporting. Every integer falls in exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Bucket {
    Overdue,
    Within30,
    Within60,
    Within90,
    Beyond90,
}

impl Bucket {
    /// Display order of the metric strip and tabs.
    pub const ALL: [Bucket; 5] = [
        Bucket::Within30,
        Bucket::Within60,
        Bucket::Within90,
        Bucket::Overdue,
        Bucket::Beyond90,
    ];

    /// Inclusive `(min, max)`; `None` means unbounded on that side.
    pub fn range(&self) -> (Option<i64>, Option<i64>) {
        match self {
            Bucket::Overdue => (None, Some(-1)),
            Bucket::Within30 => (Some(0), Some(30)),
            Bucket::Within60 => (Some(31), Some(60)),
            Bucket::Within90 => (Some(61), Some(90)),
            Bucket::Beyond90 => (Some(91), None),
        }
    }

    #[cfg(test)]
    fn of(days: i64) -> Bucket {
        match days {
            i64::MIN..=-1 => Bucket::Overdue,
            0..=30 => Bucket::Within30,
            31..=60 => Bucket::Within60,
            61..=90 => Bucket::Within90,
            _ => Bucket::Beyond90,
        }
    }

    pub fn contains(&self, days: i64) -> bool {
        let (min, max) = self.range();
        min.map_or(true, |m| days >= m) && max.map_or(true, |m| days <= m)
    }

    /// Rows of `partners` in this bucket, order preserved.
    pub fn select(&self, partners: &[Partner]) -> Vec<Partner> {
        partners
            .iter()
            .filter(|p| self.contains(p.days_to_renewal))
            .cloned()
            .collect()
    }

    /// Short column label, e.g. `0-30 days`.
    pub fn label(&self) -> &'static str {
        match self {
            Bucket::Overdue => "Overdue",
            Bucket::Within30 => "0-30 days",
            Bucket::Within60 => "31-60 days",
            Bucket::Within90 => "61-90 days",
            Bucket::Beyond90 => "90+ days",
        }
    }

    /// Section heading for the bucket's partner tables.
    pub fn title(&self) -> &'static str {
        match self {
            Bucket::Overdue => "Partners Overdue for Renewal",
            Bucket::Within30 => "Partners Renewing in 0-30 Days",
            Bucket::Within60 => "Partners Renewing in 31-60 Days",
            Bucket::Within90 => "Partners Renewing in 61-90 Days",
            Bucket::Beyond90 => "Partners Renewing in 90+ Days",
        }
    }

    pub fn metric_label(&self) -> &'static str {
        match self {
            Bucket::Overdue => "Overdue",
            Bucket::Within30 => "Renewing in 0-30 days",
            Bucket::Within60 => "Renewing in 31-60 days",
            Bucket::Within90 => "Renewing in 61-90 days",
            Bucket::Beyond90 => "Renewing in 90+ days",
        }
    }

    pub fn revenue_label(&self) -> &'static str {
        match self {
            Bucket::Overdue => "Revenue overdue",
            Bucket::Within30 => "Revenue 0-30 days",
            Bucket::Within60 => "Revenue 31-60 days",
            Bucket::Within90 => "Revenue 61-90 days",
            Bucket::Beyond90 => "Revenue 90+ days",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Partners whose days-to-renewal lies in `[min_days, max_days]`.
pub fn renewal_bucket(partners: &[Partner], min_days: i64, max_days: i64) -> Vec<Partner> {
    partners
        .iter()
        .filter(|p| (min_days..=max_days).contains(&p.days_to_renewal))
        .cloned()
        .collect()
}
