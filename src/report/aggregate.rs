use serde::Serialize;

use super::bucket::Bucket;
use crate::normalize::{Cohort, Partner};

/// Partner counts for the two fixed cohorts, zero-filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CohortCounts {
    pub facebook_group: usize,
    pub all_other: usize,
}

impl CohortCounts {
    pub fn from_partners(partners: &[Partner]) -> Self {
        partners.iter().fold(Self::default(), |mut acc, p| {
            match p.cohort {
                Cohort::FacebookGroup => acc.facebook_group += 1,
                Cohort::AllOther => acc.all_other += 1,
            }
            acc
        })
    }

    pub fn get(&self, cohort: Cohort) -> usize {
        match cohort {
            Cohort::FacebookGroup => self.facebook_group,
            Cohort::AllOther => self.all_other,
        }
    }

    pub fn total(&self) -> usize {
        self.facebook_group + self.all_other
    }
}

/// Sum of cleaned monthly costs; missing values count as zero here and only here.
pub fn revenue(partners: &[Partner]) -> f64 {
    partners.iter().map(|p| p.monthly_cost.unwrap_or(0.0)).sum()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketSummary {
    pub bucket: Bucket,
    pub count: usize,
    pub revenue: f64,
    pub cohorts: CohortCounts,
}

impl BucketSummary {
    pub fn from_partners(bucket: Bucket, partners: &[Partner]) -> Self {
        Self {
            bucket,
            count: partners.len(),
            revenue: revenue(partners),
            cohorts: CohortCounts::from_partners(partners),
        }
    }
}

/// One line of the cohort × bucket table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CohortSummaryRow {
    pub cohort: Cohort,
    /// Counts in `Bucket::ALL` order.
    pub counts: Vec<(Bucket, usize)>,
    pub total: usize,
}

/// Renewals by cohort: a row per cohort, a column per bucket, plus a total.
pub fn cohort_summary(buckets: &[BucketSummary]) -> Vec<CohortSummaryRow> {
    Cohort::ALL
        .iter()
        .map(|&cohort| {
            let counts: Vec<(Bucket, usize)> = buckets
                .iter()
                .map(|b| (b.bucket, b.cohorts.get(cohort)))
                .collect();
            let total = counts.iter().map(|(_, n)| n).sum();
            CohortSummaryRow {
                cohort,
                counts,
                total,
            }
        })
        .collect()
}

/// `£` + whole units with thousands separators. Presentation only.
/// Halves round to even.
pub fn format_currency(value: f64) -> String {
    let rounded = value.round_ties_even();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("£{}{}", sign, group_thousands(rounded.abs() as u64))
}

/// `1234567` → `1,234,567`
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::partner;

    #[test]
    fn test_cohort_counts_zero_fill() {
        let mut a = partner("a", 1);
        a.cohort = Cohort::FacebookGroup;
        let counts = CohortCounts::from_partners(&[a]);
        assert_eq!(counts.facebook_group, 1);
        assert_eq!(counts.all_other, 0);

        let empty = CohortCounts::from_partners(&[]);
        assert_eq!(empty, CohortCounts::default());
        assert_eq!(empty.total(), 0);
    }

    #[test]
    fn test_revenue_treats_missing_as_zero() {
        let mut a = partner("a", 1);
        a.monthly_cost = Some(1250.0);
        let b = partner("b", 2);
        let mut c = partner("c", 3);
        c.monthly_cost = Some(99.5);

        assert_eq!(revenue(&[a, b.clone(), c]), 1349.5);
        assert_eq!(revenue(&[b.clone()]), 0.0);
        assert_eq!(b.monthly_cost, None);
    }

    #[test]
    fn test_cohort_summary_totals() {
        let mut fb = partner("fb", 5);
        fb.cohort = Cohort::FacebookGroup;
        let other = partner("other", -3);
        let buckets = vec![
            BucketSummary::from_partners(Bucket::Within30, &[fb.clone()]),
            BucketSummary::from_partners(Bucket::Overdue, &[other.clone(), other]),
        ];

        let rows = cohort_summary(&buckets);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cohort, Cohort::FacebookGroup);
        assert_eq!(rows[0].counts, vec![(Bucket::Within30, 1), (Bucket::Overdue, 0)]);
        assert_eq!(rows[0].total, 1);
        assert_eq!(rows[1].cohort, Cohort::AllOther);
        assert_eq!(rows[1].total, 2);
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "£0");
        assert_eq!(format_currency(100.0), "£100");
        assert_eq!(format_currency(1249.6), "£1,250");
        assert_eq!(format_currency(1234567.0), "£1,234,567");
        assert_eq!(format_currency(-5.2), "£-5");
        assert_eq!(format_currency(-0.4), "£0");
        assert_eq!(format_currency(2.5), "£2");
        assert_eq!(format_currency(3.5), "£4");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(100000), "100,000");
    }
}
