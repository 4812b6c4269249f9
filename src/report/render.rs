use std::io::{self, Write};

use super::aggregate::{format_currency, group_thousands};
use super::export::table_title;
use super::filters::{rate_type_options, risk_banding_options};
use super::{BucketView, RenewalReport};
use crate::normalize::{Cohort, Partner};

/// Left-aligned plain-text table.
struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn write<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let line = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:<w$}", c, w = *w))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        writeln!(out, "{}", line(&self.headers))?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(out, "{}", line(&rule))?;
        for row in &self.rows {
            writeln!(out, "{}", line(row))?;
        }
        Ok(())
    }
}

/// Full terminal report: metric strips, cohort summary, then per-bucket tables.
pub fn write_report<W: Write>(out: &mut W, report: &RenewalReport) -> io::Result<()> {
    writeln!(out, "Partner Renewals Dashboard")?;
    writeln!(out, "As of {}", report.as_of)?;
    writeln!(out)?;

    let mut counts = TextTable::new(report.buckets.iter().map(|b| b.bucket().metric_label()));
    counts.push(
        report
            .buckets
            .iter()
            .map(|b| group_thousands(b.summary.count as u64))
            .collect(),
    );
    counts.write(out)?;
    writeln!(out)?;

    let mut revenue = TextTable::new(report.buckets.iter().map(|b| b.bucket().revenue_label()));
    revenue.push(
        report
            .buckets
            .iter()
            .map(|b| format_currency(b.summary.revenue))
            .collect(),
    );
    revenue.write(out)?;
    writeln!(out)?;

    writeln!(out, "Renewals by Cohort")?;
    let mut headers = vec!["Cohort".to_string()];
    headers.extend(report.buckets.iter().map(|b| b.bucket().label().to_string()));
    headers.push("Total".to_string());
    let mut summary = TextTable::new(headers);
    for row in &report.cohort_summary {
        let mut cells = vec![row.cohort.label().to_string()];
        cells.extend(row.counts.iter().map(|(_, n)| n.to_string()));
        cells.push(row.total.to_string());
        summary.push(cells);
    }
    summary.write(out)?;

    for view in &report.buckets {
        writeln!(out)?;
        write_bucket(out, view)?;
    }
    Ok(())
}

/// Values available to `--risk` and `--rate-type`, one per line.
pub fn write_filter_options<W: Write>(out: &mut W, partners: &[Partner]) -> io::Result<()> {
    for (heading, options) in [
        ("Risk banding", risk_banding_options(partners)),
        ("Rate type", rate_type_options(partners)),
    ] {
        writeln!(out, "{}:", heading)?;
        if options.is_empty() {
            writeln!(out, "  (none)")?;
        }
        for option in options {
            writeln!(out, "  {}", option)?;
        }
    }
    Ok(())
}

fn write_bucket<W: Write>(out: &mut W, view: &BucketView) -> io::Result<()> {
    let title = view.bucket().title();
    writeln!(out, "== {} ==", title)?;
    writeln!(out, "{} cohort counts", title)?;
    let mut counts = TextTable::new(["Cohort", "Partners"]);
    for cohort in Cohort::ALL {
        counts.push(vec![
            cohort.label().to_string(),
            view.summary.cohorts.get(cohort).to_string(),
        ]);
    }
    counts.write(out)?;

    for cohort in Cohort::ALL {
        writeln!(out)?;
        writeln!(out, "{}", table_title(view.bucket(), cohort))?;
        let rows = view.cohort(cohort);
        if rows.is_empty() {
            writeln!(out, "No partners in this bucket.")?;
            continue;
        }
        partner_table(&rows).write(out)?;
    }
    Ok(())
}

fn partner_table(partners: &[Partner]) -> TextTable {
    let mut table = TextTable::new([
        "Partner",
        "Rate type",
        "CPL",
        "Monthly cost",
        "Renewal date",
        "Days",
    ]);
    for p in super::export::export_order(partners) {
        table.push(vec![
            p.name.clone(),
            p.rate_type.clone().unwrap_or_default(),
            p.cpl_raw.clone().unwrap_or_default(),
            p.monthly_cost.map(format_currency).unwrap_or_default(),
            p.renewal_date.to_string(),
            p.days_to_renewal.to_string(),
        ]);
    }
    table
}
