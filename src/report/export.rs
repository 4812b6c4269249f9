use anyhow::{Context, Result};
use csv::Writer;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use super::{Bucket, RenewalReport};
use crate::normalize::{
    columns::{
        CPL_COLUMN, MONTHLY_COST_COLUMN, PARTNER_COLUMN, PARTNER_ID_COLUMN, RATE_TYPE_COLUMN,
    },
    Cohort, Partner, RosterColumns,
};

pub const COHORT_HEADER: &str = "Cohort";
pub const WORKING_DATE_HEADER: &str = "Renewal Date (Working)";
pub const DAYS_HEADER: &str = "Days to Renewal";

/// Export columns, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportColumn {
    PartnerId,
    PartnerName,
    RateType,
    Cpl,
    Cohort,
    MonthlyCost,
    RenewalDate,
    DaysToRenewal,
}

impl ExportColumn {
    fn header(&self) -> &'static str {
        match self {
            ExportColumn::PartnerId => PARTNER_ID_COLUMN,
            ExportColumn::PartnerName => PARTNER_COLUMN,
            ExportColumn::RateType => RATE_TYPE_COLUMN,
            ExportColumn::Cpl => CPL_COLUMN,
            ExportColumn::Cohort => COHORT_HEADER,
            ExportColumn::MonthlyCost => MONTHLY_COST_COLUMN,
            ExportColumn::RenewalDate => WORKING_DATE_HEADER,
            ExportColumn::DaysToRenewal => DAYS_HEADER,
        }
    }

    fn value(&self, p: &Partner) -> String {
        match self {
            ExportColumn::PartnerId => p.id.clone().unwrap_or_default(),
            ExportColumn::PartnerName => p.name.clone(),
            ExportColumn::RateType => p.rate_type.clone().unwrap_or_default(),
            ExportColumn::Cpl => p.cpl_raw.clone().unwrap_or_default(),
            ExportColumn::Cohort => p.cohort.label().to_string(),
            ExportColumn::MonthlyCost => p.monthly_cost_raw.clone().unwrap_or_default(),
            ExportColumn::RenewalDate => p.renewal_date.format("%Y-%m-%d").to_string(),
            ExportColumn::DaysToRenewal => p.days_to_renewal.to_string(),
        }
    }

    /// Columns the source actually carries; derived ones are always present.
    fn present(columns: &RosterColumns) -> Vec<ExportColumn> {
        let mut out = Vec::with_capacity(8);
        if columns.partner_id.is_some() {
            out.push(ExportColumn::PartnerId);
        }
        out.push(ExportColumn::PartnerName);
        if columns.rate_type.is_some() {
            out.push(ExportColumn::RateType);
        }
        if columns.cpl.is_some() {
            out.push(ExportColumn::Cpl);
        }
        out.push(ExportColumn::Cohort);
        if columns.monthly_cost.is_some() {
            out.push(ExportColumn::MonthlyCost);
        }
        out.push(ExportColumn::RenewalDate);
        out.push(ExportColumn::DaysToRenewal);
        out
    }
}

/// Table title for a bucket × cohort slice, e.g. `Partners Overdue for Renewal: All Other Partners`.
pub fn table_title(bucket: Bucket, cohort: Cohort) -> String {
    format!("{}: {}", bucket.title(), cohort.label())
}

/// Lowercased title, spaces → `_`, characters unsafe in file names dropped.
pub fn file_name(title: &str) -> String {
    let stub: String = title
        .to_lowercase()
        .replace(' ', "_")
        .chars()
        .filter(|c| !matches!(c, ':' | '/' | '\\'))
        .collect();
    format!("{}.csv", stub)
}

/// Rows ordered by days-to-renewal, renewal date, then name.
pub fn export_order(partners: &[Partner]) -> Vec<&Partner> {
    let mut rows: Vec<&Partner> = partners.iter().collect();
    rows.sort_by(|a, b| {
        a.days_to_renewal
            .cmp(&b.days_to_renewal)
            .then_with(|| a.renewal_date.cmp(&b.renewal_date))
            .then_with(|| a.name.cmp(&b.name))
    });
    rows
}

/// Write one partner table as CSV.
pub fn write_table<W: Write>(out: W, partners: &[Partner], columns: &RosterColumns) -> Result<()> {
    let cols = ExportColumn::present(columns);
    let mut wtr = Writer::from_writer(out);
    wtr.write_record(cols.iter().map(|c| c.header()))
        .context("writing export header")?;
    for p in export_order(partners) {
        wtr.write_record(cols.iter().map(|c| c.value(p)))
            .with_context(|| format!("writing export row for {}", p.name))?;
    }
    wtr.flush().context("flushing export")?;
    Ok(())
}

/// Write every non-empty bucket × cohort table under `dir`. Returns the files written.
#[tracing::instrument(level = "info", skip(report, dir), fields(dir = %dir.as_ref().display()))]
pub fn export_report<P: AsRef<Path>>(report: &RenewalReport, dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("creating export directory {:?}", dir))?;

    let mut written = Vec::new();
    for view in &report.buckets {
        for cohort in Cohort::ALL {
            let rows = view.cohort(cohort);
            if rows.is_empty() {
                continue;
            }
            let title = table_title(view.bucket(), cohort);
            let path = dir.join(file_name(&title));
            let file = fs::File::create(&path)
                .with_context(|| format!("creating export file {:?}", path))?;
            write_table(file, &rows, &report.columns)
                .with_context(|| format!("exporting {}", title))?;
            debug!(path = %path.display(), rows = rows.len(), "exported table");
            written.push(path);
        }
    }
    info!(files = written.len(), "export complete");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::partner;
    use crate::report::Filters;
    use crate::normalize::{normalize_partners, Column};
    use crate::roster::RawTable;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    #[test]
    fn test_file_name() {
        let title = table_title(Bucket::Within30, Cohort::FacebookGroup);
        assert_eq!(title, "Partners Renewing in 0-30 Days: Facebook Group cohort");
        assert_eq!(
            file_name(&title),
            "partners_renewing_in_0-30_days_facebook_group_cohort.csv"
        );
    }

    #[test]
    fn test_write_table_only_present_columns() -> Result<()> {
        let mut a = partner("Acme", 5);
        a.monthly_cost_raw = Some("£1,250.00".into());
        let b = partner("Bravo", -2);
        let columns = RosterColumns {
            monthly_cost: Some(Column {
                header: "Monthly subscription cost".into(),
                index: 2,
            }),
            ..Default::default()
        };

        let mut buf = Vec::new();
        write_table(&mut buf, &[a, b], &columns)?;
        let text = String::from_utf8(buf)?;
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Dealership Group Name,Cohort,Monthly subscription cost,Renewal Date (Working),Days to Renewal"
        );
        assert_eq!(lines[1], "Bravo,All Other Partners,,2023-12-30,-2");
        assert_eq!(lines[2], "Acme,All Other Partners,\"£1,250.00\",2024-01-06,5");
        Ok(())
    }

    #[test]
    fn test_export_report_writes_non_empty_tables() -> Result<()> {
        let t = RawTable::new(
            vec![
                "Dealership Group ID".into(),
                "Dealership Group Name".into(),
                "Actual renewal date".into(),
                "CPL".into(),
            ],
            vec![
                vec!["1".into(), "Acme".into(), "2024-01-05".into(), "15".into()],
                vec!["2".into(), "Bravo".into(), "2023-12-01".into(), "".into()],
            ],
        );
        let roster = normalize_partners(&t, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())?;
        let report = RenewalReport::build(&roster, &Filters::default());

        let tmp = tempdir()?;
        let written = export_report(&report, tmp.path())?;
        assert_eq!(written.len(), 2);

        let fb = tmp
            .path()
            .join("partners_renewing_in_0-30_days_facebook_group_cohort.csv");
        let text = fs::read_to_string(fb)?;
        assert_eq!(
            text,
            "Dealership Group ID,Dealership Group Name,CPL,Cohort,Renewal Date (Working),Days to Renewal\n\
             1,Acme,15,Facebook Group cohort,2024-01-05,4\n"
        );
        assert!(tmp
            .path()
            .join("partners_overdue_for_renewal_all_other_partners.csv")
            .exists());
        Ok(())
    }
}
