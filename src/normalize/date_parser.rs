use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

/// Which path produced a working renewal date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    /// `YYYY-MM-DD`
    Strict,
    /// Month-first permissive parse.
    Fallback,
}

/// Trailing time-of-day, optional seconds/fraction, am/pm and zone.
static TIME_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(.*?\S)(?:\s+|T)\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?\s*(?:am|pm)?\s*(?:z|utc|[+-]\d{2}:?\d{2})?$")
        .expect("time suffix regex")
});

/// Three numeric parts separated by `/`, `.` or `-`.
static NUMERIC_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,4})[/.\-](\d{1,2})[/.\-](\d{1,4})$").expect("numeric date regex")
});

/// chrono's `%B` also accepts three-letter abbreviations when parsing.
static TEXTUAL_FORMATS: &[&str] = &[
    "%d %B %Y",
    "%d %B, %Y",
    "%B %d %Y",
    "%B %d, %Y",
    "%d-%B-%Y",
    "%d-%B-%y",
    "%A, %B %d, %Y",
    "%A %d %B %Y",
];

/// Parse a renewal date: strict ISO first, permissive month-first second.
pub fn parse_renewal_date(raw: &str) -> Option<(NaiveDate, DateSource)> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(d) = parse_strict(s) {
        return Some((d, DateSource::Strict));
    }
    parse_fallback(s).map(|d| (d, DateSource::Fallback))
}

pub fn parse_strict(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Permissive parse. Numeric dates are read month-first and only flipped to
/// day-first when month-first cannot be a real date.
pub fn parse_fallback(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    let date_part = TIME_SUFFIX
        .captures(s)
        .and_then(|c| c.get(1))
        .map_or(s, |m| m.as_str());

    parse_numeric_date(date_part).or_else(|| parse_textual_date(date_part))
}

fn parse_numeric_date(s: &str) -> Option<NaiveDate> {
    // YYYYMMDD
    if s.len() == 8 && s.chars().all(|c| c.is_ascii_digit()) {
        let (y, m, d) = (
            s[0..4].parse::<i32>().ok()?,
            s[4..6].parse::<u32>().ok()?,
            s[6..8].parse::<u32>().ok()?,
        );
        return NaiveDate::from_ymd_opt(y, m, d);
    }

    let caps = NUMERIC_DATE.captures(s)?;
    let (a, b, c) = (&caps[1], &caps[2], &caps[3]);

    if a.len() == 4 {
        // YYYY/MM/DD
        if c.len() > 2 {
            return None;
        }
        return NaiveDate::from_ymd_opt(a.parse().ok()?, b.parse().ok()?, c.parse().ok()?);
    }
    if a.len() > 2 || !(c.len() == 2 || c.len() == 4) {
        return None;
    }

    let year = expand_year(c)?;
    let (first, second): (u32, u32) = (a.parse().ok()?, b.parse().ok()?);
    NaiveDate::from_ymd_opt(year, first, second)
        .or_else(|| NaiveDate::from_ymd_opt(year, second, first))
}

/// Two-digit years follow the `%y` convention: 00-68 → 20xx, 69-99 → 19xx.
fn expand_year(s: &str) -> Option<i32> {
    let y: i32 = s.parse().ok()?;
    Some(match s.len() {
        2 if y < 69 => 2000 + y,
        2 => 1900 + y,
        _ => y,
    })
}

fn parse_textual_date(s: &str) -> Option<NaiveDate> {
    if !s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    TEXTUAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&collapsed, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_iso_takes_strict_path() {
        assert_eq!(
            parse_renewal_date("2024-03-15"),
            Some((ymd(2024, 3, 15), DateSource::Strict))
        );
        assert_eq!(
            parse_renewal_date("  2024-03-15 "),
            Some((ymd(2024, 3, 15), DateSource::Strict))
        );
    }

    #[test]
    fn test_us_date_only_parses_via_fallback() {
        assert_eq!(parse_strict("03/15/2024"), None);
        assert_eq!(
            parse_renewal_date("03/15/2024"),
            Some((ymd(2024, 3, 15), DateSource::Fallback))
        );
    }

    #[test]
    fn test_garbage_is_unparseable() {
        assert_eq!(parse_renewal_date("not-a-date"), None);
        assert_eq!(parse_renewal_date(""), None);
        assert_eq!(parse_renewal_date("   "), None);
        assert_eq!(parse_renewal_date("13/13/2024"), None);
        assert_eq!(parse_renewal_date("2024-02-30"), None);
    }

    #[test]
    fn test_month_first_wins_when_ambiguous() {
        assert_eq!(parse_fallback("04/05/2024"), Some(ymd(2024, 4, 5)));
        assert_eq!(parse_fallback("3/5/24"), Some(ymd(2024, 3, 5)));
    }

    #[test]
    fn test_day_first_only_when_month_first_impossible() {
        assert_eq!(parse_fallback("15/03/2024"), Some(ymd(2024, 3, 15)));
        assert_eq!(parse_fallback("15.03.2024"), Some(ymd(2024, 3, 15)));
    }

    #[test]
    fn test_fallback_variants() {
        let want = Some(ymd(2024, 3, 15));
        assert_eq!(parse_fallback("2024-03-15 00:00:00"), want);
        assert_eq!(parse_fallback("2024-03-15T08:30:00Z"), want);
        assert_eq!(parse_fallback("2024/03/15"), want);
        assert_eq!(parse_fallback("03-15-2024"), want);
        assert_eq!(parse_fallback("03/15/2024 9:30 AM"), want);
        assert_eq!(parse_fallback("20240315"), want);
        assert_eq!(parse_fallback("15 Mar 2024"), want);
        assert_eq!(parse_fallback("15-Mar-2024"), want);
        assert_eq!(parse_fallback("Mar 15, 2024"), want);
        assert_eq!(parse_fallback("March 15 2024"), want);
    }

    #[test]
    fn test_two_digit_years() {
        assert_eq!(expand_year("24"), Some(2024));
        assert_eq!(expand_year("99"), Some(1999));
        assert_eq!(expand_year("2031"), Some(2031));
    }
}
