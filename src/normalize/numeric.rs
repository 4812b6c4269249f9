use once_cell::sync::Lazy;
use regex::Regex;

static NON_NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9.\-]").expect("non-numeric regex"));

/// Plain numeric coercion: trim and parse, anything else is `None`.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Strip everything except digits, `.` and `-`, then parse.
/// `"£1,250.00"` → `1250.0`; `""`, `"N/A"`, `"-"` → `None`.
pub fn clean_currency(raw: &str) -> Option<f64> {
    let stripped = NON_NUMERIC.replace_all(raw, "");
    if stripped.is_empty() {
        return None;
    }
    stripped.parse::<f64>().ok().filter(|v| v.is_finite())
}
