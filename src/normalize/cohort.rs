use serde::Serialize;
use std::fmt;

pub const FACEBOOK_COHORT: &str = "Facebook Group cohort";
pub const OTHER_COHORT: &str = "All Other Partners";

/// CPL values that mark a partner as part of the Facebook group deal.
const FACEBOOK_CPLS: [f64; 2] = [15.0, 18.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Cohort {
    #[serde(rename = "Facebook Group cohort")]
    FacebookGroup,
    #[serde(rename = "All Other Partners")]
    AllOther,
}

impl Cohort {
    /// Display order used by every report.
    pub const ALL: [Cohort; 2] = [Cohort::FacebookGroup, Cohort::AllOther];

    /// Exact comparison, no epsilon: 15.000001 is not 15.
    pub fn classify(cpl: Option<f64>) -> Self {
        match cpl {
            Some(v) if FACEBOOK_CPLS.contains(&v) => Cohort::FacebookGroup,
            _ => Cohort::AllOther,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Cohort::FacebookGroup => FACEBOOK_COHORT,
            Cohort::AllOther => OTHER_COHORT,
        }
    }
}

impl fmt::Display for Cohort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facebook_cpls() {
        assert_eq!(Cohort::classify(Some(15.0)), Cohort::FacebookGroup);
        assert_eq!(Cohort::classify(Some(18.0)), Cohort::FacebookGroup);
    }

    #[test]
    fn test_everything_else_is_other() {
        for v in [Some(7.0), Some(15.000001), Some(17.999), Some(-15.0), Some(0.0), None] {
            assert_eq!(Cohort::classify(v), Cohort::AllOther, "{:?}", v);
        }
        assert_eq!(Cohort::classify(Some(f64::NAN)), Cohort::AllOther);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Cohort::FacebookGroup.to_string(), "Facebook Group cohort");
        assert_eq!(Cohort::AllOther.label(), "All Other Partners");
    }
}
