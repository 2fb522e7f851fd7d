use serde::{Deserialize, Serialize};

use crate::config::Styling;

/// Normalized quality gate status.
///
/// The variant order encodes severity: `Pass < Warn < Fail`, so the worst
/// status in a collection is simply its maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateStatus {
    Pass,
    Warn,
    Fail,
}

impl GateStatus {
    /// Map a raw quality gate status string from the server.
    ///
    /// Only "OK" and "WARN" are recognized; anything else (missing, empty,
    /// "ERROR", "NONE", unexpected strings) maps to `Fail` so that silent
    /// data gaps surface visibly instead of passing for success.
    pub fn normalize(raw: Option<&str>) -> Self {
        match raw {
            Some("OK") => Self::Pass,
            Some("WARN") => Self::Warn,
            _ => Self::Fail,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pass => "PASSED",
            Self::Warn => "WARNING",
            Self::Fail => "FAILED",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Warn => "warn",
            Self::Fail => "fail",
        }
    }

    pub fn color(self, styling: &Styling) -> &str {
        match self {
            Self::Pass => &styling.pass_color,
            Self::Warn => &styling.warning_color,
            Self::Fail => &styling.fail_color,
        }
    }

    /// Numeric value for compact timeline rendering: PASS 1, WARN 0.5, FAIL 0.
    pub fn history_value(self) -> f64 {
        match self {
            Self::Pass => 1.0,
            Self::Warn => 0.5,
            Self::Fail => 0.0,
        }
    }

    /// Worst-of aggregation: FAIL > WARN > PASS. Empty input has no status.
    pub fn worst(statuses: impl IntoIterator<Item = GateStatus>) -> Option<GateStatus> {
        statuses.into_iter().max()
    }

    /// Best-of aggregation, for groups configured with the `best` rule.
    pub fn best(statuses: impl IntoIterator<Item = GateStatus>) -> Option<GateStatus> {
        statuses.into_iter().min()
    }
}
