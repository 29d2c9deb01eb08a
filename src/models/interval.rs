//! Sampling interval models

use std::fmt;

/// Sampling granularity of a price series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interval {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Interval {
    /// Resolve a user-supplied interval name (case-insensitive).
    /// Anything unrecognized falls back to daily.
    pub fn from_param(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "weekly" => Interval::Weekly,
            "monthly" => Interval::Monthly,
            _ => Interval::Daily,
        }
    }

    /// Provider function identifier for this interval
    pub fn function_name(&self) -> &'static str {
        match self {
            Interval::Daily => "TIME_SERIES_DAILY",
            Interval::Weekly => "TIME_SERIES_WEEKLY",
            Interval::Monthly => "TIME_SERIES_MONTHLY",
        }
    }

    /// Form value used by the web page
    pub fn as_param(&self) -> &'static str {
        match self {
            Interval::Daily => "daily",
            Interval::Weekly => "weekly",
            Interval::Monthly => "monthly",
        }
    }

    pub fn all() -> [Interval; 3] {
        [Interval::Daily, Interval::Weekly, Interval::Monthly]
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.function_name())
    }
}
