//! Report bucket granularities.

use serde::{Deserialize, Serialize};

/// Time-bucket granularity for sales reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Day,
    Week,
    Month,
    Year,
}

impl Granularity {
    /// Parse a requested granularity, case-insensitively.
    ///
    /// Any unrecognized value (including an empty string) falls back to
    /// [`Granularity::Day`] rather than failing the request.
    #[must_use]
    pub fn parse_or_day(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "week" => Self::Week,
            "month" => Self::Month,
            "year" => Self::Year,
            _ => Self::Day,
        }
    }

    /// The lowercase wire name of this granularity.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
