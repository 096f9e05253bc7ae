//! Query normalization: raw query parameters to a canonical bucket unit and
//! inclusive time window.

use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use clementine_core::Granularity;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use super::local_instant;

/// Raw query parameters for a sales report request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportQuery {
    /// Bucket granularity; `granularity` is accepted as an alias.
    /// Unrecognized values fall back to `day`.
    #[serde(alias = "granularity")]
    pub period: Option<String>,
    /// Range start: RFC 3339 instant or bare `YYYY-MM-DD` date.
    pub start: Option<String>,
    /// Range end: RFC 3339 instant or bare `YYYY-MM-DD` date
    /// (bare dates are end-of-day inclusive).
    pub end: Option<String>,
    /// Pre-resolved tenant scope: restrict the report to one brand.
    pub brand: Option<Uuid>,
}

/// Validation failures raised before the data store is touched.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid {field} date: {value:?} (expected YYYY-MM-DD or RFC 3339)")]
    InvalidDate { field: &'static str, value: String },
}

/// Normalized report window: canonical unit plus inclusive `[start, end]`.
#[derive(Debug, Clone, Copy)]
pub struct ReportWindow {
    pub unit: Granularity,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportQuery {
    /// Normalize the raw parameters.
    ///
    /// Defaults: `start` = `now` minus 30 days, `end` = `now`. A bare end
    /// date is widened to 23:59:59.999 in the report zone so a single-day
    /// range captures that whole day.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidDate`] for unparseable date strings;
    /// dates are never silently coerced.
    pub fn normalize(&self, tz: Tz, now: DateTime<Utc>) -> Result<ReportWindow, QueryError> {
        let unit = self
            .period
            .as_deref()
            .map_or(Granularity::Day, Granularity::parse_or_day);

        let start = match self.start.as_deref() {
            Some(raw) => parse_start(raw, tz).ok_or_else(|| QueryError::InvalidDate {
                field: "start",
                value: raw.to_string(),
            })?,
            None => now - Days::new(30),
        };

        let end = match self.end.as_deref() {
            Some(raw) => parse_end(raw, tz).ok_or_else(|| QueryError::InvalidDate {
                field: "end",
                value: raw.to_string(),
            })?,
            None => now,
        };

        Ok(ReportWindow { unit, start, end })
    }
}

fn parse_start(raw: &str, tz: Tz) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    date.and_hms_opt(0, 0, 0)
        .map(|naive| local_instant(naive, tz))
}

fn parse_end(raw: &str, tz: Tz) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // A bare end date means end-of-day inclusive, not midnight.
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    date.and_hms_milli_opt(23, 59, 59, 999)
        .map(|naive| local_instant(naive, tz))
}
