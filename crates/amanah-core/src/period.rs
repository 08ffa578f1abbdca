//! Accounting periods, entry numbering, and report date ranges.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, SecondsFormat, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;

/// Upper bound used when a date range runs to the end of representable time.
const END_OF_TIME: &str = "9999-12-31T23:59:59.999999Z";

/// Monthly period key for a posting date, e.g. `"2026-01"`.
#[must_use]
pub fn period_of(posted_at: DateTime<Utc>) -> String {
    format!("{:04}-{:02}", posted_at.year(), posted_at.month())
}

/// Human-readable entry number, e.g. `"JE-202601-000042"`.
#[must_use]
pub fn format_entry_number(prefix: &str, period: &str, sequence: i64) -> String {
    let compact: String = period.chars().filter(char::is_ascii_digit).collect();
    format!("{prefix}-{compact}-{sequence:06}")
}

/// Timestamp in the single fixed-width form stored in TEXT columns.
///
/// Every stored timestamp uses this form so lexical order equals time order.
/// Microseconds are kept; anything finer is dropped.
#[must_use]
pub fn storage_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Inclusive lower bound of a calendar day in storage form.
#[must_use]
pub fn day_start(date: NaiveDate) -> String {
    storage_timestamp(date.and_time(NaiveTime::MIN).and_utc())
}

/// Exclusive upper bound covering all of `date` in storage form.
#[must_use]
pub fn day_end_exclusive(date: NaiveDate) -> String {
    date.checked_add_days(Days::new(1))
        .map_or_else(|| END_OF_TIME.to_string(), day_start)
}

/// Exclusive upper bound for "up to and including `as_of`", or all time.
#[must_use]
pub fn as_of_upper_bound(as_of: Option<NaiveDate>) -> String {
    as_of.map_or_else(|| END_OF_TIME.to_string(), day_end_exclusive)
}

/// An inclusive calendar-date range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidDateRange` if `end < start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, LedgerError> {
        if end < start {
            return Err(LedgerError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Storage-form bounds `[lower, upper)` covering the whole range.
    #[must_use]
    pub fn bounds(&self) -> (String, String) {
        (day_start(self.start), day_end_exclusive(self.end))
    }
}
