//! Calendar day normalization.
//!
//! Completions carry no time-of-day meaning, so every timestamp entering the
//! system is reduced to a [`CalendarDay`]. Normalization always happens in UTC:
//! a timestamp is converted to UTC and its date is taken. `today()` follows the
//! same rule, which keeps server-side snapshots and read paths bucketing the
//! same instant into the same day.

use crate::error::{Error, Result};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// ISO calendar date format used at every boundary.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// A calendar day with no time-of-day component.
///
/// Ordering and equality follow calendar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDay(NaiveDate);

impl CalendarDay {
    /// Build a day from year, month and day-of-month.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| {
                Error::Validation(format!("invalid date: {:04}-{:02}-{:02}", year, month, day))
            })
    }

    /// Current day in UTC.
    pub fn today() -> Self {
        normalize(Utc::now())
    }

    /// Parse an ISO `YYYY-MM-DD` date or an RFC 3339 timestamp.
    ///
    /// Timestamps are normalized through UTC.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, DAY_FORMAT) {
            return Ok(Self(date));
        }
        DateTime::parse_from_rfc3339(trimmed)
            .map(|ts| normalize(ts.with_timezone(&Utc)))
            .map_err(|_| Error::Validation(format!("unparsable date: {:?}", input)))
    }

    /// The underlying chrono date.
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// The following day, saturating at the end of the supported range.
    pub fn next(&self) -> Self {
        self.0.succ_opt().map(Self).unwrap_or(*self)
    }

    /// The preceding day, saturating at the start of the supported range.
    pub fn prev(&self) -> Self {
        self.0.pred_opt().map(Self).unwrap_or(*self)
    }

    /// Shift by a signed number of days, saturating at the supported range.
    pub fn add_days(&self, days: i64) -> Self {
        let shifted = if days >= 0 {
            self.0
                .checked_add_days(chrono::Days::new(days.unsigned_abs()))
        } else {
            self.0
                .checked_sub_days(chrono::Days::new(days.unsigned_abs()))
        };
        match shifted {
            Some(date) => Self(date),
            None if days >= 0 => Self(NaiveDate::MAX),
            None => Self(NaiveDate::MIN),
        }
    }

    /// Signed number of days from `self` to `other`.
    pub fn days_until(&self, other: CalendarDay) -> i64 {
        (other.0 - self.0).num_days()
    }

    /// Iterate every day from `self` to `end` inclusive. Empty when `end < self`.
    pub fn iter_through(self, end: CalendarDay) -> impl Iterator<Item = CalendarDay> {
        self.0
            .iter_days()
            .take_while(move |d| *d <= end.0)
            .map(CalendarDay)
    }

    /// Human-friendly rendering, e.g. "Jan 05, 2024".
    pub fn display_long(&self) -> String {
        self.0.format("%b %d, %Y").to_string()
    }
}

/// Strip the time-of-day from a UTC timestamp.
pub fn normalize(ts: DateTime<Utc>) -> CalendarDay {
    CalendarDay(ts.date_naive())
}

impl From<NaiveDate> for CalendarDay {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for CalendarDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_FORMAT))
    }
}

impl FromStr for CalendarDay {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for CalendarDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        CalendarDay::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(s: &str) -> CalendarDay {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_iso_date() {
        let d = day("2024-01-03");
        assert_eq!(d, CalendarDay::from_ymd(2024, 1, 3).unwrap());
        assert_eq!(d.to_string(), "2024-01-03");
    }

    #[test]
    fn test_parse_timestamp_normalizes_through_utc() {
        // 23:30 at -05:00 is already the next day in UTC
        let d = day("2024-01-03T23:30:00-05:00");
        assert_eq!(d, day("2024-01-04"));

        let d = day("2024-01-03T00:00:01Z");
        assert_eq!(d, day("2024-01-03"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", "yesterday", "2024-13-01", "2024-02-30", "01/03/2024"] {
            let err = CalendarDay::parse(input).unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "input {:?}", input);
        }
    }

    #[test]
    fn test_normalize_strips_time_of_day() {
        let morning = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();
        let night = Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 59).unwrap();
        assert_eq!(normalize(morning), normalize(night));
        assert_eq!(normalize(morning), day("2024-03-10"));
    }

    #[test]
    fn test_ordering_matches_calendar() {
        assert!(day("2023-12-31") < day("2024-01-01"));
        assert!(day("2024-02-29") < day("2024-03-01"));
    }

    #[test]
    fn test_day_arithmetic() {
        let d = day("2024-03-01");
        assert_eq!(d.prev(), day("2024-02-29"));
        assert_eq!(d.prev().next(), d);
        assert_eq!(d.add_days(-1), day("2024-02-29"));
        assert_eq!(d.add_days(365), day("2025-03-01"));
        assert_eq!(day("2024-01-01").days_until(day("2024-01-10")), 9);
        assert_eq!(day("2024-01-10").days_until(day("2024-01-01")), -9);
    }

    #[test]
    fn test_iter_through() {
        let days: Vec<_> = day("2024-01-30").iter_through(day("2024-02-02")).collect();
        assert_eq!(
            days,
            vec![
                day("2024-01-30"),
                day("2024-01-31"),
                day("2024-02-01"),
                day("2024-02-02")
            ]
        );
        assert_eq!(day("2024-01-02").iter_through(day("2024-01-01")).count(), 0);
    }

    #[test]
    fn test_serde_uses_iso_string() {
        let json = serde_json::to_string(&day("2024-07-04")).unwrap();
        assert_eq!(json, "\"2024-07-04\"");
        let back: CalendarDay = serde_json::from_str(&json).unwrap();
        assert_eq!(back, day("2024-07-04"));
        assert!(serde_json::from_str::<CalendarDay>("\"nope\"").is_err());
    }
}
