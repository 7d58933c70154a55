//! Calendar period progress (this week, this month, this year).

use std::collections::HashSet;

use chrono::Datelike;
use serde::Serialize;

use crate::date::CalendarDay;

/// Calendar period containing a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Period {
    /// Monday through Sunday
    Week,
    /// First to last day of the month
    Month,
    /// January 1st to December 31st
    Year,
}

impl Period {
    /// Inclusive bounds of the period containing `day`.
    pub fn bounds(&self, day: CalendarDay) -> (CalendarDay, CalendarDay) {
        let date = day.date();
        match self {
            Period::Week => {
                let start = day.add_days(-(date.weekday().num_days_from_monday() as i64));
                (start, start.add_days(6))
            }
            Period::Month => {
                let start = day.add_days(-(date.day0() as i64));
                let (next_year, next_month) = if date.month() == 12 {
                    (date.year() + 1, 1)
                } else {
                    (date.year(), date.month() + 1)
                };
                let end = CalendarDay::from_ymd(next_year, next_month, 1)
                    .map(|d| d.prev())
                    .unwrap_or(day);
                (start, end)
            }
            Period::Year => {
                let start = day.add_days(-(date.ordinal0() as i64));
                let end = CalendarDay::from_ymd(date.year(), 12, 31).unwrap_or(day);
                (start, end)
            }
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Period::Week => "This week",
            Period::Month => "This month",
            Period::Year => "This year",
        }
    }
}

/// Completed days out of all days in a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodProgress {
    pub start: CalendarDay,
    pub end: CalendarDay,
    /// Distinct days with at least one completion
    pub completed_days: u32,
    /// Days in the period
    pub total_days: u32,
}

impl PeriodProgress {
    /// Rounded percentage of completed days.
    pub fn percent(&self) -> u8 {
        if self.total_days == 0 {
            return 0;
        }
        let pct = (200 * self.completed_days as u64 + self.total_days as u64)
            / (2 * self.total_days as u64);
        pct.min(100) as u8
    }
}

/// Progress through the period containing `day`.
pub fn period_progress(days: &[CalendarDay], period: Period, day: CalendarDay) -> PeriodProgress {
    let (start, end) = period.bounds(day);
    let completed: HashSet<_> = days.iter().filter(|d| **d >= start && **d <= end).collect();
    PeriodProgress {
        start,
        end,
        completed_days: completed.len() as u32,
        total_days: (start.days_until(end) + 1) as u32,
    }
}

/// Consecutive completed days counted from Monday of the week containing `day`.
pub fn week_run(days: &[CalendarDay], day: CalendarDay) -> u32 {
    let set: HashSet<_> = days.iter().copied().collect();
    let (start, end) = Period::Week.bounds(day);
    start
        .iter_through(end)
        .take_while(|d| set.contains(d))
        .count() as u32
}
