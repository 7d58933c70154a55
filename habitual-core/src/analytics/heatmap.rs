//! Calendar heatmap aggregation.
//!
//! Produces a dense per-day series so a calendar grid can be rendered without
//! gaps. Unlike the streak and rate calculators, counts here are NOT
//! deduplicated: several habits completed on the same day all count.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::date::CalendarDay;
use crate::types::HeatmapDay;

/// Default trailing range for heatmaps.
pub const DEFAULT_HEATMAP_DAYS: u32 = 365;

/// Upper bound for user-supplied trailing ranges (100 years).
pub const MAX_HEATMAP_DAYS: u32 = 36_525;

/// Range selection for a heatmap, resolved against "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeatmapRange {
    /// January 1st through December 31st of today's year
    CurrentYear,
    /// A specific calendar year
    Year(i32),
    /// The given number of days ending today (inclusive)
    Trailing(u32),
}

impl Default for HeatmapRange {
    fn default() -> Self {
        HeatmapRange::Trailing(DEFAULT_HEATMAP_DAYS)
    }
}

impl HeatmapRange {
    /// Concrete inclusive bounds. `Trailing(0)` resolves to an inverted range
    /// and therefore an empty heatmap.
    pub fn bounds(&self, today: CalendarDay) -> (CalendarDay, CalendarDay) {
        match self {
            HeatmapRange::CurrentYear => year_bounds(today.year()).unwrap_or((today, today)),
            HeatmapRange::Year(year) => year_bounds(*year).unwrap_or((today, today.prev())),
            HeatmapRange::Trailing(days) => (today.add_days(-(*days as i64) + 1), today),
        }
    }
}

fn year_bounds(year: i32) -> Option<(CalendarDay, CalendarDay)> {
    let start = CalendarDay::from_ymd(year, 1, 1).ok()?;
    let end = CalendarDay::from_ymd(year, 12, 31).ok()?;
    Some((start, end))
}

/// One entry per day from `range_start` to `range_end` inclusive, ascending,
/// with the number of completion entries on each day.
///
/// Returns an empty series when `range_start > range_end`.
pub fn build_heatmap(
    days: &[CalendarDay],
    range_start: CalendarDay,
    range_end: CalendarDay,
) -> Vec<HeatmapDay> {
    if range_start > range_end {
        return Vec::new();
    }

    let mut counts: HashMap<CalendarDay, u32> = HashMap::new();
    for day in days
        .iter()
        .filter(|d| **d >= range_start && **d <= range_end)
    {
        *counts.entry(*day).or_insert(0) += 1;
    }

    range_start
        .iter_through(range_end)
        .map(|day| HeatmapDay {
            day,
            count: counts.get(&day).copied().unwrap_or(0),
        })
        .collect()
}

/// Highest count in a series (0 for an empty series).
pub fn max_count(series: &[HeatmapDay]) -> u32 {
    series.iter().map(|d| d.count).max().unwrap_or(0)
}

/// Colour bucket 0-4 for a cell relative to the busiest day.
///
/// 0 means no activity; 1-4 step up at 20%, 40% and 60% of `max`.
pub fn intensity(count: u32, max: u32) -> u8 {
    if count == 0 || max == 0 {
        return 0;
    }
    let ratio = count as f64 / max as f64;
    if ratio <= 0.2 {
        1
    } else if ratio <= 0.4 {
        2
    } else if ratio <= 0.6 {
        3
    } else {
        4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn day(s: &str) -> CalendarDay {
        s.parse().unwrap()
    }

    #[test]
    fn test_empty_completions_fill_zeroes() {
        let series = build_heatmap(&[], day("2024-01-01"), day("2024-01-03"));
        assert_eq!(
            series,
            vec![
                HeatmapDay { day: day("2024-01-01"), count: 0 },
                HeatmapDay { day: day("2024-01-02"), count: 0 },
                HeatmapDay { day: day("2024-01-03"), count: 0 },
            ]
        );
    }

    #[test]
    fn test_inverted_range_is_empty() {
        assert!(build_heatmap(&[day("2024-01-01")], day("2024-01-03"), day("2024-01-01")).is_empty());
    }

    #[test]
    fn test_single_day_range() {
        let d = [day("2024-01-01"), day("2024-01-01")];
        let series = build_heatmap(&d, day("2024-01-01"), day("2024-01-01"));
        assert_eq!(series, vec![HeatmapDay { day: day("2024-01-01"), count: 2 }]);
    }

    #[test]
    fn test_counts_multiple_habits_same_day() {
        let d = [
            day("2024-01-02"),
            day("2024-01-02"),
            day("2024-01-02"),
            day("2024-01-03"),
            day("2023-12-31"),
        ];
        let series = build_heatmap(&d, day("2024-01-01"), day("2024-01-03"));
        let counts: Vec<u32> = series.iter().map(|d| d.count).collect();
        assert_eq!(counts, vec![0, 3, 1]);
        assert_eq!(max_count(&series), 3);
    }

    #[test]
    fn test_range_bounds() {
        let today = day("2024-06-15");
        assert_eq!(
            HeatmapRange::CurrentYear.bounds(today),
            (day("2024-01-01"), day("2024-12-31"))
        );
        assert_eq!(
            HeatmapRange::Year(2023).bounds(today),
            (day("2023-01-01"), day("2023-12-31"))
        );
        let (start, end) = HeatmapRange::default().bounds(today);
        assert_eq!(end, today);
        assert_eq!(build_heatmap(&[], start, end).len(), 365);
        let (start, end) = HeatmapRange::Trailing(0).bounds(today);
        assert!(build_heatmap(&[], start, end).is_empty());
    }

    #[test]
    fn test_leap_year_has_366_days() {
        let (start, end) = HeatmapRange::Year(2024).bounds(day("2025-01-01"));
        assert_eq!(build_heatmap(&[], start, end).len(), 366);
    }

    #[test]
    fn test_intensity_buckets() {
        assert_eq!(intensity(0, 10), 0);
        assert_eq!(intensity(3, 0), 0);
        assert_eq!(intensity(2, 10), 1);
        assert_eq!(intensity(4, 10), 2);
        assert_eq!(intensity(6, 10), 3);
        assert_eq!(intensity(7, 10), 4);
        assert_eq!(intensity(10, 10), 4);
    }

    proptest! {
        #[test]
        fn prop_dense_and_sums_match(
            offsets in prop::collection::vec(-20i64..60, 0..100),
            start_off in 0i64..30,
            len in 0i64..40,
        ) {
            let base = day("2024-01-01");
            let d: Vec<_> = offsets.iter().map(|o| base.add_days(*o)).collect();
            let start = base.add_days(start_off);
            let end = start.add_days(len);

            let series = build_heatmap(&d, start, end);
            prop_assert_eq!(series.len() as i64, start.days_until(end) + 1);

            let in_range = d.iter().filter(|x| **x >= start && **x <= end).count() as u32;
            prop_assert_eq!(series.iter().map(|h| h.count).sum::<u32>(), in_range);

            for pair in series.windows(2) {
                prop_assert_eq!(pair[0].day.next(), pair[1].day);
            }

            prop_assert_eq!(build_heatmap(&d, start, end), series);
        }
    }
}
