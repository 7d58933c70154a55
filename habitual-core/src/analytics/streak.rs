//! Streak calculation.
//!
//! Every streak number in habitual comes from this module: snapshot refresh,
//! dashboard stats, badge evaluation and the CLI all delegate here.
//!
//! Input day lists are treated as sets. Duplicate entries for the same day
//! (a domain error upstream) count once.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::date::CalendarDay;

/// A maximal run of consecutive completed days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreakRun {
    pub start: CalendarDay,
    pub end: CalendarDay,
    /// Number of days in the run (inclusive)
    pub length: u32,
}

/// Current and longest streak for one habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StreakSummary {
    pub current: u32,
    pub longest: u32,
}

impl StreakSummary {
    /// Compute both streak numbers over one habit's completion days.
    pub fn compute(days: &[CalendarDay], today: CalendarDay) -> Self {
        let set = distinct(days);
        Self {
            current: current_from_set(&set, today),
            longest: runs(&set).map(|r| r.length).max().unwrap_or(0),
        }
    }
}

fn distinct(days: &[CalendarDay]) -> BTreeSet<CalendarDay> {
    days.iter().copied().collect()
}

/// Consecutive completed days ending at today, or at yesterday when today is
/// not completed yet.
///
/// Returns 0 when neither today nor yesterday is completed.
pub fn current_streak(days: &[CalendarDay], today: CalendarDay) -> u32 {
    current_from_set(&distinct(days), today)
}

fn current_from_set(set: &BTreeSet<CalendarDay>, today: CalendarDay) -> u32 {
    let yesterday = today.prev();
    let mut cursor = if set.contains(&today) {
        today
    } else if set.contains(&yesterday) {
        yesterday
    } else {
        return 0;
    };

    let mut count = 0u32;
    while set.contains(&cursor) {
        count += 1;
        let prev = cursor.prev();
        if prev == cursor {
            break;
        }
        cursor = prev;
    }
    count
}

/// Longest run of consecutive completed days ever observed.
pub fn longest_streak(days: &[CalendarDay]) -> u32 {
    runs(&distinct(days)).map(|r| r.length).max().unwrap_or(0)
}

/// The longest run with its bounds. The earliest run wins ties.
pub fn longest_run(days: &[CalendarDay]) -> Option<StreakRun> {
    let set = distinct(days);
    runs(&set).fold(None, |best: Option<StreakRun>, run| match best {
        Some(b) if b.length >= run.length => Some(b),
        _ => Some(run),
    })
}

/// Iterate all maximal runs in ascending order.
fn runs(set: &BTreeSet<CalendarDay>) -> impl Iterator<Item = StreakRun> + '_ {
    let mut iter = set.iter().copied().peekable();
    std::iter::from_fn(move || {
        let start = iter.next()?;
        let mut end = start;
        let mut length = 1u32;
        while let Some(&next) = iter.peek() {
            if end.days_until(next) != 1 {
                break;
            }
            end = next;
            length += 1;
            iter.next();
        }
        Some(StreakRun { start, end, length })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn day(s: &str) -> CalendarDay {
        s.parse().unwrap()
    }

    fn days(list: &[&str]) -> Vec<CalendarDay> {
        list.iter().map(|s| day(s)).collect()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(current_streak(&[], day("2024-01-01")), 0);
        assert_eq!(longest_streak(&[]), 0);
        assert_eq!(longest_run(&[]), None);
    }

    #[test]
    fn test_single_day() {
        let d = days(&["2024-05-05"]);
        assert_eq!(longest_streak(&d), 1);
        assert_eq!(current_streak(&d, day("2024-05-05")), 1);
        assert_eq!(current_streak(&d, day("2024-05-06")), 1);
        assert_eq!(current_streak(&d, day("2024-05-07")), 0);
    }

    #[test]
    fn test_three_consecutive_days_ending_today() {
        let d = days(&["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert_eq!(current_streak(&d, day("2024-01-03")), 3);
        assert_eq!(longest_streak(&d), 3);
    }

    #[test]
    fn test_gap_breaks_backward_walk_from_yesterday() {
        let d = days(&["2024-01-01", "2024-01-03"]);
        assert_eq!(current_streak(&d, day("2024-01-04")), 1);
        assert_eq!(longest_streak(&d), 1);
    }

    #[test]
    fn test_longest_with_hole() {
        let d: Vec<_> = day("2024-01-01")
            .iter_through(day("2024-01-10"))
            .filter(|d| *d != day("2024-01-05"))
            .collect();
        assert_eq!(longest_streak(&d), 5);

        let run = longest_run(&d).unwrap();
        assert_eq!(run.start, day("2024-01-06"));
        assert_eq!(run.end, day("2024-01-10"));
    }

    #[test]
    fn test_longest_run_prefers_earliest_on_tie() {
        let d = days(&["2024-01-01", "2024-01-02", "2024-01-05", "2024-01-06"]);
        let run = longest_run(&d).unwrap();
        assert_eq!(run.start, day("2024-01-01"));
        assert_eq!(run.length, 2);
    }

    #[test]
    fn test_grace_period_only_one_day() {
        let d = days(&["2024-01-01", "2024-01-02"]);
        assert_eq!(current_streak(&d, day("2024-01-03")), 2);
        assert_eq!(current_streak(&d, day("2024-01-04")), 0);
    }

    #[test]
    fn test_today_anchor_wins_over_yesterday() {
        let d = days(&["2024-01-01", "2024-01-02", "2024-01-04"]);
        // today completed, yesterday missing: run is just today
        assert_eq!(current_streak(&d, day("2024-01-04")), 1);
    }

    #[test]
    fn test_duplicates_do_not_double_count() {
        let d = days(&["2024-01-02", "2024-01-02", "2024-01-03", "2024-01-03"]);
        assert_eq!(current_streak(&d, day("2024-01-03")), 2);
        assert_eq!(longest_streak(&d), 2);
    }

    #[test]
    fn test_unsorted_input() {
        let d = days(&["2024-01-03", "2024-01-01", "2024-01-02"]);
        assert_eq!(longest_streak(&d), 3);
        assert_eq!(current_streak(&d, day("2024-01-03")), 3);
    }

    #[test]
    fn test_future_days_do_not_extend_current() {
        let d = days(&["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert_eq!(current_streak(&d, day("2024-01-02")), 2);
    }

    #[test]
    fn test_month_and_leap_boundaries() {
        let d = days(&["2024-02-28", "2024-02-29", "2024-03-01"]);
        assert_eq!(current_streak(&d, day("2024-03-01")), 3);
        let d = days(&["2023-12-31", "2024-01-01"]);
        assert_eq!(longest_streak(&d), 2);
    }

    #[test]
    fn test_summary_matches_free_functions() {
        let d = days(&["2024-01-01", "2024-01-02", "2024-01-04", "2024-01-05"]);
        let today = day("2024-01-05");
        let summary = StreakSummary::compute(&d, today);
        assert_eq!(summary.current, current_streak(&d, today));
        assert_eq!(summary.longest, longest_streak(&d));
    }

    fn arb_days() -> impl Strategy<Value = Vec<CalendarDay>> {
        prop::collection::vec(0i64..60, 0..40).prop_map(|offsets| {
            let base = day("2024-01-01");
            offsets.into_iter().map(|o| base.add_days(o)).collect()
        })
    }

    proptest! {
        #[test]
        fn prop_today_present_means_positive(mut d in arb_days(), t in 0i64..60) {
            let today = day("2024-01-01").add_days(t);
            d.push(today);
            prop_assert!(current_streak(&d, today) >= 1);
        }

        #[test]
        fn prop_no_today_or_yesterday_means_zero(d in arb_days(), t in 0i64..60) {
            let today = day("2024-01-01").add_days(t);
            let filtered: Vec<_> = d
                .into_iter()
                .filter(|x| *x != today && *x != today.prev())
                .collect();
            prop_assert_eq!(current_streak(&filtered, today), 0);
        }

        #[test]
        fn prop_longest_bounds_current(d in arb_days(), t in 0i64..60) {
            let today = day("2024-01-01").add_days(t);
            prop_assert!(longest_streak(&d) >= current_streak(&d, today));
        }

        #[test]
        fn prop_idempotent_and_order_independent(d in arb_days(), t in 0i64..60) {
            let today = day("2024-01-01").add_days(t);
            let first = StreakSummary::compute(&d, today);
            let second = StreakSummary::compute(&d, today);
            prop_assert_eq!(first, second);

            let mut reversed = d.clone();
            reversed.reverse();
            prop_assert_eq!(StreakSummary::compute(&reversed, today), first);
        }
    }
}
