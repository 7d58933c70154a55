//! Dashboard analytics.
//!
//! Per-habit stats and the aggregate overview shown on the dashboard and by
//! `habitual stats`.

use serde::Serialize;

use super::badges::BadgeProgress;
use super::rate::{completion_rate, RateWindow};
use super::streak::{longest_run, StreakRun, StreakSummary};
use crate::date::CalendarDay;

/// Derived numbers for a single habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HabitStats {
    pub habit_id: String,
    /// Display name
    pub name: String,
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Dates of the longest run, earliest on ties
    pub longest_run: Option<StreakRun>,
    /// Percentage of days in the trailing window with a completion
    pub completion_rate: u8,
    /// Completion entries ever recorded
    pub total_completions: u32,
    pub completed_today: bool,
}

impl HabitStats {
    /// Compute stats from one habit's completion days.
    pub fn compute(
        habit_id: &str,
        name: &str,
        days: &[CalendarDay],
        today: CalendarDay,
        window: RateWindow,
    ) -> Self {
        let streaks = StreakSummary::compute(days, today);
        Self {
            habit_id: habit_id.to_string(),
            name: name.to_string(),
            current_streak: streaks.current,
            longest_streak: streaks.longest,
            longest_run: longest_run(days),
            completion_rate: completion_rate(days, window.days(), today),
            total_completions: days.len() as u32,
            completed_today: days.contains(&today),
        }
    }
}

/// Aggregate statistics over all tracked habits.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardStats {
    /// Day the stats were computed for
    pub today: Option<CalendarDay>,
    /// Window used for completion rates
    pub window: RateWindow,
    pub total_habits: u32,
    /// Habits with a completion today
    pub completed_today: u32,
    pub total_completions: u32,
    /// Mean current streak, rounded
    pub average_streak: u32,
    /// Highest current streak
    pub best_current_streak: u32,
    /// Habit with the highest completion rate (first wins ties)
    pub best_habit: Option<String>,
    /// Habit with the lowest completion rate (first wins ties)
    pub worst_habit: Option<String>,
    /// Per-habit breakdown sorted by completion rate, highest first
    pub habits: Vec<HabitStats>,
}

impl DashboardStats {
    /// Aggregate per-habit stats.
    pub fn from_habit_stats(habits: Vec<HabitStats>, today: CalendarDay, window: RateWindow) -> Self {
        let total_habits = habits.len() as u32;
        let completed_today = habits.iter().filter(|h| h.completed_today).count() as u32;
        let total_completions = habits.iter().map(|h| h.total_completions).sum();
        let streak_sum: u32 = habits.iter().map(|h| h.current_streak).sum();
        let average_streak = if total_habits == 0 {
            0
        } else {
            ((streak_sum as f64) / (total_habits as f64)).round() as u32
        };
        let best_current_streak = habits.iter().map(|h| h.current_streak).max().unwrap_or(0);

        let best_habit = habits
            .iter()
            .fold(None::<&HabitStats>, |best, h| match best {
                Some(b) if b.completion_rate >= h.completion_rate => Some(b),
                _ => Some(h),
            })
            .map(|h| h.habit_id.clone());
        let worst_habit = habits
            .iter()
            .fold(None::<&HabitStats>, |worst, h| match worst {
                Some(w) if w.completion_rate <= h.completion_rate => Some(w),
                _ => Some(h),
            })
            .map(|h| h.habit_id.clone());

        let mut habits = habits;
        // stable sort keeps input order among equal rates
        habits.sort_by(|a, b| b.completion_rate.cmp(&a.completion_rate));

        Self {
            today: Some(today),
            window,
            total_habits,
            completed_today,
            total_completions,
            average_streak,
            best_current_streak,
            best_habit,
            worst_habit,
            habits,
        }
    }

    /// Badge inputs derived from these stats.
    ///
    /// The streak comes from tracked habits only. `total_completions` and
    /// `habit_count` span every habit, archived ones included, so the caller
    /// supplies them.
    pub fn badge_progress(&self, total_completions: u32, habit_count: u32) -> BadgeProgress {
        BadgeProgress {
            best_current_streak: self.best_current_streak,
            total_completions,
            habit_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> CalendarDay {
        s.parse().unwrap()
    }

    fn stats(id: &str, days: &[&str], today: &str) -> HabitStats {
        let days: Vec<_> = days.iter().map(|d| day(d)).collect();
        HabitStats::compute(id, id, &days, day(today), RateWindow::Week)
    }

    #[test]
    fn test_habit_stats() {
        let s = stats(
            "read",
            &["2024-01-01", "2024-01-02", "2024-01-03"],
            "2024-01-03",
        );
        assert_eq!(s.current_streak, 3);
        assert_eq!(s.longest_streak, 3);
        let run = s.longest_run.unwrap();
        assert_eq!((run.start, run.end), (day("2024-01-01"), day("2024-01-03")));
        // 3 of 7
        assert_eq!(s.completion_rate, 43);
        assert_eq!(s.total_completions, 3);
        assert!(s.completed_today);
    }

    #[test]
    fn test_empty_dashboard() {
        let dash = DashboardStats::from_habit_stats(vec![], day("2024-01-03"), RateWindow::Month);
        assert_eq!(dash.total_habits, 0);
        assert_eq!(dash.average_streak, 0);
        assert!(dash.best_habit.is_none());
        assert!(dash.worst_habit.is_none());
    }

    #[test]
    fn test_dashboard_aggregates() {
        let today = "2024-01-07";
        let habits = vec![
            stats("a", &["2024-01-06"], today),
            stats("b", &["2024-01-05", "2024-01-06", "2024-01-07"], today),
            stats("c", &[], today),
        ];
        let dash = DashboardStats::from_habit_stats(habits, day(today), RateWindow::Week);
        assert_eq!(dash.total_habits, 3);
        assert_eq!(dash.completed_today, 1);
        assert_eq!(dash.total_completions, 4);
        // (1 + 3 + 0) / 3 = 1.33
        assert_eq!(dash.average_streak, 1);
        assert_eq!(dash.best_current_streak, 3);
        assert_eq!(dash.best_habit.as_deref(), Some("b"));
        assert_eq!(dash.worst_habit.as_deref(), Some("c"));
        let order: Vec<_> = dash.habits.iter().map(|h| h.habit_id.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_ties_keep_first() {
        let today = "2024-01-07";
        let habits = vec![
            stats("x", &["2024-01-07"], today),
            stats("y", &["2024-01-06"], today),
        ];
        let dash = DashboardStats::from_habit_stats(habits, day(today), RateWindow::Week);
        assert_eq!(dash.best_habit.as_deref(), Some("x"));
        assert_eq!(dash.worst_habit.as_deref(), Some("x"));
    }

    #[test]
    fn test_badge_progress() {
        let today = "2024-01-07";
        let dash = DashboardStats::from_habit_stats(
            vec![stats("a", &["2024-01-06", "2024-01-07"], today)],
            day(today),
            RateWindow::Week,
        );
        let progress = dash.badge_progress(12, 4);
        assert_eq!(progress.best_current_streak, 2);
        assert_eq!(progress.total_completions, 12);
        assert_eq!(progress.habit_count, 4);
    }
}
