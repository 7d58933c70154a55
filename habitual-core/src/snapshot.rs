//! Streak snapshot refresh.
//!
//! After any completion is added or removed, the habit's snapshot is rebuilt
//! from its full remaining history and upserted. Snapshots are never adjusted
//! incrementally.

use chrono::{DateTime, Utc};

use crate::analytics::StreakSummary;
use crate::date::CalendarDay;
use crate::error::Result;
use crate::types::{Habit, StreakSnapshot};

/// Storage contract the tracker and snapshot writer rely on.
///
/// [`crate::Database`] is the SQLite implementation.
pub trait CompletionStore {
    /// Look up a habit by id.
    fn habit(&self, habit_id: &str) -> Result<Option<Habit>>;

    /// Every completion day recorded for the habit, in any order.
    fn completion_days(&self, habit_id: &str) -> Result<Vec<CalendarDay>>;

    /// Record a completion. Returns `false` when the day was already recorded.
    fn insert_completion(&self, habit_id: &str, day: CalendarDay) -> Result<bool>;

    /// Remove every completion of the habit on `day`. Returns `false` when
    /// nothing was removed.
    fn delete_completion(&self, habit_id: &str, day: CalendarDay) -> Result<bool>;

    /// Insert or replace the habit's snapshot.
    fn upsert_streak_snapshot(&self, snapshot: &StreakSnapshot) -> Result<()>;

    /// Read the habit's days, build a snapshot with `recompute`, and store it
    /// as one unit of work.
    ///
    /// The default runs the read and the write back to back. Stores with a
    /// transaction primitive should override this so two refreshes of the same
    /// habit cannot interleave.
    fn refresh_streak_snapshot(
        &self,
        habit_id: &str,
        recompute: &mut dyn FnMut(&[CalendarDay]) -> StreakSnapshot,
    ) -> Result<StreakSnapshot> {
        let days = self.completion_days(habit_id)?;
        let snapshot = recompute(&days);
        self.upsert_streak_snapshot(&snapshot)?;
        Ok(snapshot)
    }
}

/// Build a snapshot from a habit's completion days.
///
/// `longest_count` is never below `current_count`.
pub fn compute_snapshot(
    habit_id: &str,
    days: &[CalendarDay],
    today: CalendarDay,
    now: DateTime<Utc>,
) -> StreakSnapshot {
    let streaks = StreakSummary::compute(days, today);
    StreakSnapshot {
        habit_id: habit_id.to_string(),
        current_count: streaks.current,
        longest_count: streaks.longest.max(streaks.current),
        last_updated: now,
    }
}

/// Recompute and persist the snapshot for one habit.
pub fn refresh_snapshot<S: CompletionStore + ?Sized>(
    store: &S,
    habit_id: &str,
    today: CalendarDay,
    now: DateTime<Utc>,
) -> Result<StreakSnapshot> {
    let snapshot = store.refresh_streak_snapshot(habit_id, &mut |days| {
        compute_snapshot(habit_id, days, today, now)
    })?;

    tracing::debug!(
        habit_id,
        %today,
        current = snapshot.current_count,
        longest = snapshot.longest_count,
        "Streak snapshot refreshed"
    );

    Ok(snapshot)
}
