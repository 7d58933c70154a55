//! Completion mutations.
//!
//! The tracker owns no state: it borrows a [`CompletionStore`] and applies a
//! completion change followed by a snapshot refresh. The completion write is
//! the primary operation. If the snapshot refresh fails afterwards, the change
//! still counts as applied and the snapshot error is handed back on the
//! [`CompletionChange`] for the caller to report or retry.

use chrono::Utc;

use crate::date::CalendarDay;
use crate::error::{Error, Result};
use crate::snapshot::{refresh_snapshot, CompletionStore};
use crate::types::StreakSnapshot;

/// What happened to a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Removed,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
        }
    }
}

/// Outcome of a completion mutation.
#[derive(Debug)]
pub struct CompletionChange {
    pub habit_id: String,
    pub day: CalendarDay,
    pub kind: ChangeKind,
    /// `false` when the store was already in the requested state
    /// (adding an existing day, removing an absent one)
    pub applied: bool,
    /// Result of the snapshot refresh that followed the mutation
    pub snapshot: Result<StreakSnapshot>,
}

impl CompletionChange {
    /// The refreshed snapshot, if the refresh succeeded.
    pub fn snapshot(&self) -> Option<&StreakSnapshot> {
        self.snapshot.as_ref().ok()
    }
}

/// Applies completion mutations against a store.
pub struct Tracker<'a, S: CompletionStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: CompletionStore + ?Sized> Tracker<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Mark `habit_id` as completed on `day`.
    ///
    /// `today` anchors the current streak of the refreshed snapshot.
    pub fn add_completion(
        &self,
        habit_id: &str,
        day: CalendarDay,
        today: CalendarDay,
    ) -> Result<CompletionChange> {
        self.ensure_habit(habit_id)?;
        let applied = self.store.insert_completion(habit_id, day)?;
        if !applied {
            tracing::debug!(habit_id, %day, "Completion already recorded");
        }
        Ok(self.finish(habit_id, day, ChangeKind::Added, applied, today))
    }

    /// Remove the completion of `habit_id` on `day`.
    pub fn remove_completion(
        &self,
        habit_id: &str,
        day: CalendarDay,
        today: CalendarDay,
    ) -> Result<CompletionChange> {
        self.ensure_habit(habit_id)?;
        let applied = self.store.delete_completion(habit_id, day)?;
        if !applied {
            tracing::debug!(habit_id, %day, "No completion to remove");
        }
        Ok(self.finish(habit_id, day, ChangeKind::Removed, applied, today))
    }

    /// Add the completion when absent, remove it when present.
    pub fn toggle_completion(
        &self,
        habit_id: &str,
        day: CalendarDay,
        today: CalendarDay,
    ) -> Result<CompletionChange> {
        self.ensure_habit(habit_id)?;
        if self.store.completion_days(habit_id)?.contains(&day) {
            self.remove_completion(habit_id, day, today)
        } else {
            self.add_completion(habit_id, day, today)
        }
    }

    fn ensure_habit(&self, habit_id: &str) -> Result<()> {
        match self.store.habit(habit_id)? {
            Some(_) => Ok(()),
            None => Err(Error::HabitNotFound(habit_id.to_string())),
        }
    }

    fn finish(
        &self,
        habit_id: &str,
        day: CalendarDay,
        kind: ChangeKind,
        applied: bool,
        today: CalendarDay,
    ) -> CompletionChange {
        let snapshot = refresh_snapshot(self.store, habit_id, today, Utc::now());
        match &snapshot {
            Ok(snap) => tracing::info!(
                habit_id,
                %day,
                change = kind.as_str(),
                applied,
                current = snap.current_count,
                longest = snap.longest_count,
                "Completion updated"
            ),
            Err(e) => tracing::warn!(
                habit_id,
                %day,
                change = kind.as_str(),
                error = %e,
                "Completion updated but streak snapshot refresh failed"
            ),
        }

        CompletionChange {
            habit_id: habit_id.to_string(),
            day,
            kind,
            applied,
            snapshot,
        }
    }
}
