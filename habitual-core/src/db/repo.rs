//! Database repository layer
//!
//! Provides query and insert operations for habits, completions, streak
//! snapshots and badges.

use crate::analytics::{newly_unlocked, BadgeDefinition, DashboardStats, HabitStats, RateWindow};
use crate::date::CalendarDay;
use crate::error::{Error, Result};
use crate::snapshot::CompletionStore;
use crate::types::*;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Filter options for listing habits.
#[derive(Debug, Clone, Copy, Default)]
pub struct HabitFilter {
    /// Include archived habits
    pub include_archived: bool,
    /// Include habits marked inactive
    pub include_inactive: bool,
}

impl HabitFilter {
    /// Every habit regardless of state.
    pub fn all() -> Self {
        Self {
            include_archived: true,
            include_inactive: true,
        }
    }
}

/// Database handle with connection pooling (single connection for now)
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn();
        super::schema::run_migrations(&conn)
    }

    /// A poisoned lock still holds a usable connection; SQLite rolls back
    /// whatever the panicking holder left uncommitted.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ============================================
    // Habit operations
    // ============================================

    /// Insert a new habit
    pub fn insert_habit(&self, habit: &Habit) -> Result<()> {
        if habit.name.trim().is_empty() {
            return Err(Error::Validation("habit name cannot be empty".to_string()));
        }
        let conn = self.conn();
        conn.execute(
            r#"
            INSERT INTO habits (id, name, description, frequency, color, icon,
                                is_active, is_archived, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                habit.id,
                habit.name,
                habit.description,
                habit.frequency.as_str(),
                habit.color,
                habit.icon,
                habit.is_active,
                habit.is_archived,
                habit.created_at.to_rfc3339(),
                habit.updated_at.to_rfc3339(),
            ],
        )?;
        tracing::info!(habit_id = %habit.id, name = %habit.name, "Habit created");
        Ok(())
    }

    /// Get a habit by ID
    pub fn get_habit(&self, id: &str) -> Result<Option<Habit>> {
        let conn = self.conn();
        query_habit(&conn, id)
    }

    /// Resolve a full habit id or a unique id prefix.
    pub fn find_habit(&self, id_or_prefix: &str) -> Result<Habit> {
        if id_or_prefix.is_empty() {
            return Err(Error::Validation("habit id cannot be empty".to_string()));
        }
        if let Some(habit) = self.get_habit(id_or_prefix)? {
            return Ok(habit);
        }

        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT * FROM habits WHERE substr(id, 1, length(?1)) = ?1 ORDER BY created_at LIMIT 2",
        )?;
        let mut matches = stmt
            .query_map([id_or_prefix], Self::row_to_habit)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        match matches.len() {
            0 => Err(Error::HabitNotFound(id_or_prefix.to_string())),
            1 => Ok(matches.remove(0)),
            _ => Err(Error::Validation(format!(
                "habit id prefix '{}' is ambiguous",
                id_or_prefix
            ))),
        }
    }

    /// List habits in creation order
    pub fn list_habits(&self, filter: &HabitFilter) -> Result<Vec<Habit>> {
        let conn = self.conn();

        let mut sql = String::from("SELECT * FROM habits WHERE 1=1");
        if !filter.include_archived {
            sql.push_str(" AND is_archived = 0");
        }
        if !filter.include_inactive {
            sql.push_str(" AND is_active = 1");
        }
        sql.push_str(" ORDER BY created_at, name");

        let mut stmt = conn.prepare(&sql)?;
        let habits = stmt
            .query_map([], Self::row_to_habit)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(habits)
    }

    /// Number of habits ever created and not deleted, archived included
    pub fn count_habits(&self) -> Result<u32> {
        let conn = self.conn();
        let count: u32 = conn.query_row("SELECT COUNT(*) FROM habits", [], |r| r.get(0))?;
        Ok(count)
    }

    /// Update a habit's editable fields; `updated_at` is set to now.
    pub fn update_habit(&self, habit: &Habit) -> Result<()> {
        if habit.name.trim().is_empty() {
            return Err(Error::Validation("habit name cannot be empty".to_string()));
        }
        let conn = self.conn();
        let changed = conn.execute(
            r#"
            UPDATE habits SET
                name = ?2,
                description = ?3,
                frequency = ?4,
                color = ?5,
                icon = ?6,
                is_active = ?7,
                is_archived = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
            params![
                habit.id,
                habit.name,
                habit.description,
                habit.frequency.as_str(),
                habit.color,
                habit.icon,
                habit.is_active,
                habit.is_archived,
                Utc::now().to_rfc3339(),
            ],
        )?;
        if changed == 0 {
            return Err(Error::HabitNotFound(habit.id.clone()));
        }
        tracing::info!(habit_id = %habit.id, name = %habit.name, "Habit updated");
        Ok(())
    }

    /// Archive a habit. History and snapshot are kept.
    pub fn archive_habit(&self, id: &str) -> Result<()> {
        let conn = self.conn();
        let changed = conn.execute(
            "UPDATE habits SET is_archived = 1, updated_at = ?2 WHERE id = ?1",
            params![id, Utc::now().to_rfc3339()],
        )?;
        if changed == 0 {
            return Err(Error::HabitNotFound(id.to_string()));
        }
        tracing::info!(habit_id = id, "Habit archived");
        Ok(())
    }

    /// Delete a habit together with its completions and snapshot.
    pub fn delete_habit(&self, id: &str) -> Result<()> {
        let conn = self.conn();
        let changed = conn.execute("DELETE FROM habits WHERE id = ?", [id])?;
        if changed == 0 {
            return Err(Error::HabitNotFound(id.to_string()));
        }
        tracing::info!(habit_id = id, "Habit deleted");
        Ok(())
    }

    fn row_to_habit(row: &Row) -> rusqlite::Result<Habit> {
        let frequency_str: String = row.get("frequency")?;
        let created_at_str: String = row.get("created_at")?;
        let updated_at_str: String = row.get("updated_at")?;

        Ok(Habit {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            frequency: frequency_str.parse().unwrap_or_default(),
            color: row.get("color")?,
            icon: row.get("icon")?,
            is_active: row.get("is_active")?,
            is_archived: row.get("is_archived")?,
            created_at: parse_timestamp(&created_at_str),
            updated_at: parse_timestamp(&updated_at_str),
        })
    }

    // ============================================
    // Completion operations
    // ============================================

    /// Record a completion. Returns `false` if the day was already recorded.
    pub fn insert_completion(&self, habit_id: &str, day: CalendarDay) -> Result<bool> {
        let conn = self.conn();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO completions (habit_id, day, created_at) VALUES (?1, ?2, ?3)",
            params![habit_id, day.to_string(), Utc::now().to_rfc3339()],
        )?;
        Ok(inserted > 0)
    }

    /// Remove the habit's completion on `day`. Returns `false` if none existed.
    pub fn delete_completion(&self, habit_id: &str, day: CalendarDay) -> Result<bool> {
        let conn = self.conn();
        let deleted = conn.execute(
            "DELETE FROM completions WHERE habit_id = ?1 AND day = ?2",
            params![habit_id, day.to_string()],
        )?;
        Ok(deleted > 0)
    }

    /// All completion days of one habit, ascending.
    pub fn get_completion_days(&self, habit_id: &str) -> Result<Vec<CalendarDay>> {
        let conn = self.conn();
        query_completion_days(&conn, habit_id)
    }

    /// Completions between `start` and `end` inclusive, across all habits or
    /// for one habit, ordered by day.
    pub fn list_completions(
        &self,
        habit_id: Option<&str>,
        start: CalendarDay,
        end: CalendarDay,
    ) -> Result<Vec<Completion>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            r#"
            SELECT habit_id, day, created_at FROM completions
            WHERE day >= ?1 AND day <= ?2
              AND (?3 IS NULL OR habit_id = ?3)
            ORDER BY day, created_at
            "#,
        )?;
        let completions = stmt
            .query_map(
                params![start.to_string(), end.to_string(), habit_id],
                |row| {
                    let created_at_str: String = row.get("created_at")?;
                    Ok(Completion {
                        habit_id: row.get("habit_id")?,
                        day: day_column(row, "day")?,
                        created_at: parse_timestamp(&created_at_str),
                    })
                },
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(completions)
    }

    /// Total completion entries, across all habits or for one habit.
    pub fn count_completions(&self, habit_id: Option<&str>) -> Result<u32> {
        let conn = self.conn();
        let count: u32 = conn.query_row(
            "SELECT COUNT(*) FROM completions WHERE (?1 IS NULL OR habit_id = ?1)",
            params![habit_id],
            |r| r.get(0),
        )?;
        Ok(count)
    }

    // ============================================
    // Streak snapshot operations
    // ============================================

    /// Get the stored snapshot for a habit, if one was ever written
    pub fn get_streak_snapshot(&self, habit_id: &str) -> Result<Option<StreakSnapshot>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT habit_id, current_count, longest_count, last_updated FROM streaks WHERE habit_id = ?",
            [habit_id],
            |row| {
                let last_updated_str: String = row.get("last_updated")?;
                Ok(StreakSnapshot {
                    habit_id: row.get("habit_id")?,
                    current_count: row.get("current_count")?,
                    longest_count: row.get("longest_count")?,
                    last_updated: parse_timestamp(&last_updated_str),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    /// Insert or replace a habit's snapshot
    pub fn upsert_streak_snapshot(&self, snapshot: &StreakSnapshot) -> Result<()> {
        let conn = self.conn();
        write_snapshot(&conn, snapshot)
    }

    // ============================================
    // Badge operations
    // ============================================

    /// Record a badge as unlocked. Returns `false` if it already was.
    pub fn unlock_badge(&self, badge_id: &str, unlocked_at: DateTime<Utc>) -> Result<bool> {
        let conn = self.conn();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO badges (badge_id, unlocked_at) VALUES (?1, ?2)",
            params![badge_id, unlocked_at.to_rfc3339()],
        )?;
        Ok(inserted > 0)
    }

    /// Unlocked badges in unlock order
    pub fn list_badges(&self) -> Result<Vec<UnlockedBadge>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT badge_id, unlocked_at FROM badges ORDER BY unlocked_at, badge_id")?;
        let badges = stmt
            .query_map([], |row| {
                let unlocked_at_str: String = row.get("unlocked_at")?;
                Ok(UnlockedBadge {
                    badge_id: row.get("badge_id")?,
                    unlocked_at: parse_timestamp(&unlocked_at_str),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(badges)
    }

    /// Unlock every badge whose threshold is now met.
    ///
    /// Returns only the badges unlocked by this call.
    pub fn evaluate_badges(
        &self,
        today: CalendarDay,
        now: DateTime<Utc>,
    ) -> Result<Vec<&'static BadgeDefinition>> {
        let stats = self.get_dashboard_stats(today, RateWindow::default())?;
        let progress = stats.badge_progress(self.count_completions(None)?, self.count_habits()?);
        let unlocked: Vec<String> = self.list_badges()?.into_iter().map(|b| b.badge_id).collect();

        let mut fresh = Vec::new();
        for badge in newly_unlocked(&progress, &unlocked) {
            if self.unlock_badge(badge.id, now)? {
                tracing::info!(badge_id = badge.id, "Badge unlocked");
                fresh.push(badge);
            }
        }
        Ok(fresh)
    }

    // ============================================
    // Analytics queries
    // ============================================

    /// Completion days of every habit in one query, keyed by habit id.
    fn completion_days_by_habit(&self) -> Result<HashMap<String, Vec<CalendarDay>>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT habit_id, day FROM completions ORDER BY day")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>("habit_id")?, day_column(row, "day")?))
        })?;

        let mut by_habit: HashMap<String, Vec<CalendarDay>> = HashMap::new();
        for row in rows {
            let (habit_id, day) = row?;
            by_habit.entry(habit_id).or_default().push(day);
        }
        Ok(by_habit)
    }

    /// Per-habit stats for every tracked (active, unarchived) habit.
    pub fn get_habit_stats(&self, today: CalendarDay, window: RateWindow) -> Result<Vec<HabitStats>> {
        let habits = self.list_habits(&HabitFilter::default())?;
        let mut days_by_habit = self.completion_days_by_habit()?;

        Ok(habits
            .iter()
            .map(|habit| {
                let days = days_by_habit.remove(&habit.id).unwrap_or_default();
                HabitStats::compute(&habit.id, &habit.name, &days, today, window)
            })
            .collect())
    }

    /// Dashboard aggregate over tracked habits.
    pub fn get_dashboard_stats(&self, today: CalendarDay, window: RateWindow) -> Result<DashboardStats> {
        let habits = self.get_habit_stats(today, window)?;
        Ok(DashboardStats::from_habit_stats(habits, today, window))
    }

    /// Dense heatmap between `start` and `end`, for one habit or summed
    /// across every habit.
    pub fn get_heatmap(
        &self,
        habit_id: Option<&str>,
        start: CalendarDay,
        end: CalendarDay,
    ) -> Result<Vec<HeatmapDay>> {
        let days: Vec<CalendarDay> = self
            .list_completions(habit_id, start, end)?
            .into_iter()
            .map(|c| c.day)
            .collect();
        Ok(crate::analytics::build_heatmap(&days, start, end))
    }
}

impl CompletionStore for Database {
    fn habit(&self, habit_id: &str) -> Result<Option<Habit>> {
        self.get_habit(habit_id)
    }

    fn completion_days(&self, habit_id: &str) -> Result<Vec<CalendarDay>> {
        self.get_completion_days(habit_id)
    }

    fn insert_completion(&self, habit_id: &str, day: CalendarDay) -> Result<bool> {
        Database::insert_completion(self, habit_id, day)
    }

    fn delete_completion(&self, habit_id: &str, day: CalendarDay) -> Result<bool> {
        Database::delete_completion(self, habit_id, day)
    }

    fn upsert_streak_snapshot(&self, snapshot: &StreakSnapshot) -> Result<()> {
        Database::upsert_streak_snapshot(self, snapshot)
    }

    /// Read and write inside one transaction while holding the connection.
    fn refresh_streak_snapshot(
        &self,
        habit_id: &str,
        recompute: &mut dyn FnMut(&[CalendarDay]) -> StreakSnapshot,
    ) -> Result<StreakSnapshot> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let days = query_completion_days(&tx, habit_id)?;
        let snapshot = recompute(&days);
        write_snapshot(&tx, &snapshot)?;
        tx.commit()?;
        Ok(snapshot)
    }
}

fn query_habit(conn: &Connection, id: &str) -> Result<Option<Habit>> {
    conn.query_row("SELECT * FROM habits WHERE id = ?", [id], Database::row_to_habit)
        .optional()
        .map_err(Error::from)
}

fn query_completion_days(conn: &Connection, habit_id: &str) -> Result<Vec<CalendarDay>> {
    let mut stmt = conn.prepare("SELECT day FROM completions WHERE habit_id = ? ORDER BY day")?;
    let days = stmt
        .query_map([habit_id], |row| day_column(row, "day"))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(days)
}

fn write_snapshot(conn: &Connection, snapshot: &StreakSnapshot) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO streaks (habit_id, current_count, longest_count, last_updated)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT(habit_id) DO UPDATE SET
            current_count = excluded.current_count,
            longest_count = excluded.longest_count,
            last_updated = excluded.last_updated
        "#,
        params![
            snapshot.habit_id,
            snapshot.current_count,
            snapshot.longest_count,
            snapshot.last_updated.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn day_column(row: &Row, column: &str) -> rusqlite::Result<CalendarDay> {
    let value: String = row.get(column)?;
    CalendarDay::parse(&value)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
