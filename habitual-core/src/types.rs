//! Core domain types for habitual
//!
//! | Term | Definition |
//! |------|------------|
//! | **Habit** | Something a person wants to do regularly |
//! | **Completion** | A record that a habit was performed on a given calendar day |
//! | **Streak** | A maximal run of consecutive calendar days with at least one completion |
//! | **StreakSnapshot** | The persisted current/longest streak of one habit |
//! | **HeatmapDay** | One cell of a dense per-day count series |
//!
//! Calendar days are always UTC-normalized, see [`crate::date`].

use crate::date::CalendarDay;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================
// Habit
// ============================================

/// How often a habit is meant to be performed.
///
/// Streaks are always computed over consecutive calendar days regardless of
/// frequency; the value is descriptive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    /// Returns the identifier used in database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" | "Daily" => Ok(Frequency::Daily),
            "weekly" | "Weekly" => Ok(Frequency::Weekly),
            "monthly" | "Monthly" => Ok(Frequency::Monthly),
            _ => Err(format!("unknown frequency: {}", s)),
        }
    }
}

/// Default display colour for new habits.
pub const DEFAULT_HABIT_COLOR: &str = "#3b82f6";

/// Default icon for new habits.
pub const DEFAULT_HABIT_ICON: &str = "🎯";

/// A tracked habit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// Display name
    pub name: String,
    /// Optional longer description
    pub description: Option<String>,
    /// Intended cadence
    pub frequency: Frequency,
    /// Display colour (hex)
    pub color: String,
    /// Display icon
    pub icon: String,
    /// Inactive habits are hidden from dashboards
    pub is_active: bool,
    /// Archived habits are kept for history only
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Habit {
    /// Create a new active habit with default colour, icon and daily frequency.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            description: None,
            frequency: Frequency::default(),
            color: DEFAULT_HABIT_COLOR.to_string(),
            icon: DEFAULT_HABIT_ICON.to_string(),
            is_active: true,
            is_archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the habit shows up on dashboards and counts towards badges.
    pub fn is_tracked(&self) -> bool {
        self.is_active && !self.is_archived
    }
}

// ============================================
// Completion
// ============================================

/// A habit performed on a calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub habit_id: String,
    pub day: CalendarDay,
    /// When the completion was recorded
    pub created_at: DateTime<Utc>,
}

// ============================================
// Streak snapshot
// ============================================

/// Persisted streak state for one habit.
///
/// Invariant: `longest_count >= current_count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakSnapshot {
    pub habit_id: String,
    /// Consecutive days ending today or yesterday
    pub current_count: u32,
    /// Longest run ever observed
    pub longest_count: u32,
    pub last_updated: DateTime<Utc>,
}

// ============================================
// Heatmap
// ============================================

/// One day of a dense heatmap series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapDay {
    pub day: CalendarDay,
    /// Number of completion entries on this day (not deduplicated across habits)
    pub count: u32,
}

// ============================================
// Badges
// ============================================

/// A badge that has been unlocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockedBadge {
    /// Identifier from the badge catalogue (e.g. "streak-7")
    pub badge_id: String,
    pub unlocked_at: DateTime<Utc>,
}
