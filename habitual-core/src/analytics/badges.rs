//! Badge catalogue and unlock evaluation.
//!
//! Badges are threshold checks over numbers produced elsewhere in analytics.
//! Unlocking is one-way: a badge that was unlocked stays unlocked even if the
//! streak that earned it later breaks.

use serde::Serialize;

/// What a badge threshold is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeKind {
    /// Best current streak across tracked habits
    Streak,
    /// Total completions across all habits
    Completion,
    /// Number of habits created
    Special,
}

/// A badge that can be earned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BadgeDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub kind: BadgeKind,
    pub requirement: u32,
}

impl BadgeDefinition {
    /// Short human description of the requirement.
    pub fn requirement_label(&self) -> String {
        match self.kind {
            BadgeKind::Streak => format!("{}-day streak", self.requirement),
            BadgeKind::Completion => format!("{} total completions", self.requirement),
            BadgeKind::Special => "Special achievement".to_string(),
        }
    }

    /// Whether `progress` meets this badge's threshold.
    pub fn is_earned(&self, progress: &BadgeProgress) -> bool {
        let value = match self.kind {
            BadgeKind::Streak => progress.best_current_streak,
            BadgeKind::Completion => progress.total_completions,
            BadgeKind::Special => progress.habit_count,
        };
        value >= self.requirement
    }
}

/// All badges, in display order.
pub const BADGES: &[BadgeDefinition] = &[
    BadgeDefinition {
        id: "streak-7",
        name: "Week Warrior",
        description: "Maintain a 7-day streak",
        icon: "🔥",
        kind: BadgeKind::Streak,
        requirement: 7,
    },
    BadgeDefinition {
        id: "streak-30",
        name: "Monthly Master",
        description: "Maintain a 30-day streak",
        icon: "⚡",
        kind: BadgeKind::Streak,
        requirement: 30,
    },
    BadgeDefinition {
        id: "streak-100",
        name: "Century Club",
        description: "Maintain a 100-day streak",
        icon: "👑",
        kind: BadgeKind::Streak,
        requirement: 100,
    },
    BadgeDefinition {
        id: "completion-10",
        name: "Getting Started",
        description: "Complete 10 habits total",
        icon: "🎯",
        kind: BadgeKind::Completion,
        requirement: 10,
    },
    BadgeDefinition {
        id: "completion-50",
        name: "Consistent",
        description: "Complete 50 habits total",
        icon: "📈",
        kind: BadgeKind::Completion,
        requirement: 50,
    },
    BadgeDefinition {
        id: "first-habit",
        name: "First Steps",
        description: "Create your first habit",
        icon: "🚀",
        kind: BadgeKind::Special,
        requirement: 1,
    },
];

/// Look up a badge by id.
pub fn find_badge(id: &str) -> Option<&'static BadgeDefinition> {
    BADGES.iter().find(|b| b.id == id)
}

/// Inputs to badge evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BadgeProgress {
    /// Highest current streak among tracked habits
    pub best_current_streak: u32,
    /// Completion entries across all habits
    pub total_completions: u32,
    /// Habits created
    pub habit_count: u32,
}

/// Badges whose threshold is met and that are not in `unlocked_ids` yet.
pub fn newly_unlocked<'a, S: AsRef<str>>(
    progress: &BadgeProgress,
    unlocked_ids: &'a [S],
) -> impl Iterator<Item = &'static BadgeDefinition> + 'a {
    let progress = *progress;
    BADGES.iter().filter(move |badge| {
        badge.is_earned(&progress) && !unlocked_ids.iter().any(|id| id.as_ref() == badge.id)
    })
}
