//! Analytics module for habitual
//!
//! Pure computations over completion days:
//! - Streaks (current with one-day grace, longest)
//! - Completion rate over a trailing window
//! - Dense heatmap series
//! - Calendar period progress
//! - Dashboard aggregation and badges
//!
//! Nothing here touches storage. Callers fetch completion days and pass them
//! in; every function is deterministic and safe to call from any thread.

pub mod badges;
pub mod dashboard;
pub mod heatmap;
pub mod period;
pub mod rate;
pub mod streak;

pub use badges::{find_badge, newly_unlocked, BadgeDefinition, BadgeKind, BadgeProgress, BADGES};
pub use dashboard::{DashboardStats, HabitStats};
pub use heatmap::{build_heatmap, intensity, HeatmapRange};
pub use period::{period_progress, week_run, Period, PeriodProgress};
pub use rate::{completion_rate, RateWindow};
pub use streak::{current_streak, longest_run, longest_streak, StreakRun, StreakSummary};
