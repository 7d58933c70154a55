//! # habitual-core
//!
//! Core library for habitual - a habit tracker built around streaks.
//!
//! This library provides:
//! - Calendar-day normalization (UTC)
//! - Pure analytics: streaks, completion rates, heatmaps, period progress,
//!   dashboard aggregation and badges
//! - Completion mutations that keep a persisted streak snapshot in sync
//! - Database storage layer with SQLite
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Example
//!
//! ```rust,no_run
//! use habitual_core::{CalendarDay, Config, Database, Habit, Tracker};
//!
//! let db = Database::open(&Config::database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//!
//! let habit = Habit::new("Read");
//! db.insert_habit(&habit).expect("failed to create habit");
//!
//! let today = CalendarDay::today();
//! let change = Tracker::new(&db)
//!     .add_completion(&habit.id, today, today)
//!     .expect("failed to record completion");
//! println!("{:?}", change.snapshot());
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use date::CalendarDay;
pub use db::{Database, HabitFilter};
pub use error::{Error, Result};
pub use snapshot::CompletionStore;
pub use tracker::{ChangeKind, CompletionChange, Tracker};
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod date;
pub mod db;
pub mod error;
pub mod format;
pub mod logging;
pub mod snapshot;
pub mod tracker;
pub mod types;
