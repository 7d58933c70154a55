//! Database layer for habitual
//!
//! This module provides the storage layer using SQLite with:
//! - Schema migrations
//! - Repository pattern for queries
//! - The [`crate::CompletionStore`] implementation used by the tracker

pub mod repo;
pub mod schema;

pub use repo::{Database, HabitFilter};
