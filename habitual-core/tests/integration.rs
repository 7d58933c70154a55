//! Integration tests for the on-disk store
//!
//! These tests open a real SQLite file in a temp directory and drive it
//! through the tracker, the way the CLI does.

use chrono::Utc;
use habitual_core::analytics::{HeatmapRange, RateWindow};
use habitual_core::{CalendarDay, ChangeKind, Database, Error, Habit, HabitFilter, Tracker};
use std::path::PathBuf;
use tempfile::TempDir;

fn day(s: &str) -> CalendarDay {
    s.parse().expect("valid day")
}

/// Open a migrated database inside `dir`
fn open_db(dir: &TempDir) -> (Database, PathBuf) {
    let path = dir.path().join("data/habits.db");
    let db = Database::open(&path).expect("open should succeed");
    db.migrate().expect("migrate should succeed");
    (db, path)
}

fn create_habit(db: &Database, name: &str) -> Habit {
    let habit = Habit::new(name);
    db.insert_habit(&habit).expect("insert should succeed");
    habit
}

// ============================================
// Completion flow
// ============================================

#[test]
fn test_add_and_remove_flow() {
    let dir = TempDir::new().unwrap();
    let (db, _) = open_db(&dir);
    let habit = create_habit(&db, "Meditate");
    let tracker = Tracker::new(&db);
    let today = day("2024-01-05");

    for d in ["2023-12-20", "2023-12-21", "2023-12-22", "2024-01-04", "2024-01-05"] {
        let change = tracker.add_completion(&habit.id, day(d), today).unwrap();
        assert!(change.applied);
    }

    let snap = db.get_streak_snapshot(&habit.id).unwrap().unwrap();
    assert_eq!(snap.current_count, 2);
    assert_eq!(snap.longest_count, 3);

    let change = tracker
        .remove_completion(&habit.id, day("2023-12-21"), today)
        .unwrap();
    assert_eq!(change.kind, ChangeKind::Removed);
    let snap = change.snapshot().unwrap();
    assert_eq!(snap.current_count, 2);
    assert_eq!(snap.longest_count, 2);
}

#[test]
fn test_snapshot_created_on_first_completion() {
    let dir = TempDir::new().unwrap();
    let (db, _) = open_db(&dir);
    let habit = create_habit(&db, "Read");
    assert!(db.get_streak_snapshot(&habit.id).unwrap().is_none());

    let today = day("2024-06-01");
    Tracker::new(&db).add_completion(&habit.id, today, today).unwrap();
    let snap = db.get_streak_snapshot(&habit.id).unwrap().unwrap();
    assert_eq!((snap.current_count, snap.longest_count), (1, 1));
}

#[test]
fn test_unknown_habit() {
    let dir = TempDir::new().unwrap();
    let (db, _) = open_db(&dir);
    let today = day("2024-06-01");

    let err = Tracker::new(&db)
        .toggle_completion("does-not-exist", today, today)
        .unwrap_err();
    assert!(matches!(err, Error::HabitNotFound(_)));
    assert_eq!(db.count_completions(None).unwrap(), 0);
}

#[test]
fn test_delete_removes_history_and_snapshot() {
    let dir = TempDir::new().unwrap();
    let (db, _) = open_db(&dir);
    let keep = create_habit(&db, "Keep");
    let gone = create_habit(&db, "Gone");
    let tracker = Tracker::new(&db);
    let today = day("2024-02-10");

    tracker.add_completion(&keep.id, today, today).unwrap();
    tracker.add_completion(&gone.id, today, today).unwrap();
    db.delete_habit(&gone.id).unwrap();

    assert!(db.get_streak_snapshot(&gone.id).unwrap().is_none());
    assert_eq!(db.count_completions(None).unwrap(), 1);
    assert!(db.get_streak_snapshot(&keep.id).unwrap().is_some());
}

// ============================================
// Persistence
// ============================================

#[test]
fn test_state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let today = day("2024-03-03");
    let habit_id = {
        let (db, _) = open_db(&dir);
        let habit = create_habit(&db, "Walk");
        let tracker = Tracker::new(&db);
        for d in ["2024-03-01", "2024-03-02", "2024-03-03"] {
            tracker.add_completion(&habit.id, day(d), today).unwrap();
        }
        db.unlock_badge("first-habit", Utc::now()).unwrap();
        habit.id
    };

    let (db, _) = open_db(&dir);
    let habit = db.find_habit(&habit_id[..8]).unwrap();
    assert_eq!(habit.name, "Walk");
    assert_eq!(db.get_completion_days(&habit_id).unwrap().len(), 3);
    let snap = db.get_streak_snapshot(&habit_id).unwrap().unwrap();
    assert_eq!(snap.current_count, 3);
    assert_eq!(db.list_badges().unwrap()[0].badge_id, "first-habit");
}

// ============================================
// Analytics over stored data
// ============================================

#[test]
fn test_heatmap_year_across_habits() {
    let dir = TempDir::new().unwrap();
    let (db, _) = open_db(&dir);
    let a = create_habit(&db, "A");
    let b = create_habit(&db, "B");
    for d in ["2024-01-01", "2024-02-29", "2024-12-31"] {
        db.insert_completion(&a.id, day(d)).unwrap();
    }
    db.insert_completion(&b.id, day("2024-02-29")).unwrap();
    db.insert_completion(&b.id, day("2023-12-31")).unwrap();

    let (start, end) = HeatmapRange::Year(2024).bounds(day("2024-06-15"));
    let series = db.get_heatmap(None, start, end).unwrap();

    assert_eq!(series.len(), 366);
    assert_eq!(series.first().unwrap().day, day("2024-01-01"));
    assert_eq!(series.last().unwrap().day, day("2024-12-31"));
    let leap = series.iter().find(|d| d.day == day("2024-02-29")).unwrap();
    assert_eq!(leap.count, 2);
    assert_eq!(series.iter().map(|d| d.count).sum::<u32>(), 4);
}

#[test]
fn test_dashboard_ignores_archived() {
    let dir = TempDir::new().unwrap();
    let (db, _) = open_db(&dir);
    let live = create_habit(&db, "Live");
    let old = create_habit(&db, "Old");
    let today = day("2024-04-30");
    db.insert_completion(&live.id, today).unwrap();
    db.insert_completion(&old.id, today).unwrap();
    db.archive_habit(&old.id).unwrap();

    let stats = db.get_dashboard_stats(today, RateWindow::Month).unwrap();
    assert_eq!(stats.total_habits, 1);
    assert_eq!(stats.completed_today, 1);
    assert_eq!(stats.habits[0].completion_rate, 3);

    assert_eq!(db.list_habits(&HabitFilter::all()).unwrap().len(), 2);
}
