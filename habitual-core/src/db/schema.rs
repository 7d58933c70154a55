//! Database schema and migrations
//!
//! Uses SQLite with embedded migrations managed via PRAGMA user_version.

use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: habits, completions, streak snapshots
    r#"
    CREATE TABLE IF NOT EXISTS habits (
        id               TEXT PRIMARY KEY,
        name             TEXT NOT NULL,
        description      TEXT,
        frequency        TEXT NOT NULL DEFAULT 'daily',
        color            TEXT NOT NULL,
        icon             TEXT NOT NULL,
        is_active        INTEGER NOT NULL DEFAULT 1,
        is_archived      INTEGER NOT NULL DEFAULT 0,
        created_at       DATETIME NOT NULL,
        updated_at       DATETIME NOT NULL
    );

    -- day is a UTC calendar day, YYYY-MM-DD
    CREATE TABLE IF NOT EXISTS completions (
        id               INTEGER PRIMARY KEY AUTOINCREMENT,
        habit_id         TEXT NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
        day              TEXT NOT NULL,
        created_at       DATETIME NOT NULL,
        UNIQUE(habit_id, day)
    );

    CREATE INDEX IF NOT EXISTS idx_completions_day ON completions(day);

    CREATE TABLE IF NOT EXISTS streaks (
        habit_id         TEXT PRIMARY KEY REFERENCES habits(id) ON DELETE CASCADE,
        current_count    INTEGER NOT NULL DEFAULT 0,
        longest_count    INTEGER NOT NULL DEFAULT 0,
        last_updated     DATETIME NOT NULL
    );
    "#,
    // Version 2: unlocked badges
    r#"
    CREATE TABLE IF NOT EXISTS badges (
        badge_id         TEXT PRIMARY KEY,
        unlocked_at      DATETIME NOT NULL
    );
    "#,
];

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> crate::error::Result<()> {
    let current_version: i32 = conn
        .query_row("PRAGMA user_version", [], |r| r.get(0))
        .unwrap_or(0);

    tracing::info!(
        current_version,
        target_version = SCHEMA_VERSION,
        "Checking database migrations"
    );

    for (i, migration) in MIGRATIONS.iter().enumerate() {
        let version = (i + 1) as i32;
        if version > current_version {
            tracing::info!(version, "Running migration");
            conn.execute_batch(migration)?;
            conn.execute(&format!("PRAGMA user_version = {}", version), [])?;
        }
    }

    if current_version < SCHEMA_VERSION {
        tracing::info!(
            from = current_version,
            to = SCHEMA_VERSION,
            "Migrations complete"
        );
    }

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> crate::error::Result<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    Ok(version)
}
