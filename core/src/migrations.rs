//! Named, forward-only schema migrations.
//!
//! Every schema change is a uniquely named entry in [`MIGRATIONS`]. Applied
//! names are recorded in the `migrations` ledger table, so re-running the
//! engine against an already-migrated store is a no-op. A failing statement
//! propagates the error and leaves the ledger row unwritten — startup must
//! not continue with a half-applied schema.

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, params};
use tracing::debug;

pub struct Migration {
    pub name: &'static str,
    pub sql: &'static str,
}

/// Ordered migration catalog. Names are unique and never reused; new schema
/// changes are appended, never edited in place.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        name: "0001_initial_schema",
        sql: "CREATE TABLE IF NOT EXISTS habits (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT,
                icon TEXT,
                color TEXT NOT NULL,
                frequency TEXT NOT NULL CHECK (frequency IN ('daily', 'weekly', 'custom')),
                target_days_per_week INTEGER,
                reminder_time TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS habit_completions (
                id TEXT PRIMARY KEY,
                habit_id TEXT NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
                date TEXT NOT NULL,
                completed INTEGER NOT NULL DEFAULT 0,
                completed_at TEXT,
                notes TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (habit_id, date)
            );

            CREATE TABLE IF NOT EXISTS sleep_entries (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL UNIQUE,
                bedtime TEXT NOT NULL,
                wake_time TEXT NOT NULL,
                duration_minutes INTEGER NOT NULL,
                quality INTEGER NOT NULL CHECK (quality BETWEEN 1 AND 5),
                notes TEXT,
                factors TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS exercise_sessions (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                type TEXT NOT NULL,
                duration_minutes INTEGER NOT NULL,
                intensity TEXT NOT NULL CHECK (intensity IN ('low', 'moderate', 'high', 'very_high')),
                calories_burned INTEGER,
                notes TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS meals (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                meal_type TEXT NOT NULL CHECK (meal_type IN ('breakfast', 'lunch', 'dinner', 'snack')),
                name TEXT,
                total_calories REAL NOT NULL DEFAULT 0,
                total_protein REAL,
                total_carbs REAL,
                total_fat REAL,
                total_fiber REAL,
                photo_uri TEXT,
                ai_analysis TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS food_items (
                id TEXT PRIMARY KEY,
                meal_id TEXT NOT NULL REFERENCES meals(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                quantity REAL NOT NULL,
                unit TEXT NOT NULL,
                calories REAL NOT NULL,
                protein REAL,
                carbs REAL,
                fat REAL,
                is_ai_generated INTEGER NOT NULL DEFAULT 0,
                confidence REAL CHECK (confidence BETWEEN 0 AND 1),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS journal_entries (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                title TEXT,
                content TEXT NOT NULL,
                mood INTEGER CHECK (mood BETWEEN 1 AND 5),
                tags TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );",
    },
    Migration {
        name: "0002_date_indexes",
        sql: "CREATE INDEX IF NOT EXISTS idx_habit_completions_habit ON habit_completions(habit_id);
            CREATE INDEX IF NOT EXISTS idx_habit_completions_date ON habit_completions(date);
            CREATE INDEX IF NOT EXISTS idx_sleep_entries_date ON sleep_entries(date);
            CREATE INDEX IF NOT EXISTS idx_exercise_sessions_date ON exercise_sessions(date);
            CREATE INDEX IF NOT EXISTS idx_meals_date ON meals(date);
            CREATE INDEX IF NOT EXISTS idx_food_items_meal ON food_items(meal_id);
            CREATE INDEX IF NOT EXISTS idx_journal_entries_date ON journal_entries(date);",
    },
    Migration {
        name: "0003_exercise_metrics",
        sql: "ALTER TABLE exercise_sessions ADD COLUMN avg_heart_rate INTEGER;
            ALTER TABLE exercise_sessions ADD COLUMN distance_km REAL;",
    },
    Migration {
        name: "0004_journal_scanning",
        sql: "ALTER TABLE journal_entries ADD COLUMN is_scanned INTEGER NOT NULL DEFAULT 0;
            ALTER TABLE journal_entries ADD COLUMN original_image_uri TEXT;
            ALTER TABLE journal_entries ADD COLUMN ocr_confidence REAL;",
    },
];

/// Run every catalog entry whose name is not yet in the ledger, in
/// declaration order, recording each one as it completes.
pub fn apply_pending(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL
        );",
    )
    .context("Failed to create migration ledger")?;

    for migration in MIGRATIONS {
        let already_applied: i64 = conn.query_row(
            "SELECT COUNT(*) FROM migrations WHERE name = ?1",
            params![migration.name],
            |row| row.get(0),
        )?;
        if already_applied > 0 {
            continue;
        }

        conn.execute_batch(migration.sql)
            .with_context(|| format!("Migration '{}' failed", migration.name))?;
        conn.execute(
            "INSERT INTO migrations (name, applied_at) VALUES (?1, ?2)",
            params![migration.name, Utc::now().to_rfc3339()],
        )?;
        debug!(name = migration.name, "applied migration");
    }

    Ok(())
}

/// Ledger contents in application order, for startup diagnostics and tests.
pub fn applied_migrations(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM migrations ORDER BY id")?;
    let names = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(names)
}
