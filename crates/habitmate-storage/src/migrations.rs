//! Database schema migrations.
//!
//! The habit table grows additively:
//! - v1 creates `habits` with id, name, frequency, description, completed;
//! - v2 adds `category` (default `'General'`);
//! - v3 adds the nullable `username` owner column.
//!
//! Each step runs only when the version stored at open time is below the
//! step's target, and checks the live schema before altering it, so running
//! the sequence again is harmless. A step that fails is logged and reported
//! but does not stop the steps after it.

use rusqlite::Connection;
use tracing::{info, warn};

use habitmate_core::error::{HabitError, Result};

/// Version the schema reaches once every step has been applied.
pub const SCHEMA_VERSION: i64 = 3;

/// One additive schema step.
struct Migration {
    version: i64,
    name: &'static str,
    apply: fn(&Connection) -> Result<()>,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_habits",
        apply: apply_v1,
    },
    Migration {
        version: 2,
        name: "add_category",
        apply: apply_v2,
    },
    Migration {
        version: 3,
        name: "add_username",
        apply: apply_v3,
    },
];

/// A step that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedMigration {
    pub version: i64,
    pub name: &'static str,
    pub error: String,
}

/// What happened during one migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Stored version before the run.
    pub from_version: i64,
    /// Stored version after the run.
    pub to_version: i64,
    /// Versions applied in this run, in order.
    pub applied: Vec<i64>,
    pub failed: Vec<FailedMigration>,
}

impl MigrationReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Run all pending database migrations.
///
/// Only a failure to read or create the version bookkeeping is returned as
/// an error; failed steps end up in [`MigrationReport::failed`].
pub fn run_migrations(conn: &Connection) -> Result<MigrationReport> {
    ensure_tracking_table(conn)?;
    let current = current_version(conn)?;
    apply_steps(conn, current, MIGRATIONS)
}

/// Highest version recorded in `schema_migrations`, or 0 for a new database.
pub fn current_version(conn: &Connection) -> Result<i64> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )
    .map_err(|e| HabitError::storage("Failed to query migration version", e))
}

/// Column names of `table`, in declaration order. Empty if the table does not exist.
pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({})", table))
        .map_err(|e| HabitError::storage("Failed to read table info", e))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .map_err(|e| HabitError::storage("Failed to read table info", e))?;

    let mut columns = Vec::new();
    for row in rows {
        columns.push(row.map_err(|e| HabitError::Storage(e.to_string()))?);
    }
    Ok(columns)
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    Ok(table_columns(conn, table)?.iter().any(|c| c == column))
}

fn ensure_tracking_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| HabitError::storage("Failed to create migrations table", e))
}

fn apply_steps(conn: &Connection, stored: i64, steps: &[Migration]) -> Result<MigrationReport> {
    let mut report = MigrationReport {
        from_version: stored,
        ..Default::default()
    };

    for step in steps {
        if stored >= step.version {
            continue;
        }
        let outcome = (step.apply)(conn).and_then(|()| record(conn, step));
        match outcome {
            Ok(()) => {
                info!("Applied migration v{}: {}", step.version, step.name);
                report.applied.push(step.version);
            }
            Err(e) => {
                warn!(
                    version = step.version,
                    error = %e,
                    "Migration v{} ({}) failed; continuing with later steps",
                    step.version,
                    step.name
                );
                report.failed.push(FailedMigration {
                    version: step.version,
                    name: step.name,
                    error: e.to_string(),
                });
            }
        }
    }

    report.to_version = current_version(conn)?;
    Ok(report)
}

fn record(conn: &Connection, step: &Migration) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO schema_migrations (version, name) VALUES (?1, ?2)",
        rusqlite::params![step.version, step.name],
    )
    .map_err(|e| HabitError::storage("Failed to record migration", e))?;
    Ok(())
}

/// Version 1: base habits table.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS habits (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT,
            frequency   TEXT,
            description TEXT,
            completed   INTEGER DEFAULT 0
        );",
    )
    .map_err(|e| HabitError::storage("Failed to apply migration v1", e))
}

/// Version 2: habit category.
fn apply_v2(conn: &Connection) -> Result<()> {
    if column_exists(conn, "habits", "category")? {
        return Ok(());
    }
    conn.execute(
        "ALTER TABLE habits ADD COLUMN category TEXT DEFAULT 'General'",
        [],
    )
    .map_err(|e| HabitError::storage("Failed to apply migration v2", e))?;
    Ok(())
}

/// Version 3: owner column. Existing rows stay ownerless.
fn apply_v3(conn: &Connection) -> Result<()> {
    if !column_exists(conn, "habits", "username")? {
        conn.execute("ALTER TABLE habits ADD COLUMN username TEXT", [])
            .map_err(|e| HabitError::storage("Failed to apply migration v3", e))?;
    }
    conn.execute_batch("CREATE INDEX IF NOT EXISTS idx_habits_username ON habits (username);")
        .map_err(|e| HabitError::storage("Failed to apply migration v3", e))
}
