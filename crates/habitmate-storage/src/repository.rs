//! Owner-scoped habit persistence.
//!
//! `HabitRepository` is the only code that touches the `habits` table. Every
//! read takes the owner explicitly; update and delete are keyed by id alone.
//! Input is stored as given: validating names is the caller's job.

use std::sync::Arc;

use rusqlite::OptionalExtension;
use tracing::debug;

use habitmate_core::error::{HabitError, Result};
use habitmate_core::filter::CategoryFilter;
use habitmate_core::types::{Habit, Session, DEFAULT_CATEGORY};

use crate::db::Database;

const HABIT_COLUMNS: &str = "id, name, frequency, description, category, completed, username";

/// Repository for habits.
pub struct HabitRepository {
    db: Arc<Database>,
}

impl HabitRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert a new habit owned by `owner` and return its id.
    ///
    /// `habit.id` and `habit.owner` are ignored. An empty category is
    /// stored as `"General"`.
    pub fn create(&self, habit: &Habit, owner: &str) -> Result<i64> {
        let category = if habit.category.is_empty() {
            DEFAULT_CATEGORY
        } else {
            habit.category.as_str()
        };

        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO habits (name, frequency, description, category, completed, username)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    habit.name,
                    habit.frequency,
                    habit.description,
                    category,
                    habit.completed as i32,
                    owner,
                ],
            )
            .map_err(|e| HabitError::storage("Failed to save habit", e))?;
            let id = conn.last_insert_rowid();
            debug!(id, owner, "Habit created");
            Ok(id)
        })
    }

    /// All habits of `owner`, in storage order.
    pub fn list_for_owner(&self, owner: &str) -> Result<Vec<Habit>> {
        self.query_habits(
            &format!("SELECT {} FROM habits WHERE username = ?1 ORDER BY id", HABIT_COLUMNS),
            rusqlite::params![owner],
        )
    }

    /// Habits of the session's current owner.
    pub fn list_for_session(&self, session: &Session) -> Result<Vec<Habit>> {
        self.list_for_owner(session.current_owner())
    }

    /// Habits of an arbitrary owner.
    ///
    /// Same result as [`list_for_owner`](Self::list_for_owner); kept separate
    /// for administrative and sharing callers that are not acting as that
    /// owner.
    pub fn get_by_owner(&self, owner: &str) -> Result<Vec<Habit>> {
        debug!(owner, "Privileged habit read");
        self.list_for_owner(owner)
    }

    /// One habit of `owner` by id. `None` if it does not exist or belongs to
    /// someone else.
    pub fn find_by_id(&self, owner: &str, id: i64) -> Result<Option<Habit>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM habits WHERE id = ?1 AND username = ?2",
                    HABIT_COLUMNS
                ))
                .map_err(|e| HabitError::storage("Failed to prepare habit lookup", e))?;

            stmt.query_row(rusqlite::params![id, owner], row_to_habit)
                .optional()
                .map_err(|e| HabitError::storage("Failed to load habit", e))
        })
    }

    /// Habits of `owner` whose name contains `name_substring` (case-sensitive)
    /// and whose category passes `category`.
    pub fn search(
        &self,
        owner: &str,
        name_substring: &str,
        category: &CategoryFilter,
    ) -> Result<Vec<Habit>> {
        // instr() keeps the match case-sensitive and treats % and _ literally.
        self.query_habits(
            &format!(
                "SELECT {} FROM habits
                 WHERE username = ?1
                   AND (?2 = '' OR instr(name, ?2) > 0)
                   AND (?3 IS NULL OR category = ?3)
                 ORDER BY id",
                HABIT_COLUMNS
            ),
            rusqlite::params![owner, name_substring, category.as_exact()],
        )
    }

    /// [`search`](Self::search) driven by a raw category selector, where
    /// `None` or `"All"` means any category.
    pub fn search_with_selector(
        &self,
        owner: &str,
        name_substring: &str,
        category_selector: Option<&str>,
    ) -> Result<Vec<Habit>> {
        self.search(
            owner,
            name_substring,
            &CategoryFilter::from_optional(category_selector),
        )
    }

    /// Overwrite every mutable field of the row with `habit.id`.
    ///
    /// An empty `habit.owner` is replaced by `session_owner` so a row can
    /// never lose its owner through an edit. Returns the number of rows
    /// changed: 0 when no row has that id (or the habit has no id yet).
    pub fn update(&self, habit: &Habit, session_owner: &str) -> Result<usize> {
        let Some(id) = habit.id else {
            return Ok(0);
        };
        let owner = if habit.owner.is_empty() {
            session_owner
        } else {
            habit.owner.as_str()
        };
        let category = if habit.category.is_empty() {
            DEFAULT_CATEGORY
        } else {
            habit.category.as_str()
        };

        self.db.with_conn(|conn| {
            let rows = conn
                .execute(
                    "UPDATE habits
                     SET name = ?1, frequency = ?2, description = ?3,
                         category = ?4, completed = ?5, username = ?6
                     WHERE id = ?7",
                    rusqlite::params![
                        habit.name,
                        habit.frequency,
                        habit.description,
                        category,
                        habit.completed as i32,
                        owner,
                        id,
                    ],
                )
                .map_err(|e| HabitError::storage("Failed to update habit", e))?;
            debug!(id, rows, "Habit updated");
            Ok(rows)
        })
    }

    /// Delete the habit with `id`. Returns the number of rows removed; 0 if
    /// there was no such habit.
    pub fn delete_by_id(&self, id: i64) -> Result<usize> {
        self.db.with_conn(|conn| {
            let rows = conn
                .execute("DELETE FROM habits WHERE id = ?1", rusqlite::params![id])
                .map_err(|e| HabitError::storage("Failed to delete habit", e))?;
            debug!(id, rows, "Habit deleted");
            Ok(rows)
        })
    }

    /// Number of habits stored for `owner`.
    pub fn count_for_owner(&self, owner: &str) -> Result<u64> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM habits WHERE username = ?1",
                    rusqlite::params![owner],
                    |row| row.get(0),
                )
                .map_err(|e| HabitError::storage("Failed to count habits", e))?;
            Ok(count as u64)
        })
    }

    fn query_habits(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<Habit>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(sql)
                .map_err(|e| HabitError::storage("Failed to prepare habit query", e))?;

            let rows = stmt
                .query_map(params, row_to_habit)
                .map_err(|e| HabitError::storage("Failed to query habits", e))?;

            let mut habits = Vec::new();
            for row in rows {
                habits.push(row.map_err(|e| HabitError::storage("Failed to read habit", e))?);
            }
            Ok(habits)
        })
    }
}

// ============================================================================
// Row conversion.
// ============================================================================

/// Map a row selected with `HABIT_COLUMNS`. NULL text columns (rows written
/// before a column existed) read back as empty strings, and a NULL category
/// as the default.
fn row_to_habit(row: &rusqlite::Row<'_>) -> rusqlite::Result<Habit> {
    let id: i64 = row.get(0)?;
    let name: Option<String> = row.get(1)?;
    let frequency: Option<String> = row.get(2)?;
    let description: Option<String> = row.get(3)?;
    let category: Option<String> = row.get(4)?;
    let completed: Option<i64> = row.get(5)?;
    let owner: Option<String> = row.get(6)?;

    Ok(Habit::builder(name.unwrap_or_default())
        .id(id)
        .frequency(frequency.unwrap_or_default())
        .description(description.unwrap_or_default())
        .category(category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()))
        .completed(completed.unwrap_or(0) != 0)
        .owner(owner.unwrap_or_default())
        .build_unchecked())
}
