use serde::{Deserialize, Serialize};

use crate::error::{HabitError, Result};

/// Category assigned when none is supplied.
pub const DEFAULT_CATEGORY: &str = "General";

/// Category selector value meaning "do not filter by category".
pub const CATEGORY_ALL: &str = "All";

// =============================================================================
// Habit
// =============================================================================

/// A trackable recurring activity owned by one user.
///
/// `id` is `None` until the habit has been persisted; the store assigns it and
/// it never changes afterwards. `streak_count` and `last_completed_date` are
/// carried along for callers but are not persisted or queried.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: Option<i64>,
    pub name: String,
    pub frequency: String,
    pub description: String,
    pub category: String,
    pub owner: String,
    pub completed: bool,
    #[serde(default)]
    pub streak_count: u32,
    #[serde(default)]
    pub last_completed_date: String,
}

impl Habit {
    /// Start building a habit with the given name.
    pub fn builder(name: impl Into<String>) -> HabitBuilder {
        HabitBuilder::new(name)
    }

    /// Reject habits whose name is empty after trimming.
    ///
    /// The store does not call this; callers validate before `create`.
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)
    }

    /// True when every user-visible field matches, ignoring id and owner.
    pub fn same_content(&self, other: &Habit) -> bool {
        self.name == other.name
            && self.frequency == other.frequency
            && self.description == other.description
            && self.category == other.category
            && self.completed == other.completed
    }
}

/// Check that a habit name is non-empty once surrounding whitespace is removed.
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(HabitError::Validation("habit name must not be empty".to_string()));
    }
    Ok(())
}

/// Builder for [`Habit`] with the defaults a new habit starts from.
#[derive(Clone, Debug)]
pub struct HabitBuilder {
    habit: Habit,
}

impl HabitBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            habit: Habit {
                id: None,
                name: name.into(),
                frequency: String::new(),
                description: String::new(),
                category: DEFAULT_CATEGORY.to_string(),
                owner: String::new(),
                completed: false,
                streak_count: 0,
                last_completed_date: String::new(),
            },
        }
    }

    pub fn id(mut self, id: i64) -> Self {
        self.habit.id = Some(id);
        self
    }

    pub fn frequency(mut self, frequency: impl Into<String>) -> Self {
        self.habit.frequency = frequency.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.habit.description = description.into();
        self
    }

    /// Set the category; an empty value keeps the default.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        if !category.is_empty() {
            self.habit.category = category;
        }
        self
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.habit.owner = owner.into();
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.habit.completed = completed;
        self
    }

    pub fn streak(mut self, streak_count: u32, last_completed_date: impl Into<String>) -> Self {
        self.habit.streak_count = streak_count;
        self.habit.last_completed_date = last_completed_date.into();
        self
    }

    /// Finish without validation, e.g. when mapping rows read back from storage.
    pub fn build_unchecked(self) -> Habit {
        self.habit
    }

    /// Finish, rejecting an empty name.
    pub fn build(self) -> Result<Habit> {
        self.habit.validate()?;
        Ok(self.habit)
    }
}

// =============================================================================
// Session
// =============================================================================

/// Identity of the user on whose behalf store calls are made.
///
/// An empty owner is a valid scope: it only matches rows stored with an
/// empty owner.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    owner: String,
}

impl Session {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
        }
    }

    /// Session for nobody logged in.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn current_owner(&self) -> &str {
        &self.owner
    }

    pub fn is_anonymous(&self) -> bool {
        self.owner.is_empty()
    }
}
