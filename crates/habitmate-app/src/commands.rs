//! Command execution: turns parsed CLI commands into store calls.
//!
//! This is the collaborator that sits in front of the core. It reads the
//! current owner from the session file, validates input before it reaches
//! the store, and checks that a habit id belongs to the session owner before
//! mutating it.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use habitmate_core::config::HabitMateConfig;
use habitmate_core::error::{HabitError, Result};
use habitmate_core::filter::filter;
use habitmate_core::progress::Progress;
use habitmate_core::types::{Habit, Session};
use habitmate_storage::{AccountStore, Database, DbOptions, HabitRepository};

use crate::cli::Command;
use crate::session::SessionFile;

/// Result of a command, rendered as text or JSON by [`Output::render`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Output {
    Message { message: String },
    Habit { habit: Habit },
    Habits { habits: Vec<Habit> },
    Progress { progress: Progress },
    Choices {
        categories: Vec<String>,
        frequencies: Vec<String>,
    },
}

impl Output {
    fn message(message: impl Into<String>) -> Self {
        Output::Message {
            message: message.into(),
        }
    }

    pub fn render(&self, json: bool) -> Result<String> {
        if json {
            return Ok(serde_json::to_string_pretty(self)?);
        }
        Ok(match self {
            Output::Message { message } => message.clone(),
            Output::Habit { habit } => {
                let mut text = habit_line(habit);
                if !habit.description.is_empty() {
                    text.push_str("\n      ");
                    text.push_str(&habit.description);
                }
                text
            }
            Output::Habits { habits } if habits.is_empty() => "No habits found.".to_string(),
            Output::Habits { habits } => habits
                .iter()
                .map(habit_line)
                .collect::<Vec<_>>()
                .join("\n"),
            Output::Progress { progress } => format!(
                "Total habits:     {}\nCompleted:        {}\nCompletion:       {}%\n{}",
                progress.total,
                progress.completed,
                progress.percent,
                progress.motivation.message()
            ),
            Output::Choices {
                categories,
                frequencies,
            } => format!(
                "Categories:  {}\nFrequencies: {}",
                categories.join(", "),
                frequencies.join(", ")
            ),
        })
    }
}

fn habit_line(habit: &Habit) -> String {
    format!(
        "{:>4}  [{}] {:<28} {:<8} {}",
        habit.id.map(|id| id.to_string()).unwrap_or_default(),
        if habit.completed { "x" } else { " " },
        habit.name,
        habit.frequency,
        habit.category
    )
}

/// Everything a command needs: config, stores and the session file.
pub struct App {
    config: HabitMateConfig,
    habits: HabitRepository,
    accounts: AccountStore,
    session_file: SessionFile,
}

impl App {
    /// Open the stores under `data_dir`.
    pub fn open(config: HabitMateConfig, data_dir: &Path) -> Result<Self> {
        let options = DbOptions {
            wal: config.storage.wal,
        };

        let db = Database::with_options(&data_dir.join(&config.storage.habits_db), options)?;
        let report = db.migration_report();
        for failed in &report.failed {
            warn!(
                version = failed.version,
                "Schema step {} did not apply: {}", failed.name, failed.error
            );
        }

        let accounts =
            AccountStore::with_options(&data_dir.join(&config.storage.accounts_db), options)?;

        let session_file = SessionFile::in_dir(data_dir);
        debug!(session = %session_file.path().display(), "Stores opened");

        Ok(Self {
            habits: HabitRepository::new(Arc::new(db)),
            accounts,
            session_file,
            config,
        })
    }

    /// Session of the logged-in user; fails if nobody is logged in.
    fn require_session(&self) -> Result<Session> {
        let session = self.session_file.load();
        if session.is_anonymous() {
            return Err(HabitError::NotLoggedIn);
        }
        Ok(session)
    }

    /// Load a habit of the session owner, or `None` if the id is not theirs.
    fn owned_habit(&self, session: &Session, id: i64) -> Result<Option<Habit>> {
        self.habits.find_by_id(session.current_owner(), id)
    }

    pub fn execute(&self, command: Command) -> Result<Output> {
        match command {
            Command::Register { username, password } => {
                self.accounts.register(&username, &password)?;
                Ok(Output::message(format!(
                    "Registration successful. Log in with `habitmate login {}`.",
                    username.trim()
                )))
            }
            Command::Login { username, password } => {
                let session = self.accounts.verify(&username, &password)?;
                self.session_file.save(&session)?;
                info!(username = session.current_owner(), "Logged in");
                Ok(Output::message(format!(
                    "Logged in as {}.",
                    session.current_owner()
                )))
            }
            Command::Logout => {
                let was_logged_in = self.session_file.clear()?;
                Ok(Output::message(if was_logged_in {
                    "Logged out."
                } else {
                    "Nobody was logged in."
                }))
            }
            Command::Whoami => {
                let session = self.session_file.load();
                Ok(Output::message(if session.is_anonymous() {
                    "Not logged in.".to_string()
                } else {
                    session.current_owner().to_string()
                }))
            }
            Command::Add {
                name,
                frequency,
                description,
                category,
            } => {
                let session = self.require_session()?;
                let category =
                    category.unwrap_or_else(|| self.config.habits.default_category.clone());
                let mut habit = Habit::builder(name.trim())
                    .frequency(frequency)
                    .description(description.trim())
                    .category(category)
                    .build()?;

                let id = self.habits.create(&habit, session.current_owner())?;
                habit.id = Some(id);
                habit.owner = session.current_owner().to_string();
                Ok(Output::Habit { habit })
            }
            Command::List { query, category } => {
                let session = self.require_session()?;
                let all = self.habits.list_for_session(&session)?;
                Ok(Output::Habits {
                    habits: filter(&all, &query, &category),
                })
            }
            Command::Search { text, category } => {
                let session = self.require_session()?;
                let habits = self.habits.search_with_selector(
                    session.current_owner(),
                    &text,
                    category.as_deref(),
                )?;
                Ok(Output::Habits { habits })
            }
            Command::Show { id } => {
                let session = self.require_session()?;
                Ok(match self.owned_habit(&session, id)? {
                    Some(habit) => Output::Habit { habit },
                    None => no_such_habit(id),
                })
            }
            Command::Complete { id, undo } => {
                let session = self.require_session()?;
                let Some(mut habit) = self.owned_habit(&session, id)? else {
                    return Ok(no_such_habit(id));
                };
                habit.completed = !undo;
                self.habits.update(&habit, session.current_owner())?;
                Ok(Output::Habit { habit })
            }
            Command::Edit {
                id,
                name,
                frequency,
                description,
                category,
                completed,
            } => {
                let session = self.require_session()?;
                let Some(mut habit) = self.owned_habit(&session, id)? else {
                    return Ok(no_such_habit(id));
                };
                if let Some(name) = name {
                    habit.name = name.trim().to_string();
                }
                if let Some(frequency) = frequency {
                    habit.frequency = frequency;
                }
                if let Some(description) = description {
                    habit.description = description;
                }
                if let Some(category) = category {
                    habit.category = category;
                }
                if let Some(completed) = completed {
                    habit.completed = completed;
                }
                habit.validate()?;

                self.habits.update(&habit, session.current_owner())?;
                // Re-read so the caller sees what was stored (e.g. defaulted category).
                Ok(match self.owned_habit(&session, id)? {
                    Some(habit) => Output::Habit { habit },
                    None => no_such_habit(id),
                })
            }
            Command::Delete { id } => {
                let session = self.require_session()?;
                if self.owned_habit(&session, id)?.is_none() {
                    return Ok(no_such_habit(id));
                }
                self.habits.delete_by_id(id)?;
                Ok(Output::message(format!("Deleted habit #{}.", id)))
            }
            Command::Progress => {
                let session = self.require_session()?;
                let habits = self.habits.list_for_session(&session)?;
                Ok(Output::Progress {
                    progress: Progress::from_habits(&habits),
                })
            }
            Command::Categories => Ok(Output::Choices {
                categories: self.config.habits.categories.clone(),
                frequencies: self.config.habits.frequencies.clone(),
            }),
        }
    }
}

fn no_such_habit(id: i64) -> Output {
    Output::message(format!("No habit #{}.", id))
}
