use thiserror::Error;

/// Top-level error type for HabitMate.
///
/// Every variant renders a message that can be shown to the user as-is, so a
/// collaborator can tell a rejected input apart from an unavailable store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HabitError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input rejected before it reached the store (e.g. an empty habit name).
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The underlying database could not be opened, read or written.
    #[error("Storage unavailable: {0}")]
    Storage(String),

    #[error("User already exists: {username}")]
    DuplicateUser { username: String },

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl HabitError {
    /// Shorthand for wrapping a lower-level failure as a storage error with context.
    pub fn storage(context: &str, err: impl std::fmt::Display) -> Self {
        HabitError::Storage(format!("{}: {}", context, err))
    }
}

impl From<toml::de::Error> for HabitError {
    fn from(err: toml::de::Error) -> Self {
        HabitError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for HabitError {
    fn from(err: toml::ser::Error) -> Self {
        HabitError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for HabitError {
    fn from(err: serde_json::Error) -> Self {
        HabitError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for HabitMate operations.
pub type Result<T> = std::result::Result<T, HabitError>;
