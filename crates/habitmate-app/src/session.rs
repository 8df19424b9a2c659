//! Persisted login state.
//!
//! The logged-in username is kept in `session.toml` inside the data
//! directory so that later invocations act on behalf of the same owner.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use habitmate_core::error::Result;
use habitmate_core::types::Session;

const SESSION_FILE: &str = "session.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionRecord {
    username: String,
    logged_in_at: DateTime<Utc>,
}

/// The session file in one data directory.
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn in_dir(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The remembered session, or an anonymous one if nobody is logged in.
    ///
    /// An unreadable file is treated as logged out.
    pub fn load(&self) -> Session {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return Session::anonymous(),
        };
        match toml::from_str::<SessionRecord>(&content) {
            Ok(record) => {
                debug!(username = %record.username, since = %record.logged_in_at, "Session loaded");
                Session::new(record.username)
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring unreadable session file");
                Session::anonymous()
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let record = SessionRecord {
            username: session.current_owner().to_string(),
            logged_in_at: Utc::now(),
        };
        std::fs::write(&self.path, toml::to_string_pretty(&record)?)?;
        Ok(())
    }

    /// Remove the session file. Returns whether one existed.
    pub fn clear(&self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
