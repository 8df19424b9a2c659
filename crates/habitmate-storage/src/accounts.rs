//! User accounts: registration and credential checks.
//!
//! Accounts live in their own database file, separate from habits. A
//! successful login yields the [`Session`] whose owner scopes every habit
//! call. Passwords are kept as salted SHA-256 digests.

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension;
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use uuid::Uuid;

use habitmate_core::error::{HabitError, Result};
use habitmate_core::types::Session;

use crate::db::{Database, DbOptions};

/// Store of registered users.
#[derive(Debug)]
pub struct AccountStore {
    db: Database,
}

impl AccountStore {
    /// Open (or create) the account database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        Self::with_options(path, DbOptions::default())
    }

    pub fn with_options(path: &Path, options: DbOptions) -> Result<Self> {
        let store = Self {
            db: Database::open_raw(path, options)?,
        };
        store.ensure_schema()?;
        info!("Account store opened at {}", path.display());
        Ok(store)
    }

    /// Open a private in-memory account store (for testing).
    pub fn in_memory() -> Result<Self> {
        let store = Self {
            db: Database::in_memory_raw()?,
        };
        store.ensure_schema()?;
        Ok(store)
    }

    fn ensure_schema(&self) -> Result<()> {
        self.db.with_conn(|conn| {
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS users (
                    username       TEXT PRIMARY KEY NOT NULL,
                    password_hash  TEXT NOT NULL,
                    salt           TEXT NOT NULL,
                    created_at     INTEGER NOT NULL
                );",
            )
            .map_err(|e| HabitError::storage("Failed to create users table", e))
        })
    }

    /// Register a new user.
    ///
    /// Username and password are trimmed and must be non-empty. A username
    /// that is already taken fails with [`HabitError::DuplicateUser`].
    pub fn register(&self, username: &str, password: &str) -> Result<()> {
        let (username, password) = normalize_credentials(username, password)?;
        let salt = Uuid::new_v4().simple().to_string();
        let hash = hash_password(&salt, password);

        self.db.with_conn(|conn| {
            let inserted = conn
                .execute(
                    "INSERT OR IGNORE INTO users (username, password_hash, salt, created_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    rusqlite::params![username, hash, salt, Utc::now().timestamp()],
                )
                .map_err(|e| HabitError::storage("Failed to register user", e))?;

            if inserted == 0 {
                return Err(HabitError::DuplicateUser {
                    username: username.to_string(),
                });
            }
            info!(username, "User registered");
            Ok(())
        })
    }

    /// Check credentials and return a session for the user.
    ///
    /// Unknown users and wrong passwords both fail with
    /// [`HabitError::InvalidCredentials`].
    pub fn verify(&self, username: &str, password: &str) -> Result<Session> {
        let (username, password) = normalize_credentials(username, password)?;

        let stored: Option<(String, String)> = self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT password_hash, salt FROM users WHERE username = ?1",
                rusqlite::params![username],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| HabitError::storage("Failed to look up user", e))
        })?;

        match stored {
            Some((hash, salt)) if hash == hash_password(&salt, password) => {
                debug!(username, "Credentials verified");
                Ok(Session::new(username))
            }
            _ => Err(HabitError::InvalidCredentials),
        }
    }

    pub fn exists(&self, username: &str) -> Result<bool> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM users WHERE username = ?1",
                    rusqlite::params![username.trim()],
                    |row| row.get(0),
                )
                .map_err(|e| HabitError::storage("Failed to look up user", e))?;
            Ok(count > 0)
        })
    }
}

fn normalize_credentials<'a>(username: &'a str, password: &'a str) -> Result<(&'a str, &'a str)> {
    let username = username.trim();
    let password = password.trim();
    if username.is_empty() || password.is_empty() {
        return Err(HabitError::Validation(
            "username and password must not be empty".to_string(),
        ));
    }
    Ok((username, password))
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_verify() {
        let store = AccountStore::in_memory().unwrap();
        store.register("alice", "s3cret").unwrap();

        let session = store.verify("alice", "s3cret").unwrap();
        assert_eq!(session.current_owner(), "alice");
        assert!(store.exists("alice").unwrap());
    }

    #[test]
    fn test_register_duplicate_is_distinct_error() {
        let store = AccountStore::in_memory().unwrap();
        store.register("alice", "one").unwrap();

        let err = store.register("alice", "two").unwrap_err();
        match err {
            HabitError::DuplicateUser { username } => assert_eq!(username, "alice"),
            other => panic!("expected DuplicateUser, got {:?}", other),
        }
        // The original password still works.
        assert!(store.verify("alice", "one").is_ok());
    }

    #[test]
    fn test_input_is_trimmed() {
        let store = AccountStore::in_memory().unwrap();
        store.register("  bob ", " pw ").unwrap();
        assert_eq!(store.verify("bob", "pw").unwrap().current_owner(), "bob");
        assert!(matches!(
            store.register("bob", "other"),
            Err(HabitError::DuplicateUser { .. })
        ));
    }

    #[test]
    fn test_empty_fields_rejected() {
        let store = AccountStore::in_memory().unwrap();
        for (u, p) in [("", "pw"), ("alice", ""), ("   ", "pw"), ("alice", "  ")] {
            assert!(matches!(
                store.register(u, p),
                Err(HabitError::Validation(_))
            ));
            assert!(matches!(store.verify(u, p), Err(HabitError::Validation(_))));
        }
    }

    #[test]
    fn test_wrong_password_and_unknown_user() {
        let store = AccountStore::in_memory().unwrap();
        store.register("alice", "right").unwrap();

        assert!(matches!(
            store.verify("alice", "wrong"),
            Err(HabitError::InvalidCredentials)
        ));
        assert!(matches!(
            store.verify("nobody", "right"),
            Err(HabitError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_passwords_are_not_stored_in_plaintext() {
        let store = AccountStore::in_memory().unwrap();
        store.register("alice", "hunter2").unwrap();
        store.register("bob", "hunter2").unwrap();

        let hashes: Vec<String> = store
            .db
            .with_conn(|conn| {
                let mut stmt = conn
                    .prepare("SELECT password_hash FROM users ORDER BY username")
                    .map_err(|e| HabitError::Storage(e.to_string()))?;
                let rows = stmt
                    .query_map([], |row| row.get(0))
                    .map_err(|e| HabitError::Storage(e.to_string()))?;
                rows.collect::<rusqlite::Result<Vec<String>>>()
                    .map_err(|e| HabitError::Storage(e.to_string()))
            })
            .unwrap();

        assert_eq!(hashes.len(), 2);
        assert!(hashes.iter().all(|h| h != "hunter2" && h.len() == 64));
        // Different salts give different digests for the same password.
        assert_ne!(hashes[0], hashes[1]);
    }

    #[test]
    fn test_file_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.db");
        AccountStore::open(&path)
            .unwrap()
            .register("alice", "pw")
            .unwrap();

        let reopened = AccountStore::open(&path).unwrap();
        assert!(reopened.verify("alice", "pw").is_ok());
    }
}
