//! Database handle management.
//!
//! A `Database` remembers where the SQLite data lives and opens a fresh
//! connection for every operation; nothing is held open between calls. The
//! in-memory variant keeps one idle anchor connection so the shared-cache
//! database survives between those short-lived connections.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::{debug, info};
use uuid::Uuid;

use habitmate_core::error::{HabitError, Result};

use crate::migrations::{self, MigrationReport};

/// Where the database lives.
enum Location {
    File(PathBuf),
    Memory {
        uri: String,
        // Never used; dropping it would discard the in-memory database.
        _anchor: Mutex<Connection>,
    },
}

/// Options applied when a database is opened.
#[derive(Debug, Clone, Copy)]
pub struct DbOptions {
    /// Switch file databases to WAL journal mode.
    pub wal: bool,
}

impl Default for DbOptions {
    fn default() -> Self {
        Self { wal: true }
    }
}

/// Handle on the habit database.
pub struct Database {
    location: Location,
    report: MigrationReport,
}

impl Database {
    /// Open (or create) the habit database at the given path with default
    /// options, bringing its schema up to date.
    pub fn new(path: &Path) -> Result<Self> {
        Self::with_options(path, DbOptions::default())
    }

    /// Open (or create) the habit database at the given path.
    pub fn with_options(path: &Path, options: DbOptions) -> Result<Self> {
        let location = open_file(path, options)?;
        let report = run_migrations(&location)?;
        info!("Database opened at {}", path.display());
        Ok(Self { location, report })
    }

    /// Open a private in-memory database (for testing).
    pub fn in_memory() -> Result<Self> {
        let location = open_memory()?;
        let report = run_migrations(&location)?;
        Ok(Self { location, report })
    }

    /// Open a database at `path` without applying the habit schema.
    ///
    /// Used by stores that manage their own tables.
    pub(crate) fn open_raw(path: &Path, options: DbOptions) -> Result<Self> {
        Ok(Self {
            location: open_file(path, options)?,
            report: MigrationReport::default(),
        })
    }

    /// In-memory counterpart of [`open_raw`](Self::open_raw).
    pub(crate) fn in_memory_raw() -> Result<Self> {
        Ok(Self {
            location: open_memory()?,
            report: MigrationReport::default(),
        })
    }

    /// Outcome of the schema upgrade performed when this handle was opened.
    pub fn migration_report(&self) -> &MigrationReport {
        &self.report
    }

    /// Path of the database file, or `None` for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            Location::File(path) => Some(path),
            Location::Memory { .. } => None,
        }
    }

    /// Open a new connection to this database.
    pub fn connect(&self) -> Result<Connection> {
        connect(&self.location)
    }

    /// Execute a closure against a freshly opened connection.
    ///
    /// The connection is closed when the closure returns, so each call is
    /// an independent unit with no state carried over.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.connect()?;
        f(&conn)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("Database");
        match &self.location {
            Location::File(path) => s.field("path", path),
            Location::Memory { uri, .. } => s.field("uri", uri),
        };
        s.finish()
    }
}

fn open_file(path: &Path, options: DbOptions) -> Result<Location> {
    // Ensure parent directory exists.
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let location = Location::File(path.to_path_buf());
    let conn = connect(&location)?;
    if options.wal {
        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .map_err(|e| HabitError::storage("Failed to set journal mode", e))?;
    }
    Ok(location)
}

fn open_memory() -> Result<Location> {
    let uri = format!(
        "file:habitmate-{}?mode=memory&cache=shared",
        Uuid::new_v4().simple()
    );
    let anchor = Connection::open(&uri)
        .map_err(|e| HabitError::storage("Failed to open in-memory db", e))?;
    Ok(Location::Memory {
        uri,
        _anchor: Mutex::new(anchor),
    })
}

fn connect(location: &Location) -> Result<Connection> {
    let conn = match location {
        Location::File(path) => Connection::open(path),
        Location::Memory { uri, .. } => Connection::open(uri),
    }
    .map_err(|e| HabitError::storage("Failed to open database", e))?;

    if let Location::File(_) = location {
        conn.execute_batch("PRAGMA synchronous = NORMAL;")
            .map_err(|e| HabitError::storage("Failed to set pragmas", e))?;
    }
    debug!("Database connection opened");
    Ok(conn)
}

fn run_migrations(location: &Location) -> Result<MigrationReport> {
    let conn = connect(location)?;
    migrations::run_migrations(&conn)
}
