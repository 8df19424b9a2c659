//! HabitMate storage crate - SQLite persistence for habits and accounts.
//!
//! Provides the `Database` handle with schema migrations, the owner-scoped
//! `HabitRepository`, and the `AccountStore` that turns credentials into a
//! `Session`.

pub mod accounts;
pub mod db;
pub mod migrations;
pub mod repository;

pub use accounts::AccountStore;
pub use db::{Database, DbOptions};
pub use migrations::{FailedMigration, MigrationReport, SCHEMA_VERSION};
pub use repository::HabitRepository;
