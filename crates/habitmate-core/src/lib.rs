//! HabitMate core: the habit record, the in-memory filter, progress
//! summaries, configuration and the shared error type.

pub mod config;
pub mod error;
pub mod filter;
pub mod progress;
pub mod types;

pub use config::HabitMateConfig;
pub use error::{HabitError, Result};
pub use filter::{filter, CategoryFilter, HabitFilter};
pub use progress::{Motivation, Progress};
pub use types::*;
