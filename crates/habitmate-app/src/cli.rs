//! CLI argument definitions for the HabitMate application.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use habitmate_core::config::HabitMateConfig;

/// HabitMate: track recurring habits per user.
#[derive(Parser, Debug)]
#[command(name = "habitmate", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the databases and the session file.
    #[arg(short = 'd', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    /// Print results as JSON.
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a new account.
    Register {
        username: String,
        #[arg(long, env = "HABITMATE_PASSWORD")]
        password: String,
    },
    /// Log in and remember the user for later commands.
    Login {
        username: String,
        #[arg(long, env = "HABITMATE_PASSWORD")]
        password: String,
    },
    /// Forget the logged-in user.
    Logout,
    /// Show the logged-in user.
    Whoami,
    /// Add a habit.
    Add {
        name: String,
        #[arg(short = 'f', long, default_value = "Daily")]
        frequency: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Defaults to the configured default category.
        #[arg(long)]
        category: Option<String>,
    },
    /// List habits, optionally narrowed by name (any case) and category.
    List {
        #[arg(short = 'q', long, default_value = "")]
        query: String,
        /// Category to show, or "All".
        #[arg(long, default_value = "All")]
        category: String,
    },
    /// Search stored habits by exact-case name fragment.
    Search {
        text: String,
        #[arg(long)]
        category: Option<String>,
    },
    /// Show one habit.
    Show { id: i64 },
    /// Mark a habit completed (or not, with --undo).
    Complete {
        id: i64,
        #[arg(long)]
        undo: bool,
    },
    /// Change fields of a habit.
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        frequency: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        completed: Option<bool>,
    },
    /// Delete a habit.
    Delete { id: i64 },
    /// Show completion progress.
    Progress,
    /// List the configured categories and frequencies.
    Categories,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > HABITMATE_CONFIG env var > platform default (~/.habitmate/config.toml).
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("HABITMATE_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the data directory.
    ///
    /// Priority: --data-dir flag > HABITMATE_DATA_DIR env var > config file value.
    pub fn resolve_data_dir(&self, config: &HabitMateConfig) -> PathBuf {
        if let Some(ref p) = self.data_dir {
            return p.clone();
        }
        if let Ok(p) = std::env::var("HABITMATE_DATA_DIR") {
            return PathBuf::from(p);
        }
        expand_home(&config.general.data_dir)
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config: &HabitMateConfig) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config.general.log_level.clone())
    }
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        return home_dir().join(rest);
    }
    PathBuf::from(path)
}

fn home_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
    #[cfg(not(target_os = "windows"))]
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    home_dir().join(".habitmate").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("habitmate").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_add_with_defaults() {
        let args = parse(&["add", "Morning run"]);
        assert_eq!(
            args.command,
            Command::Add {
                name: "Morning run".to_string(),
                frequency: "Daily".to_string(),
                description: String::new(),
                category: None,
            }
        );
        assert!(!args.json);
    }

    #[test]
    fn test_parse_list_filters() {
        let args = parse(&["list", "-q", "ru", "--category", "Health", "--json"]);
        assert_eq!(
            args.command,
            Command::List {
                query: "ru".to_string(),
                category: "Health".to_string(),
            }
        );
        assert!(args.json);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = parse(&["progress", "--data-dir", "/tmp/hm", "-l", "debug"]);
        assert_eq!(args.data_dir, Some(PathBuf::from("/tmp/hm")));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_parse_edit() {
        let args = parse(&["edit", "4", "--name", "Walk", "--completed", "true"]);
        match args.command {
            Command::Edit {
                id,
                name,
                completed,
                frequency,
                ..
            } => {
                assert_eq!(id, 4);
                assert_eq!(name.as_deref(), Some("Walk"));
                assert_eq!(completed, Some(true));
                assert_eq!(frequency, None);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_resolve_prefers_flags() {
        let args = parse(&[
            "whoami",
            "--config",
            "/etc/hm.toml",
            "--data-dir",
            "/data",
            "--log-level",
            "warn",
        ]);
        let config = HabitMateConfig::default();
        assert_eq!(args.resolve_config_path(), PathBuf::from("/etc/hm.toml"));
        assert_eq!(args.resolve_data_dir(&config), PathBuf::from("/data"));
        assert_eq!(args.resolve_log_level(&config), "warn");
    }

    #[test]
    fn test_resolve_log_level_falls_back_to_config() {
        let args = parse(&["whoami"]);
        let mut config = HabitMateConfig::default();
        config.general.log_level = "debug".to_string();
        assert_eq!(args.resolve_log_level(&config), "debug");
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
        let expanded = expand_home("~/.habitmate/data");
        assert!(expanded.ends_with(".habitmate/data"));
        assert!(!expanded.to_string_lossy().starts_with('~'));
    }
}
