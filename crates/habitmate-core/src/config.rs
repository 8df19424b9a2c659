use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{HabitError, Result};
use crate::types::DEFAULT_CATEGORY;

/// Top-level configuration for HabitMate.
///
/// Loaded from `~/.habitmate/config.toml` by default. Missing sections and
/// fields fall back to their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HabitMateConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub habits: HabitsConfig,
}

impl HabitMateConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: HabitMateConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| HabitError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory holding the databases and the session file.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.habitmate/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Database file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Habit database file name, relative to the data directory.
    pub habits_db: String,
    /// Account database file name, relative to the data directory.
    pub accounts_db: String,
    /// Put databases in WAL journal mode.
    pub wal: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            habits_db: "habittracker.db".to_string(),
            accounts_db: "accounts.db".to_string(),
            wal: true,
        }
    }
}

/// Choices offered when creating or editing habits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HabitsConfig {
    /// Category used when none is given.
    pub default_category: String,
    pub categories: Vec<String>,
    /// Suggested frequency labels. Frequency stays free-form.
    pub frequencies: Vec<String>,
}

impl Default for HabitsConfig {
    fn default() -> Self {
        Self {
            default_category: DEFAULT_CATEGORY.to_string(),
            categories: ["General", "Health", "Work", "Personal", "Study"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            frequencies: ["Daily", "Weekly", "Monthly"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = HabitMateConfig::default();
        assert_eq!(config.general.data_dir, "~/.habitmate/data");
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.storage.habits_db, "habittracker.db");
        assert_eq!(config.storage.accounts_db, "accounts.db");
        assert!(config.storage.wal);
        assert_eq!(config.habits.default_category, "General");
        assert!(config.habits.categories.contains(&"Health".to_string()));
        assert_eq!(config.habits.frequencies, vec!["Daily", "Weekly", "Monthly"]);
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
[general]
data_dir = "/custom/data"
log_level = "debug"

[storage]
habits_db = "h.db"
accounts_db = "a.db"
wal = false

[habits]
default_category = "Misc"
categories = ["Misc", "Fitness"]
frequencies = ["Daily"]
"#;
        let file = create_temp_config(content);
        let config = HabitMateConfig::load(file.path()).unwrap();
        assert_eq!(config.general.data_dir, "/custom/data");
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.storage.habits_db, "h.db");
        assert!(!config.storage.wal);
        assert_eq!(config.habits.default_category, "Misc");
        assert_eq!(config.habits.categories, vec!["Misc", "Fitness"]);
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let content = r#"
[general]
log_level = "warn"
"#;
        let file = create_temp_config(content);
        let config = HabitMateConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.general.data_dir, "~/.habitmate/data");
        assert_eq!(config.storage.habits_db, "habittracker.db");
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let file = create_temp_config("");
        let config = HabitMateConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.habits.default_category, "General");
    }

    #[test]
    fn test_load_invalid_toml() {
        let file = create_temp_config("this is {{ not valid TOML");
        let err = HabitMateConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, HabitError::Config(_)));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = HabitMateConfig::load_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.general.data_dir, "~/.habitmate/data");
    }

    #[test]
    fn test_save_creates_parent_dirs_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.toml");

        let mut config = HabitMateConfig::default();
        config.general.log_level = "trace".to_string();
        config.save(&path).unwrap();

        assert!(path.exists());
        let reloaded = HabitMateConfig::load(&path).unwrap();
        assert_eq!(reloaded.general.log_level, "trace");
        assert_eq!(reloaded.habits.categories, config.habits.categories);
    }
}
