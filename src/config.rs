//! File locations, input ranges, and the small settings file that remembers
//! which page was open when the app last exited.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{StoreError, StoreResult};

/// Folder name used beneath the user's home directory for application data.
pub const DATA_DIR_NAME: &str = ".beck-tracker";
/// SQLite file name, both in the data directory and for the optional seed copy.
pub const DB_FILE_NAME: &str = "beck_tracker.sqlite";
pub const SETTINGS_FILE_NAME: &str = "settings.yaml";
pub const LOG_DIR_NAME: &str = "logs";
pub const LOG_FILE_PREFIX: &str = "beck-tracker.log";

/// Inclusive range accepted by every questionnaire item.
pub const SCORE_MIN: i64 = 0;
pub const SCORE_MAX: i64 = 3;

/// chrono formats for the stored `beck_date` / `beck_time` text.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Resolve `~/.beck-tracker`.
pub fn data_dir() -> StoreResult<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or(StoreError::HomeDirUnavailable)?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

pub fn db_path() -> StoreResult<PathBuf> {
    Ok(data_dir()?.join(DB_FILE_NAME))
}

/// A database shipped next to the program, copied into place on first run.
pub fn seed_db_path() -> PathBuf {
    env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(DB_FILE_NAME)
}

pub fn settings_path() -> StoreResult<PathBuf> {
    Ok(data_dir()?.join(SETTINGS_FILE_NAME))
}

/// Persisted UI preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Index of the page that was active on exit (0 = input, 1 = data).
    #[serde(default)]
    pub last_page: usize,
}

impl Settings {
    /// Read settings, falling back to defaults when the file is missing or
    /// cannot be parsed.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(path)
            .context("failed to read settings file")
            .and_then(|raw| serde_yaml::from_str::<Settings>(&raw).context("failed to parse settings file"))
        {
            Ok(settings) => settings,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("failed to create settings directory")?;
        }
        let yaml = serde_yaml::to_string(self).context("failed to serialize settings")?;
        fs::write(path, yaml).context("failed to write settings file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn settings_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE_NAME);

        Settings { last_page: 1 }.save(&path).unwrap();
        assert_eq!(Settings::load(&path), Settings { last_page: 1 });
    }

    #[test]
    fn missing_settings_use_defaults() {
        let dir = tempdir().unwrap();
        let settings = Settings::load(&dir.path().join(SETTINGS_FILE_NAME));
        assert_eq!(settings.last_page, 0);
    }

    #[test]
    fn corrupt_settings_use_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, "last_page: [not, a, number]").unwrap();

        assert_eq!(Settings::load(&path), Settings::default());
    }
}
