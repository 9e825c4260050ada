use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Environment variable that overrides the data directory.
pub const HOME_ENV: &str = "TODDLER_MUSIC_HOME";
/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".toddler-music";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "library.sqlite";
const LOG_FILE_NAME: &str = "toddler-music.log";
const BACKUP_DIR_NAME: &str = "backups";

/// Filesystem layout of one library installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    data_dir: PathBuf,
}

impl Config {
    /// Resolve the data directory from `TODDLER_MUSIC_HOME`, falling back to
    /// `~/.toddler-music`.
    pub fn from_env() -> Result<Self> {
        match env::var_os(HOME_ENV) {
            Some(dir) if !dir.is_empty() => Ok(Self::with_data_dir(dir)),
            _ => {
                let base_dirs =
                    BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
                Ok(Self::with_data_dir(base_dirs.home_dir().join(DATA_DIR_NAME)))
            }
        }
    }

    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }

    /// Directory that exports are written into.
    pub fn backup_dir(&self) -> PathBuf {
        self.data_dir.join(BACKUP_DIR_NAME)
    }
}
