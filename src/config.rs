//! Application configuration
//! Defaults, then an optional JSON file, then environment variables; CLI flags are applied last by the binary

use crate::error::{DatamanError, Result};
use crate::services::storage::StorageKind;
use crate::utils::default_data_dir;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "DATAMAN_CONFIG";
pub const STORAGE_ENV: &str = "DATAMAN_STORAGE";
pub const DATA_DIR_ENV: &str = "DATAMAN_DATA_DIR";
pub const LOG_ENV: &str = "DATAMAN_LOG";

const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageKind,
    pub data_dir: PathBuf,
    /// Relative names resolve against `data_dir`
    pub json_file: PathBuf,
    pub sqlite_file: PathBuf,
    pub history_file: PathBuf,
    /// Explicit storage file, overrides the per-backend file names
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_path: Option<PathBuf>,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub default_set_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageKind::Json,
            data_dir: default_data_dir(),
            json_file: PathBuf::from("dataman.json"),
            sqlite_file: PathBuf::from("dataman.db"),
            history_file: PathBuf::from("user_history.json"),
            data_path: None,
            log_level: "warn".to_string(),
            log_file: None,
            default_set_name: "memory-bank".to_string(),
        }
    }
}

impl AppConfig {
    /// Load using the process environment
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_with(explicit, |key| std::env::var(key).ok())
    }

    /// Load with a custom environment lookup.
    ///
    /// An explicitly named file must exist; the `<data_dir>/config.json`
    /// fallback is only read when present.
    pub fn load_with<F>(explicit: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| env(CONFIG_ENV).filter(|v| !v.trim().is_empty()).map(PathBuf::from));

        let mut config = match named {
            Some(path) => Self::from_file(&path)?,
            None => {
                let data_dir = env(DATA_DIR_ENV)
                    .filter(|v| !v.trim().is_empty())
                    .map(PathBuf::from)
                    .unwrap_or_else(default_data_dir);
                let fallback = data_dir.join(CONFIG_FILE_NAME);
                if fallback.is_file() {
                    Self::from_file(&fallback)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env(env)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        log::debug!("read configuration from {}", path.display());
        Ok(config)
    }

    fn apply_env<F>(&mut self, env: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(kind) = env(STORAGE_ENV).filter(|v| !v.trim().is_empty()) {
            self.storage = kind.parse()?;
        }
        if let Some(dir) = env(DATA_DIR_ENV).filter(|v| !v.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(level) = env(LOG_ENV).filter(|v| !v.trim().is_empty()) {
            self.log_level = level;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.level_filter()?;
        if self.default_set_name.trim().is_empty() {
            return Err(DatamanError::validation("default_set_name must not be empty"));
        }
        Ok(())
    }

    pub fn level_filter(&self) -> Result<LevelFilter> {
        self.log_level.trim().parse().map_err(|_| {
            DatamanError::validation(format!("unknown log level '{}'", self.log_level))
        })
    }

    /// Raise the log level by `verbosity` steps above the configured one
    pub fn bump_log_level(&mut self, verbosity: u8) -> Result<()> {
        if verbosity == 0 {
            return Ok(());
        }
        let levels = LevelFilter::iter().collect::<Vec<_>>();
        let current = self.level_filter()?;
        let position = levels.iter().position(|l| *l == current).unwrap_or(0);
        let raised = levels[(position + usize::from(verbosity)).min(levels.len() - 1)];
        self.log_level = raised.as_str().to_ascii_lowercase();
        Ok(())
    }

    /// File used by the selected storage backend
    pub fn storage_path(&self) -> PathBuf {
        if let Some(path) = &self.data_path {
            return path.clone();
        }
        match self.storage {
            StorageKind::Json => self.data_dir.join(&self.json_file),
            StorageKind::Sqlite => self.data_dir.join(&self.sqlite_file),
        }
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(&self.history_file)
    }
}
