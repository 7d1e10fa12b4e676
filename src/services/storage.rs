// Storage service
// Problem set persistence behind one trait, with JSON and SQLite backends

use crate::error::{DatamanError, Result};
use crate::models::ProblemSet;
use crate::services::sqlite::SqliteStorage;
use crate::utils::ensure_parent_dir;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Whole-set persistence for problem sets, keyed by name
pub trait ProblemSetStore {
    /// Insert or replace the set with the same name
    fn save(&mut self, set: &ProblemSet) -> Result<()>;

    fn load(&self, name: &str) -> Result<ProblemSet>;

    fn delete(&mut self, name: &str) -> Result<()>;

    /// Stored set names in ascending order
    fn list(&self) -> Result<Vec<String>>;

    fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.list()?.iter().any(|n| n == name))
    }
}

/// Available storage backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Json,
    Sqlite,
}

impl StorageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKind::Json => "json",
            StorageKind::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageKind {
    type Err = DatamanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(StorageKind::Json),
            "sqlite" | "db" => Ok(StorageKind::Sqlite),
            other => Err(DatamanError::validation(format!(
                "unknown storage type '{}', expected json or sqlite",
                other
            ))),
        }
    }
}

/// Storage type names with a short description
pub fn available_storage_types() -> Vec<(StorageKind, &'static str)> {
    vec![
        (StorageKind::Json, "JSON file storage"),
        (StorageKind::Sqlite, "SQLite database storage"),
    ]
}

/// Open the backend of the given kind at `path`
pub fn open_storage(kind: StorageKind, path: &Path) -> Result<Box<dyn ProblemSetStore>> {
    log::debug!("opening {} storage at {}", kind, path.display());
    match kind {
        StorageKind::Json => Ok(Box::new(JsonStorage::open(path)?)),
        StorageKind::Sqlite => Ok(Box::new(SqliteStorage::open(path)?)),
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct JsonDocument {
    #[serde(default)]
    problem_sets: BTreeMap<String, ProblemSet>,
}

/// JSON file holding every set in one document
#[derive(Debug)]
pub struct JsonStorage {
    path: PathBuf,
    document: JsonDocument,
}

impl JsonStorage {
    /// Open the file, or start empty when it does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let document = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                JsonDocument::default()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            JsonDocument::default()
        };

        Ok(Self { path, document })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self) -> Result<()> {
        ensure_parent_dir(&self.path)?;

        let content = serde_json::to_string_pretty(&self.document)?;
        fs::write(&self.path, content)?;
        log::debug!(
            "wrote {} problem set(s) to {}",
            self.document.problem_sets.len(),
            self.path.display()
        );
        Ok(())
    }
}

impl ProblemSetStore for JsonStorage {
    fn save(&mut self, set: &ProblemSet) -> Result<()> {
        let name = set.name().to_string();
        let previous = self.document.problem_sets.insert(name.clone(), set.clone());
        if let Err(e) = self.write() {
            // keep memory in line with the file
            match previous {
                Some(previous) => self.document.problem_sets.insert(name, previous),
                None => self.document.problem_sets.remove(&name),
            };
            return Err(e);
        }
        Ok(())
    }

    fn load(&self, name: &str) -> Result<ProblemSet> {
        self.document
            .problem_sets
            .get(name)
            .cloned()
            .ok_or_else(|| DatamanError::not_found(format!("problem set '{}'", name)))
    }

    fn delete(&mut self, name: &str) -> Result<()> {
        let removed = self
            .document
            .problem_sets
            .remove(name)
            .ok_or_else(|| DatamanError::not_found(format!("problem set '{}'", name)))?;
        if let Err(e) = self.write() {
            self.document.problem_sets.insert(name.to_string(), removed);
            return Err(e);
        }
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>> {
        Ok(self.document.problem_sets.keys().cloned().collect())
    }

    fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.document.problem_sets.contains_key(name))
    }
}
