//! On-disk layout for model snapshots and evaluation reports.

use serde::Serialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::EngineError;

/// Resolves and creates the data directory tree:
///
/// ```text
/// <root>/models/<name>.json
/// <root>/reports/<id>.json
/// ```
#[derive(Debug, Clone)]
pub struct ModelStore {
    root: PathBuf,
}

impl Default for ModelStore {
    fn default() -> Self {
        Self::new(Self::default_root())
    }
}

impl ModelStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `SENTIMENT_DATA_DIR` if set, otherwise `./data`.
    pub fn default_root() -> PathBuf {
        env::var("SENTIMENT_DATA_DIR")
            .ok()
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn models_dir(&self) -> PathBuf {
        self.root.join("models")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.root.join("reports")
    }

    pub fn snapshot_path(&self, name: &str) -> PathBuf {
        self.models_dir().join(format!("{}.json", name))
    }

    /// Creates the models and reports directories if missing.
    pub fn init(&self) -> Result<(), EngineError> {
        for dir in [self.models_dir(), self.reports_dir()] {
            if !dir.exists() {
                info!("Creating directory: {:?}", dir);
                fs::create_dir_all(&dir)?;
            }
        }
        Ok(())
    }

    /// Serializes `report` to `<root>/reports/<id>.json`.
    pub fn save_report<T: Serialize>(&self, id: &str, report: &T) -> Result<PathBuf, EngineError> {
        self.init()?;
        let path = self.reports_dir().join(format!("{}.json", id));
        write_atomic(&path, &serde_json::to_string_pretty(report)?)?;
        Ok(path)
    }
}

/// Writes `contents` to a sibling temp file, then renames it over `path`.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), EngineError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file_name = path
        .file_name()
        .ok_or_else(|| EngineError::InvalidInput(format!("Not a file path: {:?}", path)))?;
    let mut temp_name = file_name.to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    fs::write(&temp_path, contents)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout() {
        let store = ModelStore::new("/srv/sentiment");
        assert_eq!(
            store.snapshot_path("default"),
            PathBuf::from("/srv/sentiment/models/default.json")
        );
        assert_eq!(store.reports_dir(), PathBuf::from("/srv/sentiment/reports"));
    }

    #[test]
    fn test_init_creates_directories() {
        let temp = TempDir::new().unwrap();
        let store = ModelStore::new(temp.path().join("data"));
        store.init().unwrap();
        assert!(store.models_dir().is_dir());
        assert!(store.reports_dir().is_dir());
        // Idempotent
        store.init().unwrap();
    }

    #[test]
    fn test_write_atomic_replaces_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("model.json");

        write_atomic(&path, "{\"version\":1}").unwrap();
        write_atomic(&path, "{\"version\":2}").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"version\":2}");
        assert!(!path.with_file_name("model.json.tmp").exists());
    }

    #[test]
    fn test_save_report() {
        let temp = TempDir::new().unwrap();
        let store = ModelStore::new(temp.path());
        let path = store
            .save_report("abc", &serde_json::json!({"accuracy": 0.5}))
            .unwrap();
        assert!(path.ends_with("reports/abc.json"));
        assert!(fs::read_to_string(path).unwrap().contains("accuracy"));
    }

    #[test]
    fn test_default_root_from_env() {
        temp_env::with_var("SENTIMENT_DATA_DIR", Some("/tmp/sentiment-data"), || {
            assert_eq!(ModelStore::default_root(), PathBuf::from("/tmp/sentiment-data"));
        });
        temp_env::with_var_unset("SENTIMENT_DATA_DIR", || {
            assert_eq!(ModelStore::default_root(), PathBuf::from("data"));
        });
    }
}
