use super::{KeyValueStorage, StorageArea, StorageError};
use crate::shared::write_file_atomically;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Keeps one storage area as a flat JSON object on disk. Every write rewrites
/// the whole file through an atomic rename.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
    area: StorageArea,
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn json_error(path: &Path, source: serde_json::Error) -> StorageError {
    StorageError::Json {
        path: path.display().to_string(),
        source,
    }
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            area: StorageArea::Session,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = fs::read_to_string(&self.path).map_err(|e| io_error(&self.path, e))?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|e| json_error(&self.path, e))
    }

    fn store(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let body = serde_json::to_vec_pretty(entries).map_err(|e| json_error(&self.path, e))?;
        write_file_atomically(&self.path, &body).map_err(|e| io_error(&self.path, e))
    }
}

impl KeyValueStorage for JsonFileStorage {
    fn area(&self) -> StorageArea {
        self.area
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.store(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.load()?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.store(&entries)
    }
}
