use super::{KeyValueStorage, StorageArea, StorageError};
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Debug)]
pub struct MemoryStorage {
    area: StorageArea,
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new(area: StorageArea) -> Self {
        Self {
            area,
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn session() -> Self {
        Self::new(StorageArea::Session)
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .keys()
            .cloned()
            .collect()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::session()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn area(&self) -> StorageArea {
        self.area
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(|err| err.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(|err| err.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(|err| err.into_inner());
        entries.remove(key);
        Ok(())
    }
}

/// Storage that is disabled or over quota: every operation fails.
#[derive(Debug, Clone)]
pub struct UnavailableStorage {
    area: StorageArea,
    reason: String,
}

impl UnavailableStorage {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            area: StorageArea::Session,
            reason: reason.into(),
        }
    }
}

impl KeyValueStorage for UnavailableStorage {
    fn area(&self) -> StorageArea {
        self.area
    }

    fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable(self.reason.clone()))
    }

    fn write(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable(self.reason.clone()))
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable(self.reason.clone()))
    }
}
