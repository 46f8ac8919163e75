pub mod file;
pub mod memory;
pub mod sqlite;
pub mod tabs;

pub use file::JsonFileStorage;
pub use memory::{MemoryStorage, UnavailableStorage};
pub use sqlite::SqliteStorage;
pub use tabs::{ListenerGuard, SharedStorage, TabId, TabStorage};

use std::sync::Arc;

/// Which storage area a backend represents. Application state lives in the
/// session area; cross-tab events carry the area so listeners can filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageArea {
    Session,
    Local,
}

impl StorageArea {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::Local => "local",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage is unavailable: {0}")]
    Unavailable(String),
    #[error("failed to access storage file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid storage file {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("sqlite storage at {path} failed: {source}")]
    Sql {
        path: String,
        #[source]
        source: rusqlite::Error,
    },
}

/// Durable string key/value storage.
pub trait KeyValueStorage {
    fn area(&self) -> StorageArea;
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for Arc<T> {
    fn area(&self) -> StorageArea {
        (**self).area()
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for Box<T> {
    fn area(&self) -> StorageArea {
        (**self).area()
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// A change made to shared storage by another tab. `key` is `None` when the
/// whole area was wiped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: Option<String>,
    pub area: StorageArea,
}

pub type StorageListener = Arc<dyn Fn(&StorageEvent) + Send + Sync>;

/// Source of cross-tab change events. Listeners stay registered until the
/// returned guard is dropped.
pub trait ChangeFeed {
    fn listen(&self, listener: StorageListener) -> ListenerGuard;
}
