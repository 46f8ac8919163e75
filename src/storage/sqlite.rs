use super::{KeyValueStorage, StorageArea, StorageError};
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};

/// Key/value entries in a SQLite table, one row per (area, key).
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    db_path: PathBuf,
    area: StorageArea,
}

impl SqliteStorage {
    pub fn open(db_path: &Path, area: StorageArea) -> Result<Self, StorageError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                    path: parent.display().to_string(),
                    source,
                })?;
            }
        }

        let storage = Self {
            db_path: db_path.to_path_buf(),
            area,
        };
        storage.ensure_schema()?;
        Ok(storage)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn sql_error(&self, source: rusqlite::Error) -> StorageError {
        StorageError::Sql {
            path: self.db_path.display().to_string(),
            source,
        }
    }

    fn connect(&self) -> Result<Connection, StorageError> {
        Connection::open(&self.db_path).map_err(|source| self.sql_error(source))
    }

    fn ensure_schema(&self) -> Result<(), StorageError> {
        let connection = self.connect()?;
        connection
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS kv_entries (
                    area TEXT NOT NULL,
                    key TEXT NOT NULL,
                    value TEXT NOT NULL,
                    updated_at INTEGER NOT NULL,
                    PRIMARY KEY (area, key)
                );
                ",
            )
            .map_err(|source| self.sql_error(source))
    }
}

impl KeyValueStorage for SqliteStorage {
    fn area(&self) -> StorageArea {
        self.area
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let connection = self.connect()?;
        connection
            .query_row(
                "SELECT value FROM kv_entries WHERE area = ?1 AND key = ?2",
                params![self.area.as_str(), key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|source| self.sql_error(source))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let connection = self.connect()?;
        connection
            .execute(
                "INSERT INTO kv_entries (area, key, value, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(area, key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at",
                params![
                    self.area.as_str(),
                    key,
                    value,
                    chrono::Utc::now().timestamp()
                ],
            )
            .map(|_| ())
            .map_err(|source| self.sql_error(source))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let connection = self.connect()?;
        connection
            .execute(
                "DELETE FROM kv_entries WHERE area = ?1 AND key = ?2",
                params![self.area.as_str(), key],
            )
            .map(|_| ())
            .map_err(|source| self.sql_error(source))
    }
}
