use super::paths::{default_state_dir, expand_home};
use super::ConfigError;
use crate::api::{http::DEFAULT_API_BASE, HttpApplicationClient};
use crate::shared::EventLog;
use crate::storage::{
    JsonFileStorage, KeyValueStorage, MemoryStorage, SqliteStorage, StorageArea, StorageError,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const API_BASE_ENV: &str = "TAULEN_API_BASE";
pub const API_TOKEN_ENV: &str = "TAULEN_API_TOKEN";

const DEFAULT_SESSION_FILE: &str = "session.json";
const DEFAULT_SQLITE_FILE: &str = "session.db";
const DEFAULT_LOG_FILE: &str = "logs/wizard.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackendKind {
    Memory,
    #[default]
    File,
    Sqlite,
}

impl StorageBackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File => "file",
            Self::Sqlite => "sqlite",
        }
    }

    fn default_file_name(self) -> Option<&'static str> {
        match self {
            Self::Memory => None,
            Self::File => Some(DEFAULT_SESSION_FILE),
            Self::Sqlite => Some(DEFAULT_SQLITE_FILE),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StorageBackendKind,
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WizardSettings {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub log_path: Option<PathBuf>,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl Default for WizardSettings {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_token: None,
            storage: StorageSettings::default(),
            log_path: None,
        }
    }
}

impl WizardSettings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Non-empty values from `lookup` replace the file values.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let present = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(base) = present(API_BASE_ENV) {
            self.api_base = base.trim().to_string();
        }
        if let Some(token) = present(API_TOKEN_ENV) {
            self.api_token = Some(token.trim().to_string());
        }
    }

    /// Expands `~/` prefixes and fills in default locations under
    /// `~/.taulen` for paths the file left out.
    pub fn resolve_paths(&mut self) -> Result<(), ConfigError> {
        self.storage.path = match (&self.storage.path, self.storage.backend.default_file_name()) {
            (Some(path), _) => Some(expand_home(path)?),
            (None, Some(file_name)) => Some(default_state_dir()?.join(file_name)),
            (None, None) => None,
        };
        self.log_path = match &self.log_path {
            Some(path) => Some(expand_home(path)?),
            None => Some(default_state_dir()?.join(DEFAULT_LOG_FILE)),
        };
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.api_base.trim();
        if base.is_empty() {
            return Err(ConfigError::Invalid("`api_base` must be non-empty".to_string()));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "`api_base` must use http or https, got `{base}`"
            )));
        }
        if self.storage.backend != StorageBackendKind::Memory && self.storage.path.is_none() {
            return Err(ConfigError::Invalid(format!(
                "`storage.path` is required for the {} backend",
                self.storage.backend.as_str()
            )));
        }
        Ok(())
    }

    pub fn open_storage(&self) -> Result<Box<dyn KeyValueStorage>, StorageError> {
        let missing_path = || {
            StorageError::Unavailable(format!(
                "no path configured for the {} backend",
                self.storage.backend.as_str()
            ))
        };
        match self.storage.backend {
            StorageBackendKind::Memory => Ok(Box::new(MemoryStorage::session())),
            StorageBackendKind::File => {
                let path = self.storage.path.clone().ok_or_else(missing_path)?;
                Ok(Box::new(JsonFileStorage::new(path)))
            }
            StorageBackendKind::Sqlite => {
                let path = self.storage.path.as_deref().ok_or_else(missing_path)?;
                Ok(Box::new(SqliteStorage::open(path, StorageArea::Session)?))
            }
        }
    }

    pub fn api_client(&self) -> HttpApplicationClient {
        HttpApplicationClient::new(self.api_base.trim(), self.api_token.clone())
    }

    pub fn event_log(&self) -> EventLog {
        match &self.log_path {
            Some(path) => EventLog::to_file(path.clone()),
            None => EventLog::disabled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_fields_map_onto_settings() {
        let settings: WizardSettings = serde_yaml::from_str(
            r#"
api_base: https://api.example.test/v1
api_token: secret
storage:
  backend: memory
log_path: /tmp/wizard.log
"#,
        )
        .expect("parse settings");
        assert_eq!(settings.api_base, "https://api.example.test/v1");
        assert_eq!(settings.api_token.as_deref(), Some("secret"));
        assert_eq!(settings.storage.backend, StorageBackendKind::Memory);
        assert_eq!(settings.log_path, Some(PathBuf::from("/tmp/wizard.log")));
        settings.validate().expect("valid settings");
    }

    #[test]
    fn unknown_backend_is_a_parse_error() {
        let err = serde_yaml::from_str::<WizardSettings>("storage:\n  backend: redis\n")
            .expect_err("unknown backend");
        assert!(err.to_string().contains("redis"));
    }

    #[test]
    fn validation_rejects_non_http_base_and_missing_paths() {
        let mut settings = WizardSettings {
            api_base: "ftp://example.test".to_string(),
            ..WizardSettings::default()
        };
        let err = settings.validate().expect_err("ftp base");
        assert!(err.to_string().contains("http or https"));

        settings.api_base = "http://localhost:9000".to_string();
        settings.storage.backend = StorageBackendKind::Sqlite;
        let err = settings.validate().expect_err("sqlite needs a path");
        assert!(err.to_string().contains("storage.path"));

        settings.storage.backend = StorageBackendKind::Memory;
        settings.validate().expect("memory backend needs no path");
    }

    #[test]
    fn env_overrides_replace_values_and_ignore_blanks() {
        let mut settings = WizardSettings::default();
        settings.apply_env_overrides(|key| match key {
            API_BASE_ENV => Some(" https://override.test ".to_string()),
            API_TOKEN_ENV => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(settings.api_base, "https://override.test");
        assert!(settings.api_token.is_none());
    }

    #[test]
    fn memory_backend_opens_without_a_path() {
        let settings = WizardSettings {
            storage: StorageSettings {
                backend: StorageBackendKind::Memory,
                path: None,
            },
            ..WizardSettings::default()
        };
        let storage = settings.open_storage().expect("memory storage");
        storage.write("k", "v").expect("write");
        assert_eq!(storage.read("k").expect("read").as_deref(), Some("v"));
    }
}
