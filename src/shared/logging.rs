use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Append-only JSON-lines event log. A disabled log drops every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    path: Option<PathBuf>,
}

impl EventLog {
    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn info(&self, event: &str, message: &str) {
        self.record(LogLevel::Info, event, message, &[]);
    }

    pub fn warn(&self, event: &str, message: &str) {
        self.record(LogLevel::Warn, event, message, &[]);
    }

    pub fn error(&self, event: &str, message: &str) {
        self.record(LogLevel::Error, event, message, &[]);
    }

    pub fn record(&self, level: LogLevel, event: &str, message: &str, fields: &[(&str, Value)]) {
        let Some(path) = self.path.as_deref() else {
            return;
        };
        let _ = append_event_line(path, level, event, message, fields);
    }
}

fn append_event_line(
    path: &Path,
    level: LogLevel,
    event: &str,
    message: &str,
    fields: &[(&str, Value)],
) -> std::io::Result<()> {
    let mut payload = Map::new();
    payload.insert(
        "timestamp".to_string(),
        Value::String(chrono::Utc::now().to_rfc3339()),
    );
    payload.insert("level".to_string(), Value::from(level.as_str()));
    payload.insert("event".to_string(), Value::from(event));
    payload.insert("message".to_string(), Value::from(message));
    for (key, value) in fields {
        payload.insert((*key).to_string(), value.clone());
    }

    let line = serde_json::to_string(&payload)
        .map_err(|source| std::io::Error::other(source.to_string()))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    writeln!(file, "{line}")
}
