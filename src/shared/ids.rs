use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Checks a trimmed identifier. Ids end up in URL paths and query strings, so
/// only ASCII letters, digits, '-' and '_' are allowed.
pub fn validate_identifier_value(kind: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{kind} must be non-empty"));
    }
    match value
        .chars()
        .find(|ch| !(ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '_'))
    {
        Some(bad) => Err(format!(
            "{kind} `{value}` contains unsupported character `{bad}`"
        )),
        None => Ok(()),
    }
}

/// Server-assigned application (deal) id, kept in its string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ApplicationId(String);

impl ApplicationId {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        validate_identifier_value("application id", trimmed)?;
        Ok(Self(trimmed.to_string()))
    }

    /// Accepts the numeric or string `id` of an API payload.
    pub fn from_json(value: &Value) -> Option<Self> {
        identifier_from_json(value).and_then(|raw| Self::parse(&raw).ok())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ApplicationId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let raw = identifier_from_json(&value)
            .ok_or_else(|| D::Error::custom("application id must be a string or number"))?;
        Self::parse(&raw).map_err(D::Error::custom)
    }
}

/// Renders an API identifier (string or number) as the string form kept in storage.
pub fn identifier_from_json(value: &Value) -> Option<String> {
    match value {
        Value::String(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
