use super::keys::{BORROWER_PROGRESS_KEY, DEAL_PROGRESS_KEY};
use std::collections::BTreeMap;

pub type ProgressMap = BTreeMap<String, bool>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgressScope {
    Deal,
    Borrower,
}

impl ProgressScope {
    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "deal" => Ok(Self::Deal),
            "borrower" => Ok(Self::Borrower),
            _ => Err("progress scope must be one of: deal, borrower".to_string()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deal => "deal",
            Self::Borrower => "borrower",
        }
    }

    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Deal => DEAL_PROGRESS_KEY,
            Self::Borrower => BORROWER_PROGRESS_KEY,
        }
    }
}

pub fn decode_progress_map(raw: &str) -> Result<ProgressMap, serde_json::Error> {
    serde_json::from_str(raw)
}

pub fn encode_progress_map(map: &ProgressMap) -> Result<String, serde_json::Error> {
    serde_json::to_string(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_accepts_flat_bool_objects_only() {
        let map = decode_progress_map(r#"{"assets":true,"loan":false}"#).expect("decode");
        assert_eq!(map.get("assets"), Some(&true));
        assert_eq!(map.get("loan"), Some(&false));

        assert!(decode_progress_map("[true]").is_err());
        assert!(decode_progress_map(r#"{"assets":"yes"}"#).is_err());
        assert!(decode_progress_map("{not json").is_err());
    }

    #[test]
    fn scope_parse_maps_to_storage_keys() {
        assert_eq!(
            ProgressScope::parse("Deal").map(ProgressScope::storage_key),
            Ok("dealProgress")
        );
        assert_eq!(
            ProgressScope::parse("borrower").map(ProgressScope::storage_key),
            Ok("borrowerProgress")
        );
        assert!(ProgressScope::parse("loan").is_err());
    }
}
