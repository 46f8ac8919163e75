use crate::config::{load_global_settings, WizardSettings};
use crate::state::{ApplicationState, ApplicationStateStore, ProgressMap};
use crate::storage::KeyValueStorage;
use serde_json::Value;
use std::fs;
use std::path::Path;

pub type CliStore = ApplicationStateStore<Box<dyn KeyValueStorage>>;

pub fn load_settings() -> Result<WizardSettings, String> {
    load_global_settings().map_err(|err| err.to_string())
}

pub fn open_store(settings: &WizardSettings) -> Result<CliStore, String> {
    let storage = settings.open_storage().map_err(|err| err.to_string())?;
    Ok(ApplicationStateStore::new(storage, settings.event_log()))
}

pub fn read_json_file(path: &str) -> Result<Value, String> {
    let path = Path::new(path);
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
    serde_json::from_str(&raw).map_err(|err| format!("invalid json in {}: {err}", path.display()))
}

pub fn parse_bool_arg(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        other => Err(format!("expected true or false, got `{other}`")),
    }
}

fn format_progress(map: Option<&ProgressMap>) -> String {
    match map {
        Some(map) => serde_json::to_string(map).unwrap_or_else(|_| "invalid".to_string()),
        None => "none".to_string(),
    }
}

pub fn format_state(state: &ApplicationState, loan_purpose: Option<&str>) -> String {
    let text = |value: &Option<String>| value.clone().unwrap_or_else(|| "none".to_string());
    [
        format!("applicationId={}", text(&state.deal_id)),
        format!("borrowerId={}", text(&state.borrower_id)),
        format!("coBorrowerId={}", text(&state.co_borrower_id)),
        format!("currentFormStep={}", text(&state.current_form_step)),
        format!("dealProgress={}", format_progress(state.deal_progress.as_ref())),
        format!(
            "borrowerProgress={}",
            format_progress(state.borrower_progress.as_ref())
        ),
        format!("loanPurpose={}", loan_purpose.unwrap_or("none")),
    ]
    .join("\n")
}
