use super::keys::{
    ALL_STATE_KEYS, BORROWER_ID_KEY, CO_BORROWER_ID_KEY, CURRENT_FORM_STEP_KEY, DEAL_ID_KEY,
    LOAN_PURPOSE_KEY,
};
use super::progress_map::{decode_progress_map, encode_progress_map, ProgressMap, ProgressScope};
use crate::shared::{identifier_from_json, EventLog, LogLevel};
use crate::storage::{ChangeFeed, KeyValueStorage, ListenerGuard, StorageEvent};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Typed view over the session keys. Absent fields are `None`; an all-`None`
/// state means no application is in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationState {
    pub deal_id: Option<String>,
    pub borrower_id: Option<String>,
    pub co_borrower_id: Option<String>,
    pub current_form_step: Option<String>,
    pub deal_progress: Option<ProgressMap>,
    pub borrower_progress: Option<ProgressMap>,
}

impl ApplicationState {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn progress(&self, scope: ProgressScope) -> Option<&ProgressMap> {
        match scope {
            ProgressScope::Deal => self.deal_progress.as_ref(),
            ProgressScope::Borrower => self.borrower_progress.as_ref(),
        }
    }
}

/// Per-tab application state backed by durable key/value storage.
///
/// Every setter writes through immediately and returns the refreshed state,
/// which is how same-tab callers observe their own changes. Changes made by
/// other tabs reach observers registered with [`ApplicationStateStore::subscribe`].
///
/// Scalar setters trim their value. A blank value removes the field, so a
/// write always reads back as what was stored.
///
/// When the storage backend fails, writes are dropped and reads come back
/// absent; the failure is logged and never surfaced to the caller.
///
/// `update_progress` is a read-modify-write of the whole map. Two tabs
/// updating different sections at the same time can lose one of the updates.
pub struct ApplicationStateStore<S> {
    storage: Arc<S>,
    log: EventLog,
}

impl<S: KeyValueStorage> ApplicationStateStore<S> {
    pub fn new(storage: S, log: EventLog) -> Self {
        Self::from_shared(Arc::new(storage), log)
    }

    pub fn from_shared(storage: Arc<S>, log: EventLog) -> Self {
        Self { storage, log }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn get(&self) -> ApplicationState {
        read_state(self.storage.as_ref(), &self.log)
    }

    pub fn set_deal_id(&self, deal_id: &str) -> ApplicationState {
        self.write_text(DEAL_ID_KEY, deal_id);
        self.get()
    }

    pub fn set_borrower_id(&self, borrower_id: &str) -> ApplicationState {
        self.write_text(BORROWER_ID_KEY, borrower_id);
        self.get()
    }

    pub fn set_co_borrower_id(&self, co_borrower_id: &str) -> ApplicationState {
        self.write_text(CO_BORROWER_ID_KEY, co_borrower_id);
        self.get()
    }

    pub fn set_current_form_step(&self, form_step: &str) -> ApplicationState {
        self.write_text(CURRENT_FORM_STEP_KEY, form_step);
        self.get()
    }

    pub fn set_loan_purpose(&self, loan_purpose: &str) {
        self.write_text(LOAN_PURPOSE_KEY, loan_purpose);
    }

    pub fn loan_purpose(&self) -> Option<String> {
        read_text(self.storage.as_ref(), &self.log, LOAN_PURPOSE_KEY)
    }

    /// Drops the deal id alone, used when the server no longer knows it.
    pub fn forget_deal_id(&self) -> ApplicationState {
        self.remove_key(DEAL_ID_KEY);
        self.get()
    }

    pub fn update_progress(
        &self,
        scope: ProgressScope,
        section: &str,
        completed: bool,
    ) -> ApplicationState {
        let storage = self.storage.as_ref();
        if read_text(storage, &self.log, DEAL_ID_KEY).is_none() {
            self.log.record(
                LogLevel::Warn,
                "store.orphan_progress",
                "progress updated without an active deal id",
                &[
                    ("scope", Value::from(scope.as_str())),
                    ("section", Value::from(section)),
                ],
            );
        }
        let mut map = read_progress(storage, &self.log, scope).unwrap_or_default();
        map.insert(section.to_string(), completed);
        self.write_progress(scope, &map);
        self.get()
    }

    /// Copies whatever identifiers an API response carries. Fields missing
    /// from the payload keep their stored value; nothing is ever cleared.
    pub fn sync_from_api(&self, payload: &Value) -> ApplicationState {
        if let Some(deal_id) = payload.get("id").and_then(identifier_from_json) {
            self.write_key(DEAL_ID_KEY, &deal_id);
        }

        let borrower_id = payload
            .get("borrower")
            .and_then(|borrower| borrower.get("id"))
            .and_then(identifier_from_json)
            .or_else(|| payload.get("borrowerId").and_then(identifier_from_json));
        if let Some(borrower_id) = borrower_id {
            self.write_key(BORROWER_ID_KEY, &borrower_id);
        }

        let co_borrower_id = payload
            .get("coBorrower")
            .and_then(|co_borrower| co_borrower.get("id"))
            .and_then(identifier_from_json)
            .or_else(|| payload.get("coBorrowerId").and_then(identifier_from_json));
        if let Some(co_borrower_id) = co_borrower_id {
            self.write_key(CO_BORROWER_ID_KEY, &co_borrower_id);
        }

        if let Some(Value::String(step)) = payload.get("currentFormStep") {
            if !step.trim().is_empty() {
                self.write_key(CURRENT_FORM_STEP_KEY, step.trim());
            }
        }

        self.get()
    }

    /// Replaces the deal progress map with the `sections` object of a
    /// progress response. Non-boolean entries are skipped.
    pub fn sync_progress_from_api(&self, payload: &Value) -> ApplicationState {
        if let Some(Value::Object(sections)) = payload.get("sections") {
            let map: ProgressMap = sections
                .iter()
                .filter_map(|(section, done)| done.as_bool().map(|done| (section.clone(), done)))
                .collect();
            self.write_progress(ProgressScope::Deal, &map);
        }
        self.get()
    }

    pub fn clear(&self) -> ApplicationState {
        for key in ALL_STATE_KEYS {
            self.remove_key(key);
        }
        self.get()
    }

    fn write_progress(&self, scope: ProgressScope, map: &ProgressMap) {
        match encode_progress_map(map) {
            Ok(encoded) => self.write_key(scope.storage_key(), &encoded),
            Err(err) => self.log.error(
                "store.encode_progress",
                &format!("failed to encode {} progress: {err}", scope.as_str()),
            ),
        }
    }

    fn write_text(&self, key: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            self.remove_key(key);
        } else {
            self.write_key(key, value);
        }
    }

    fn write_key(&self, key: &str, value: &str) {
        if let Err(err) = self.storage.write(key, value) {
            log_unavailable(&self.log, "write", key, &err);
        }
    }

    fn remove_key(&self, key: &str) {
        if let Err(err) = self.storage.remove(key) {
            log_unavailable(&self.log, "remove", key, &err);
        }
    }
}

impl<S> ApplicationStateStore<S>
where
    S: KeyValueStorage + ChangeFeed + Send + Sync + 'static,
{
    /// Calls `observer` with a fresh state whenever another tab changes the
    /// same storage area. The observer stays registered until the guard drops.
    pub fn subscribe<F>(&self, observer: F) -> ListenerGuard
    where
        F: Fn(&ApplicationState) + Send + Sync + 'static,
    {
        let storage = Arc::clone(&self.storage);
        let log = self.log.clone();
        let area = self.storage.area();
        self.storage.listen(Arc::new(move |event: &StorageEvent| {
            if event.area != area {
                return;
            }
            observer(&read_state(storage.as_ref(), &log));
        }))
    }
}

fn log_unavailable(log: &EventLog, operation: &str, key: &str, err: &dyn std::fmt::Display) {
    log.record(
        LogLevel::Warn,
        "store.storage_unavailable",
        &format!("storage {operation} failed: {err}"),
        &[("key", Value::from(key))],
    );
}

fn read_text<S: KeyValueStorage + ?Sized>(storage: &S, log: &EventLog, key: &str) -> Option<String> {
    match storage.read(key) {
        Ok(value) => value.filter(|value| !value.is_empty()),
        Err(err) => {
            log_unavailable(log, "read", key, &err);
            None
        }
    }
}

fn read_progress<S: KeyValueStorage + ?Sized>(
    storage: &S,
    log: &EventLog,
    scope: ProgressScope,
) -> Option<ProgressMap> {
    let raw = read_text(storage, log, scope.storage_key())?;
    match decode_progress_map(&raw) {
        Ok(map) => Some(map),
        Err(err) => {
            log.record(
                LogLevel::Warn,
                "store.malformed_progress",
                &format!("ignoring unreadable {} progress: {err}", scope.as_str()),
                &[("key", Value::from(scope.storage_key()))],
            );
            None
        }
    }
}

fn read_state<S: KeyValueStorage + ?Sized>(storage: &S, log: &EventLog) -> ApplicationState {
    ApplicationState {
        deal_id: read_text(storage, log, DEAL_ID_KEY),
        borrower_id: read_text(storage, log, BORROWER_ID_KEY),
        co_borrower_id: read_text(storage, log, CO_BORROWER_ID_KEY),
        current_form_step: read_text(storage, log, CURRENT_FORM_STEP_KEY),
        deal_progress: read_progress(storage, log, ProgressScope::Deal),
        borrower_progress: read_progress(storage, log, ProgressScope::Borrower),
    }
}
