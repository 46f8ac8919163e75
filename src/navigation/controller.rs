use super::routes::{Navigation, RouteParams, WizardRoute};
use crate::api::{next_form_step_update, ApplicationDataSource, FetchError};
use crate::progress::{
    resolve_next_step, review_back_step, ApplicationSnapshot, FormStep, LoanPurpose, Resolution,
};
use crate::shared::{ApplicationId, EventLog, LogLevel};
use crate::state::{ApplicationState, ApplicationStateStore, ProgressScope};
use crate::storage::KeyValueStorage;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSource {
    RouteParameter,
    Store,
}

impl IdSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RouteParameter => "route_parameter",
            Self::Store => "store",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveApplication {
    pub id: ApplicationId,
    pub source: IdSource,
}

/// What a resolution page should render after mounting.
#[derive(Debug)]
pub enum PageOutcome {
    Navigate {
        navigation: Navigation,
        resolution: Resolution,
    },
    NoActiveApplication,
    FetchFailed {
        application_id: ApplicationId,
        error: FetchError,
        stale_id_cleared: bool,
    },
    AlreadyResolving,
}

/// Result of pulling section progress from the server.
#[derive(Debug)]
pub enum ProgressRefresh {
    Synced(ApplicationState),
    NoActiveApplication,
    FetchFailed {
        application_id: ApplicationId,
        error: FetchError,
        stale_id_cleared: bool,
    },
}

/// Whether a section change also reached the server.
#[derive(Debug)]
pub enum RemoteSave {
    Saved,
    NoActiveApplication,
    Failed(FetchError),
}

#[derive(Debug)]
pub struct SectionUpdate {
    pub state: ApplicationState,
    pub remote: RemoteSave,
}

/// Page-level glue between the store, the resolver and the data source.
pub struct NavigationController<'a, S, D> {
    store: &'a ApplicationStateStore<S>,
    source: D,
    log: EventLog,
    in_flight: AtomicBool,
}

struct InFlight<'g>(&'g AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<'a, S, D> NavigationController<'a, S, D>
where
    S: KeyValueStorage,
    D: ApplicationDataSource,
{
    pub fn new(store: &'a ApplicationStateStore<S>, source: D, log: EventLog) -> Self {
        Self {
            store,
            source,
            log,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Route parameter first, then the store. An id that only arrived via the
    /// route is adopted into an empty store.
    pub fn active_application(&self, params: &RouteParams) -> Option<ActiveApplication> {
        let stored = self.store.get().deal_id;
        if let Some(raw) = params.application_id.as_deref() {
            match ApplicationId::parse(raw) {
                Ok(id) => {
                    if stored.is_none() {
                        self.store.set_deal_id(id.as_str());
                    }
                    return Some(ActiveApplication {
                        id,
                        source: IdSource::RouteParameter,
                    });
                }
                Err(err) => self.log.warn(
                    "navigation.invalid_route_id",
                    &format!("ignoring route application id: {err}"),
                ),
            }
        }
        let stored = stored?;
        match ApplicationId::parse(&stored) {
            Ok(id) => Some(ActiveApplication {
                id,
                source: IdSource::Store,
            }),
            Err(err) => {
                self.log.warn(
                    "navigation.invalid_stored_id",
                    &format!("ignoring stored application id: {err}"),
                );
                None
            }
        }
    }

    fn begin(&self) -> Option<InFlight<'_>> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            return None;
        }
        Some(InFlight(&self.in_flight))
    }

    /// Works out where the user belongs and replaces the current location
    /// with it. Nothing navigates when the id is unknown or the fetch fails.
    pub fn mount(&self, params: &RouteParams) -> PageOutcome {
        let Some(_in_flight) = self.begin() else {
            return PageOutcome::AlreadyResolving;
        };

        let Some(active) = self.active_application(params) else {
            self.log
                .info("navigation.no_application", "no active application to resume");
            return PageOutcome::NoActiveApplication;
        };

        let payload = match self.source.fetch_application(&active.id) {
            Ok(payload) => payload,
            Err(error) => return self.fetch_failed(active, error),
        };

        let snapshot = ApplicationSnapshot::from_value(&payload);
        let resolution = resolve_next_step(&snapshot);

        self.store.set_deal_id(active.id.as_str());
        self.store.sync_from_api(&payload);
        if let Some(purpose) = snapshot.loan_purpose.as_deref() {
            self.store.set_loan_purpose(purpose);
        }
        self.store.set_current_form_step(resolution.step.as_str());

        let route = WizardRoute::new(resolution.purpose, resolution.step, Some(active.id.clone()));
        self.log.record(
            LogLevel::Info,
            "navigation.resolved",
            &format!("resuming application at {}", route.path()),
            &[
                ("application_id", Value::from(active.id.as_str())),
                ("id_source", Value::from(active.source.as_str())),
                ("step", Value::from(resolution.step.as_str())),
                ("rule", Value::from(resolution.rule.as_str())),
            ],
        );
        PageOutcome::Navigate {
            navigation: Navigation::Replace(route),
            resolution,
        }
    }

    fn fetch_failed(&self, active: ActiveApplication, error: FetchError) -> PageOutcome {
        let stale_id_cleared = self.forget_if_stale(&active, &error);
        self.log.record(
            LogLevel::Error,
            "navigation.fetch_failed",
            &error.to_string(),
            &[
                ("application_id", Value::from(active.id.as_str())),
                ("stale_id_cleared", Value::from(stale_id_cleared)),
            ],
        );
        PageOutcome::FetchFailed {
            application_id: active.id,
            error,
            stale_id_cleared,
        }
    }

    /// Moves forward from a completed step. The next step is persisted on the
    /// server first; a failed save is logged and the move happens anyway.
    /// Returns `None` once the wizard is done.
    pub fn advance(
        &self,
        from: FormStep,
        has_co_borrower: bool,
        params: &RouteParams,
    ) -> Option<Navigation> {
        let next = from.next(has_co_borrower)?;
        let active = self.active_application(params);
        if let Some(active) = &active {
            if let Err(err) = self
                .source
                .save_application(&active.id, &next_form_step_update(next))
            {
                self.log.record(
                    LogLevel::Warn,
                    "navigation.save_failed",
                    &format!("failed to persist next form step: {err}"),
                    &[
                        ("application_id", Value::from(active.id.as_str())),
                        ("step", Value::from(next.as_str())),
                    ],
                );
            }
        }
        self.store.set_current_form_step(next.as_str());
        Some(Navigation::Push(WizardRoute::new(
            self.stored_purpose(),
            next,
            active.map(|active| active.id),
        )))
    }

    /// Back from the review summary goes to the last identity page that was
    /// filled in. Without an application record it assumes a single borrower.
    pub fn back_from_review(&self, params: &RouteParams) -> Navigation {
        let active = self.active_application(params);
        let snapshot = active.as_ref().and_then(|active| {
            match self.source.fetch_application(&active.id) {
                Ok(payload) => Some(ApplicationSnapshot::from_value(&payload)),
                Err(err) => {
                    self.log.warn(
                        "navigation.fetch_failed",
                        &format!("back navigation without application data: {err}"),
                    );
                    None
                }
            }
        });
        let step = review_back_step(snapshot.as_ref());
        Navigation::Push(WizardRoute::new(
            self.stored_purpose(),
            step,
            active.map(|active| active.id),
        ))
    }

    /// Replaces the local deal progress with the server's copy.
    pub fn refresh_progress(&self, params: &RouteParams) -> ProgressRefresh {
        let Some(active) = self.active_application(params) else {
            return ProgressRefresh::NoActiveApplication;
        };
        match self.source.fetch_progress(&active.id) {
            Ok(payload) => ProgressRefresh::Synced(self.store.sync_progress_from_api(&payload)),
            Err(error) => {
                let stale_id_cleared = self.forget_if_stale(&active, &error);
                self.log.record(
                    LogLevel::Error,
                    "navigation.progress_fetch_failed",
                    &error.to_string(),
                    &[
                        ("application_id", Value::from(active.id.as_str())),
                        ("stale_id_cleared", Value::from(stale_id_cleared)),
                    ],
                );
                ProgressRefresh::FetchFailed {
                    application_id: active.id,
                    error,
                    stale_id_cleared,
                }
            }
        }
    }

    /// Marks a deal section locally, then reports it to the server. The
    /// local change stays even when the server call fails.
    pub fn complete_section(
        &self,
        section: &str,
        complete: bool,
        params: &RouteParams,
    ) -> SectionUpdate {
        let active = self.active_application(params);
        let state = self
            .store
            .update_progress(ProgressScope::Deal, section, complete);
        let Some(active) = active else {
            return SectionUpdate {
                state,
                remote: RemoteSave::NoActiveApplication,
            };
        };
        let remote = match self
            .source
            .update_progress_section(&active.id, section, complete)
        {
            Ok(()) => RemoteSave::Saved,
            Err(err) => {
                self.log.record(
                    LogLevel::Warn,
                    "navigation.progress_save_failed",
                    &format!("failed to persist section progress: {err}"),
                    &[
                        ("application_id", Value::from(active.id.as_str())),
                        ("section", Value::from(section)),
                        ("complete", Value::from(complete)),
                    ],
                );
                RemoteSave::Failed(err)
            }
        };
        SectionUpdate { state, remote }
    }

    fn forget_if_stale(&self, active: &ActiveApplication, error: &FetchError) -> bool {
        if error.is_stale_application()
            && self.store.get().deal_id.as_deref() == Some(active.id.as_str())
        {
            self.store.forget_deal_id();
            return true;
        }
        false
    }

    fn stored_purpose(&self) -> LoanPurpose {
        LoanPurpose::classify(self.store.loan_purpose().as_deref())
    }
}
