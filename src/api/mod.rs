pub mod http;

pub use http::HttpApplicationClient;

use crate::progress::FormStep;
use crate::shared::ApplicationId;
use serde_json::{json, Value};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("application {id} was not found")]
    NotFound { id: String },
    #[error("request was not authorized (status {status})")]
    Unauthorized { status: u16 },
    #[error("application api returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("application api request failed: {0}")]
    Request(String),
    #[error("application api returned an unreadable body: {0}")]
    Decode(String),
}

impl FetchError {
    /// The stored application id points at something this session cannot
    /// load any more.
    pub fn is_stale_application(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Unauthorized { .. })
    }
}

/// Remote record of applications. Calls block until the server answers and
/// are never retried here.
pub trait ApplicationDataSource {
    fn fetch_application(&self, id: &ApplicationId) -> Result<Value, FetchError>;

    /// Sends a partial update, commonly only `{ "nextFormStep": <token> }`.
    fn save_application(&self, id: &ApplicationId, update: &Value) -> Result<(), FetchError>;

    fn fetch_progress(&self, id: &ApplicationId) -> Result<Value, FetchError>;

    fn update_progress_section(
        &self,
        id: &ApplicationId,
        section: &str,
        complete: bool,
    ) -> Result<(), FetchError>;
}

impl<T: ApplicationDataSource + ?Sized> ApplicationDataSource for &T {
    fn fetch_application(&self, id: &ApplicationId) -> Result<Value, FetchError> {
        (**self).fetch_application(id)
    }

    fn save_application(&self, id: &ApplicationId, update: &Value) -> Result<(), FetchError> {
        (**self).save_application(id, update)
    }

    fn fetch_progress(&self, id: &ApplicationId) -> Result<Value, FetchError> {
        (**self).fetch_progress(id)
    }

    fn update_progress_section(
        &self,
        id: &ApplicationId,
        section: &str,
        complete: bool,
    ) -> Result<(), FetchError> {
        (**self).update_progress_section(id, section, complete)
    }
}

pub fn next_form_step_update(step: FormStep) -> Value {
    json!({ "nextFormStep": step.as_str() })
}
