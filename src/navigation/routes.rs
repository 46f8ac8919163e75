use crate::progress::{FormStep, LoanPurpose};
use crate::shared::ApplicationId;

pub const APPLICATION_ID_PARAM: &str = "applicationId";

/// Parameters a page was opened with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    pub application_id: Option<String>,
}

impl RouteParams {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_application_id(id: impl Into<String>) -> Self {
        Self {
            application_id: Some(id.into()),
        }
    }

    /// Reads `applicationId` from a query string such as
    /// `?applicationId=42&edit=borrower`. Later duplicates win.
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();
        for pair in query.trim_start_matches('?').split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            if key != APPLICATION_ID_PARAM {
                continue;
            }
            let decoded = urlencoding::decode(&value.replace('+', " "))
                .map(|value| value.into_owned())
                .unwrap_or_else(|_| value.to_string());
            params.application_id = Some(decoded);
        }
        params
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardRoute {
    pub purpose: LoanPurpose,
    pub step: FormStep,
    pub application_id: Option<ApplicationId>,
}

impl WizardRoute {
    pub fn new(purpose: LoanPurpose, step: FormStep, application_id: Option<ApplicationId>) -> Self {
        Self {
            purpose,
            step,
            application_id,
        }
    }

    /// `/{namespace}/{step}` with the application id carried as a query
    /// parameter so the page still works when session storage is gone.
    pub fn path(&self) -> String {
        let base = format!("/{}/{}", self.purpose.route_namespace(), self.step.as_str());
        match &self.application_id {
            Some(id) => format!(
                "{base}?{APPLICATION_ID_PARAM}={}",
                urlencoding::encode(id.as_str())
            ),
            None => base,
        }
    }
}

impl std::fmt::Display for WizardRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

/// Replace swaps the current history entry so Back skips resolution pages;
/// Push is used for ordinary forward and backward moves between steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Replace(WizardRoute),
    Push(WizardRoute),
}

impl Navigation {
    pub fn route(&self) -> &WizardRoute {
        match self {
            Self::Replace(route) | Self::Push(route) => route,
        }
    }

    pub fn is_replace(&self) -> bool {
        matches!(self, Self::Replace(_))
    }
}
