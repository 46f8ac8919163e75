pub mod controller;
pub mod routes;

pub use controller::{
    ActiveApplication, IdSource, NavigationController, PageOutcome, ProgressRefresh, RemoteSave,
    SectionUpdate,
};
pub use routes::{Navigation, RouteParams, WizardRoute, APPLICATION_ID_PARAM};
