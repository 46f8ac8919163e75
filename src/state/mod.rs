pub mod keys;
pub mod progress_map;
pub mod store;

pub use progress_map::{ProgressMap, ProgressScope};
pub use store::{ApplicationState, ApplicationStateStore};
