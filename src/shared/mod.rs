pub mod fs_atomic;
pub mod ids;
pub mod logging;

pub use fs_atomic::write_file_atomically;
pub use ids::{identifier_from_json, validate_identifier_value, ApplicationId};
pub use logging::{EventLog, LogLevel};
