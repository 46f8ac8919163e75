pub mod error;
pub mod load;
pub mod paths;
pub mod settings;

pub use error::ConfigError;
pub use load::load_global_settings;
pub use paths::{
    default_global_config_path, default_state_dir, expand_home, CONFIG_PATH_ENV,
    GLOBAL_SETTINGS_FILE_NAME, GLOBAL_STATE_DIR,
};
pub use settings::{
    StorageBackendKind, StorageSettings, WizardSettings, API_BASE_ENV, API_TOKEN_ENV,
};
