use crate::config::ConfigError;
use std::path::{Path, PathBuf};

pub const GLOBAL_STATE_DIR: &str = ".taulen";
pub const GLOBAL_SETTINGS_FILE_NAME: &str = "config.yaml";
pub const CONFIG_PATH_ENV: &str = "TAULEN_CONFIG";

fn home_dir() -> Result<PathBuf, ConfigError> {
    std::env::var_os("HOME")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .ok_or(ConfigError::HomeDirectoryUnavailable)
}

pub fn default_state_dir() -> Result<PathBuf, ConfigError> {
    Ok(home_dir()?.join(GLOBAL_STATE_DIR))
}

/// `TAULEN_CONFIG` when set, otherwise `~/.taulen/config.yaml`.
pub fn default_global_config_path() -> Result<PathBuf, ConfigError> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|value| !value.is_empty()) {
        return expand_home(Path::new(&path));
    }
    Ok(default_state_dir()?.join(GLOBAL_SETTINGS_FILE_NAME))
}

pub fn expand_home(path: &Path) -> Result<PathBuf, ConfigError> {
    let raw = path.to_string_lossy();
    if raw == "~" {
        return home_dir();
    }
    if let Some(rest) = raw.strip_prefix("~/") {
        return Ok(home_dir()?.join(rest));
    }
    Ok(path.to_path_buf())
}
