use super::{default_global_config_path, ConfigError, WizardSettings};

/// Reads the global settings file, falling back to defaults when it does not
/// exist, then applies environment overrides and validates the result.
pub fn load_global_settings() -> Result<WizardSettings, ConfigError> {
    let path = default_global_config_path()?;
    let mut settings = if path.exists() {
        WizardSettings::from_path(&path)?
    } else {
        WizardSettings::default()
    };
    settings.apply_env_overrides(|key| std::env::var(key).ok());
    settings.resolve_paths()?;
    settings.validate()?;
    Ok(settings)
}
