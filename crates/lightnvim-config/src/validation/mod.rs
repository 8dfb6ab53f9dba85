//! Full configuration validation.
//!
//! Each domain has its own check; this orchestrator calls them all and
//! collects errors into a single `ConfigError`.

mod helpers;
mod sections;


use crate::schema::LightNvimConfig;
use lightnvim_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &LightNvimConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    sections::validate_editor(&mut errors, config);
    sections::validate_font(&mut errors, config);
    sections::validate_window(&mut errors, config);
    sections::validate_terminal(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
