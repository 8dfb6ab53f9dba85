//! lightnvim configuration system.
//!
//! TOML-based configuration with validation. All config sections use
//! serde defaults so partial configs work out of the box.

pub mod paths;
pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::LightNvimConfig;

use lightnvim_common::ConfigError;
use std::path::Path;

/// Load config from the platform default path, or from `override_path`.
///
/// The default file is created with commented defaults when missing. An
/// explicit override that does not exist is an error.
pub fn load_config(override_path: Option<&Path>) -> Result<LightNvimConfig, ConfigError> {
    let config = match override_path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
            toml_loader::load_from_path(path)?
        }
        None => toml_loader::load_default()?,
    };
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_override_is_file_not_found() {
        let result = load_config(Some(Path::new("/tmp/nonexistent_lightnvim_config.toml")));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn override_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[window]\ntitle = \"Custom\"\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.window.title, "Custom");
        assert_eq!(config.editor.program, "nvim");
    }
}
