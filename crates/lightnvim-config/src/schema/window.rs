//! Window configuration types.

use lightnvim_common::Padding;
use serde::{Deserialize, Serialize};

/// Window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Title shown until the editor sets one.
    pub title: String,
    /// Initial inner width in logical pixels (valid range: 100-16384).
    pub width: u32,
    /// Initial inner height in logical pixels (valid range: 100-16384).
    pub height: u32,
    /// Space around the character grid, in logical pixels.
    pub padding: Padding,
    /// Optional PNG used as the window icon.
    pub icon: Option<String>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "NVIM".into(),
            width: 800,
            height: 600,
            padding: Padding::uniform(1),
            icon: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_config_defaults() {
        let config = WindowConfig::default();
        assert_eq!(config.title, "NVIM");
        assert_eq!(config.width, 800);
        assert_eq!(config.height, 600);
        assert_eq!(config.padding, Padding::uniform(1));
        assert!(config.icon.is_none());
    }

    #[test]
    fn window_config_partial_toml() {
        let toml_str = r#"
icon = "/usr/share/pixmaps/nvim.png"

[padding]
left = 4
right = 4
"#;
        let config: WindowConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.icon.as_deref(), Some("/usr/share/pixmaps/nvim.png"));
        assert_eq!(config.padding.horizontal(), 8);
        assert_eq!(config.padding.vertical(), 0);
        assert_eq!(config.title, "NVIM");
    }
}
