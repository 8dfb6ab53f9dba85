//! Terminal emulation configuration types.

use serde::{Deserialize, Serialize};

/// Terminal appearance and behavior.
///
/// These values form the process-wide terminal style, installed once on
/// first terminal construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    pub foreground: String,
    /// Initial background; `Gui Color` notifications override it.
    pub background: String,
    pub cursor_color: String,
    pub cursor_blink: bool,
    /// Cursor blink interval in milliseconds (valid range: 100-2000).
    pub cursor_blink_interval_ms: u32,
    /// Beam cursor width relative to the cell width (valid range: 0.05-1.0).
    pub cursor_aspect_ratio: f32,
    /// Hide the mouse pointer while typing.
    pub mouse_autohide: bool,
    /// Number of scrollback lines (valid range: 0-100_000).
    pub scrollback_lines: u32,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            foreground: "#d0d0d0".into(),
            background: "#000000".into(),
            cursor_color: "#d0d0d0".into(),
            cursor_blink: true,
            cursor_blink_interval_ms: 600,
            cursor_aspect_ratio: 0.1,
            mouse_autohide: true,
            scrollback_lines: 1_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_config_defaults() {
        let config = TerminalConfig::default();
        assert!(config.cursor_blink);
        assert_eq!(config.cursor_blink_interval_ms, 600);
        assert_eq!(config.cursor_aspect_ratio, 0.1);
        assert!(config.mouse_autohide);
        assert_eq!(config.background, "#000000");
    }

    #[test]
    fn terminal_config_partial_toml() {
        let toml_str = r##"
cursor_blink = false
background = "#1e1e2e"
"##;
        let config: TerminalConfig = toml::from_str(toml_str).unwrap();
        assert!(!config.cursor_blink);
        assert_eq!(config.background, "#1e1e2e");
        assert!(config.mouse_autohide);
        assert_eq!(config.scrollback_lines, 1_000);
    }
}
