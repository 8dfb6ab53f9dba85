//! Editor process configuration types.

use serde::{Deserialize, Serialize};

/// How the editor is launched and bootstrapped over RPC.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Program to spawn, resolved through `PATH`.
    pub program: String,
    /// Directory prepended to the editor's `runtimepath`.
    /// Unset means auto-detect (see [`crate::paths::runtime_dir`]).
    pub runtime_dir: Option<String>,
    /// Plugin sourced with `:runtime` after attaching.
    pub plugin_script: String,
    /// User init script sourced with `:runtime!` after attaching.
    pub init_script: String,
    /// Environment variable carrying the listen socket path.
    pub listen_env: String,
    /// Delay after subscribing before close requests quit the editor
    /// (valid range: 0-5000).
    pub readiness_grace_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            program: "nvim".into(),
            runtime_dir: None,
            plugin_script: "plugin/lightnvim.vim".into(),
            init_script: "ginit.vim".into(),
            listen_env: "NVIM_LISTEN_ADDRESS".into(),
            readiness_grace_ms: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editor_config_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.program, "nvim");
        assert!(config.runtime_dir.is_none());
        assert_eq!(config.plugin_script, "plugin/lightnvim.vim");
        assert_eq!(config.init_script, "ginit.vim");
        assert_eq!(config.listen_env, "NVIM_LISTEN_ADDRESS");
        assert_eq!(config.readiness_grace_ms, 100);
    }

    #[test]
    fn editor_config_partial_toml() {
        let config: EditorConfig =
            toml::from_str("program = \"/opt/nvim/bin/nvim\"\nreadiness_grace_ms = 250\n")
                .unwrap();
        assert_eq!(config.program, "/opt/nvim/bin/nvim");
        assert_eq!(config.readiness_grace_ms, 250);
        assert_eq!(config.init_script, "ginit.vim");
    }
}
