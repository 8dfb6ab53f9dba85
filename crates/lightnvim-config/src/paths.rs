//! Platform directories and runtime-directory resolution.

use lightnvim_common::PlatformError;
use std::path::{Path, PathBuf};

use crate::schema::EditorConfig;

const APP_NAME: &str = "lightnvim";

/// Name of the directory holding the bundled editor plugin.
pub const RUNTIME_DIR_NAME: &str = "runtime";

/// Returns the platform-specific configuration directory.
///
/// - macOS: `~/Library/Application Support/lightnvim`
/// - Linux: `$XDG_CONFIG_HOME/lightnvim` (defaults to `~/.config/lightnvim`)
pub fn config_dir() -> Result<PathBuf, PlatformError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_NAME))
        .ok_or_else(|| PlatformError::PathError("could not determine config directory".into()))
}

/// Returns the platform-specific data directory.
///
/// - macOS: `~/Library/Application Support/lightnvim`
/// - Linux: `$XDG_DATA_HOME/lightnvim` (defaults to `~/.local/share/lightnvim`)
pub fn data_dir() -> Result<PathBuf, PlatformError> {
    dirs::data_dir()
        .map(|dir| dir.join(APP_NAME))
        .ok_or_else(|| PlatformError::PathError("could not determine data directory".into()))
}

/// Resolve the directory prepended to the editor's `runtimepath`.
///
/// Order: the configured path, `<exe dir>/runtime` if it exists, then
/// `<data dir>/runtime`.
pub fn runtime_dir(editor: &EditorConfig) -> Result<PathBuf, PlatformError> {
    if let Some(dir) = &editor.runtime_dir {
        return Ok(PathBuf::from(dir));
    }

    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    if let Some(dir) = exe_dir.as_deref().and_then(bundled_runtime) {
        return Ok(dir);
    }

    data_dir().map(|dir| dir.join(RUNTIME_DIR_NAME))
}

/// `<dir>/runtime`, if present.
fn bundled_runtime(dir: &Path) -> Option<PathBuf> {
    let candidate = dir.join(RUNTIME_DIR_NAME);
    candidate.is_dir().then_some(candidate)
}
