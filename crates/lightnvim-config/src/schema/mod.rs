//! Configuration schema types for lightnvim.
//!
//! All structs use `serde(default)` so partial configs work correctly.
//! Missing fields are filled with defaults that reproduce the stock
//! front-end behavior.

mod editor;
mod font;
mod logging;
mod terminal;
mod window;

pub use editor::*;
pub use font::*;
pub use logging::*;
pub use terminal::*;
pub use window::*;

use serde::{Deserialize, Serialize};

/// Root configuration for lightnvim.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LightNvimConfig {
    pub editor: EditorConfig,
    pub font: FontConfig,
    pub window: WindowConfig,
    pub terminal: TerminalConfig,
    pub logging: LoggingConfig,
}
