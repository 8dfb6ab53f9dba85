//! Typography configuration types.

use lightnvim_common::FontDescriptor;
use serde::{Deserialize, Serialize};

/// Startup font, replaced at runtime by `Gui Font` notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub family: String,
    /// Font size in points (valid range: 4-72).
    pub size: f32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: "Monospace".into(),
            size: 11.0,
        }
    }
}

impl FontConfig {
    pub fn descriptor(&self) -> FontDescriptor {
        FontDescriptor::new(self.family.clone(), self.size)
    }
}
