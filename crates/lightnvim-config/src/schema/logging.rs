//! Logging configuration types.

use serde::{Deserialize, Serialize};

/// Log level.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// `tracing` filter directive for the lightnvim crates.
    pub fn directive(self) -> &'static str {
        match self {
            LogLevel::Trace => "lightnvim=trace",
            LogLevel::Debug => "lightnvim=debug",
            LogLevel::Info => "lightnvim=info",
            LogLevel::Warning => "lightnvim=warn",
            LogLevel::Error => "lightnvim=error",
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
}
