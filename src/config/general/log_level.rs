use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Log verbosity, from errors only to full tracing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Failures that stop the widget from working.
    Error,

    /// Command failures and malformed player payloads.
    Warn,

    /// Connect and disconnect transitions (default level).
    #[default]
    Info,

    /// Swallowed reads and suppressed duplicate notifications.
    Debug,

    /// Everything, including span entry and exit.
    Trace,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}
