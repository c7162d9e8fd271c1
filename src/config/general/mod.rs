mod log_level;

pub use log_level::LogLevel;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Settings not tied to the player or the panel.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
pub struct GeneralConfig {
    /// Log verbosity used when `RUST_LOG` is not set.
    #[serde(default)]
    pub log_level: LogLevel,
}
