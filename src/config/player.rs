use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::services::now_playing::{self, DEFAULT_OBJECT_PATH, DEFAULT_SERVICE_NAME};

/// The MPRIS player to follow
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Well-known bus name of the player, e.g. `org.mpris.MediaPlayer2.spotify`.
    pub service_name: String,

    /// Object path exporting the MPRIS interfaces.
    pub object_path: String,

    /// Upper bound in milliseconds for every call to the player.
    pub call_timeout_ms: u64,

    /// Whether the panel may send playback commands.
    pub enable_controls: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            object_path: DEFAULT_OBJECT_PATH.to_string(),
            call_timeout_ms: 2000,
            enable_controls: true,
        }
    }
}

impl From<&PlayerConfig> for now_playing::Config {
    fn from(config: &PlayerConfig) -> Self {
        Self {
            service_name: config.service_name.clone(),
            object_path: config.object_path.clone(),
            call_timeout: Duration::from_millis(config.call_timeout_ms),
            enable_controls: config.enable_controls,
        }
    }
}
