//! Configuration schema definitions and loading.
//!
//! Everything is read from a single TOML file and every field has a default,
//! so an empty or missing file yields a working configuration.

mod general;
mod loading;
mod panel;
mod paths;
mod player;

#[cfg(test)]
mod tests;

pub use general::{GeneralConfig, LogLevel};
pub use panel::{MAX_PANEL_INDEX, PanelConfig, PanelPlace};
pub use paths::ConfigPaths;
pub use player::PlayerConfig;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Main configuration structure for nowplaying.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
pub struct Config {
    /// General application settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Which player to follow and how to talk to it.
    #[serde(default)]
    pub player: PlayerConfig,

    /// Panel widget behavior.
    #[serde(default)]
    pub panel: PanelConfig,
}
