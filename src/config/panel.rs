use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Highest slot the widget can be inserted at within its panel box.
pub const MAX_PANEL_INDEX: u32 = 20;

/// Panel widget behavior
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct PanelConfig {
    /// Keep the widget visible while the player is not running.
    pub show_inactive: bool,

    /// Render the song label next to the play/pause icon.
    pub show_song: bool,

    /// Panel box the widget is inserted into.
    pub place: PanelPlace,

    /// Slot within that box, counted from its start (0 to 20).
    pub index: u32,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            show_inactive: false,
            show_song: true,
            place: PanelPlace::default(),
            index: 0,
        }
    }
}

/// Box of the top panel hosting the widget.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PanelPlace {
    /// Next to the activities button.
    Left,

    /// Around the clock.
    Center,

    /// With the status indicators (default).
    #[default]
    Right,
}
