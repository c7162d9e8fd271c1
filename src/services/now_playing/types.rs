use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use zbus::zvariant::OwnedValue;

use super::MediaError;

/// D-Bus interface carrying playback state and track metadata
pub const PLAYER_INTERFACE: &str = "org.mpris.MediaPlayer2.Player";

/// Property name of the playback status on the player interface
pub const PLAYBACK_STATUS_PROPERTY: &str = "PlaybackStatus";

/// Property name of the track metadata map on the player interface
pub const METADATA_PROPERTY: &str = "Metadata";

/// Current playback status of the remote player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackStatus {
    /// Player is currently playing
    Playing,

    /// Player is paused
    Paused,

    /// Player is stopped
    Stopped,
}

impl PlaybackStatus {
    /// Whether the UI should show the player as playing
    pub fn is_playing(self) -> bool {
        self == Self::Playing
    }
}

impl FromStr for PlaybackStatus {
    type Err = MediaError;

    fn from_str(status: &str) -> Result<Self, Self::Err> {
        match status {
            "Playing" => Ok(Self::Playing),
            "Paused" => Ok(Self::Paused),
            "Stopped" => Ok(Self::Stopped),
            other => Err(MediaError::MalformedPlaybackStatus(other.to_string())),
        }
    }
}

impl From<PlaybackStatus> for &'static str {
    fn from(status: PlaybackStatus) -> Self {
        match status {
            PlaybackStatus::Playing => "Playing",
            PlaybackStatus::Paused => "Paused",
            PlaybackStatus::Stopped => "Stopped",
        }
    }
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str((*self).into())
    }
}

/// Metadata of the track the player currently has loaded.
///
/// Built wholesale from each metadata update; never patched field by field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// Track title
    pub title: String,

    /// Album name
    pub album: String,

    /// Track artists in the order the player reports them
    pub artists: Vec<String>,

    /// URI of the album artwork
    pub art_url: String,
}

impl Track {
    /// Artists joined for display
    pub fn artists_label(&self) -> String {
        self.artists.join(", ")
    }

    /// Whether two tracks count as the same song for change detection.
    ///
    /// Only the title is compared, so a re-release of the same title on another
    /// album is treated as no change.
    pub fn same_song(&self, other: &Track) -> bool {
        self.title == other.title
    }
}

/// Whether the remote service name currently has an owner on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceState {
    /// The player process owns its bus name
    Open,

    /// Nobody owns the bus name
    Closed,
}

impl From<bool> for PresenceState {
    fn from(has_owner: bool) -> Self {
        if has_owner { Self::Open } else { Self::Closed }
    }
}

/// Connection state of the playback tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No subscription, empty cache
    #[default]
    Disconnected,

    /// Subscribed to property changes of a live player
    Connected,
}

/// Commands that can be sent to the remote player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    /// Skip to the next track
    Next,

    /// Go back to the previous track
    Previous,

    /// Toggle between playing and paused
    PlayPause,

    /// Bring the player window to the foreground
    Raise,

    /// Ask the player application to exit
    Quit,
}

impl PlayerCommand {
    /// D-Bus method name implementing the command
    pub fn method_name(self) -> &'static str {
        match self {
            Self::Next => "Next",
            Self::Previous => "Previous",
            Self::PlayPause => "PlayPause",
            Self::Raise => "Raise",
            Self::Quit => "Quit",
        }
    }
}

impl fmt::Display for PlayerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

/// Raw payload of a `PropertiesChanged` signal
#[derive(Debug, Default)]
pub struct ChangedProperties {
    /// Interface whose properties changed
    pub interface_name: String,

    /// Changed property names with their new values
    pub changed: HashMap<String, OwnedValue>,

    /// Properties that changed but whose values were not sent
    pub invalidated: Vec<String>,
}

impl ChangedProperties {
    /// Whether the payload concerns the player interface
    pub fn is_player_interface(&self) -> bool {
        self.interface_name == PLAYER_INTERFACE
    }

    /// Whether a property was invalidated without a new value
    pub fn is_invalidated(&self, property: &str) -> bool {
        !self.changed.contains_key(property) && self.invalidated.iter().any(|p| p == property)
    }
}
