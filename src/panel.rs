//! Presentation state of the panel widget.
//!
//! A pure model fed by tracker events and user actions. It owns nothing
//! remote, so any front end (the terminal renderer in the CLI, or a real
//! panel) can drive it from the tracker's handlers.

use crate::{
    config::{PanelConfig, PanelPlace},
    services::now_playing::{ConnectionState, PlaybackStatus, Track},
};

/// Icon shown on the play/pause button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToggleIcon {
    /// Player is paused or stopped; clicking starts playback
    #[default]
    Play,
    /// Player is playing; clicking pauses
    Pause,
}

impl ToggleIcon {
    /// Glyph used by the one-line renderer
    pub fn glyph(self) -> &'static str {
        match self {
            ToggleIcon::Play => "▶",
            ToggleIcon::Pause => "⏸",
        }
    }

    fn flipped(self) -> Self {
        match self {
            ToggleIcon::Play => ToggleIcon::Pause,
            ToggleIcon::Pause => ToggleIcon::Play,
        }
    }
}

/// Where the widget sits in the top panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Panel box
    pub place: PanelPlace,
    /// Slot within the box
    pub index: u32,
}

/// What the panel widget currently shows.
#[derive(Debug, Clone)]
pub struct PanelState {
    config: PanelConfig,
    connected: bool,
    icon: ToggleIcon,
    track: Option<Track>,
}

impl PanelState {
    /// Initial state: nothing playing, hidden unless `show_inactive` is set
    pub fn new(config: PanelConfig) -> Self {
        Self {
            config,
            connected: false,
            icon: ToggleIcon::Play,
            track: None,
        }
    }

    /// Whether the widget is on screen
    pub fn is_visible(&self) -> bool {
        self.connected || self.config.show_inactive
    }

    /// Slot the widget occupies, or `None` while hidden
    pub fn placement(&self) -> Option<Placement> {
        self.is_visible().then_some(Placement {
            place: self.config.place,
            index: self.config.index,
        })
    }

    /// Apply changed panel settings; placement and visibility follow at once
    pub fn reconfigure(&mut self, config: PanelConfig) {
        self.config = config;
    }

    /// Current play/pause icon
    pub fn icon(&self) -> ToggleIcon {
        self.icon
    }

    /// Song shown in the label and the hover description
    pub fn track(&self) -> Option<&Track> {
        self.track.as_ref()
    }

    /// Player appeared or vanished
    pub fn on_connection_changed(&mut self, state: ConnectionState) {
        match state {
            ConnectionState::Connected => self.connected = true,
            ConnectionState::Disconnected => {
                self.connected = false;
                // An inactive widget keeps its last song label.
                if self.config.show_inactive {
                    self.icon = ToggleIcon::Play;
                } else {
                    self.track = None;
                }
            }
        }
    }

    /// Player reported a new playback status
    pub fn on_playback_status_changed(&mut self, status: PlaybackStatus) {
        self.icon = if status.is_playing() {
            ToggleIcon::Pause
        } else {
            ToggleIcon::Play
        };
    }

    /// Player moved to another song
    pub fn on_song_changed(&mut self, track: Track) {
        self.track = Some(track);
    }

    /// Play/pause was clicked; flip the icon before the player confirms
    pub fn on_toggle_requested(&mut self) {
        self.icon = self.icon.flipped();
    }

    /// Next or previous was clicked; the player will be playing afterwards
    pub fn on_skip_requested(&mut self) {
        self.icon = ToggleIcon::Pause;
    }

    /// One-line rendering, or `None` while hidden
    pub fn render(&self) -> Option<String> {
        if !self.is_visible() {
            return None;
        }

        let mut line = self.icon.glyph().to_string();
        if let Some(track) = self.track.as_ref().filter(|_| self.config.show_song) {
            line.push(' ');
            line.push_str(&describe(track));
        }
        Some(line)
    }
}

/// Title, album and artists of `track` on one line
pub fn describe(track: &Track) -> String {
    let mut parts = vec![track.title.as_str()];
    if !track.album.is_empty() {
        parts.push(track.album.as_str());
    }

    let artists = track.artists_label();
    if !artists.is_empty() {
        return format!("{} - {artists}", parts.join(" - "));
    }
    parts.join(" - ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(title: &str) -> Track {
        Track {
            title: title.to_string(),
            album: "Album".to_string(),
            artists: vec!["One".to_string(), "Two".to_string()],
            art_url: "https://i.scdn.co/image/abc".to_string(),
        }
    }

    fn shown_inactive() -> PanelConfig {
        PanelConfig {
            show_inactive: true,
            ..PanelConfig::default()
        }
    }

    #[test]
    fn hidden_until_connected() {
        let mut panel = PanelState::new(PanelConfig::default());
        assert!(!panel.is_visible());
        assert_eq!(panel.render(), None);

        panel.on_connection_changed(ConnectionState::Connected);
        assert!(panel.is_visible());
        assert_eq!(panel.render().as_deref(), Some("▶"));
    }

    #[test]
    fn show_inactive_keeps_widget_visible() {
        let panel = PanelState::new(shown_inactive());

        assert!(panel.is_visible());
        assert_eq!(panel.render().as_deref(), Some("▶"));
    }

    #[test]
    fn status_drives_icon() {
        let mut panel = PanelState::new(PanelConfig::default());

        panel.on_playback_status_changed(PlaybackStatus::Playing);
        assert_eq!(panel.icon(), ToggleIcon::Pause);

        panel.on_playback_status_changed(PlaybackStatus::Stopped);
        assert_eq!(panel.icon(), ToggleIcon::Play);
    }

    #[test]
    fn user_actions_update_icon_optimistically() {
        let mut panel = PanelState::new(PanelConfig::default());

        panel.on_toggle_requested();
        assert_eq!(panel.icon(), ToggleIcon::Pause);
        panel.on_toggle_requested();
        assert_eq!(panel.icon(), ToggleIcon::Play);

        panel.on_skip_requested();
        assert_eq!(panel.icon(), ToggleIcon::Pause);
        panel.on_skip_requested();
        assert_eq!(panel.icon(), ToggleIcon::Pause);
    }

    #[test]
    fn render_includes_song_description() {
        let mut panel = PanelState::new(PanelConfig::default());
        panel.on_connection_changed(ConnectionState::Connected);
        panel.on_playback_status_changed(PlaybackStatus::Playing);
        panel.on_song_changed(song("Title"));

        assert_eq!(
            panel.render().as_deref(),
            Some("⏸ Title - Album - One, Two")
        );
    }

    #[test]
    fn show_song_off_renders_icon_only() {
        let mut panel = PanelState::new(PanelConfig {
            show_song: false,
            ..PanelConfig::default()
        });
        panel.on_connection_changed(ConnectionState::Connected);
        panel.on_song_changed(song("Title"));

        assert_eq!(panel.render().as_deref(), Some("▶"));
    }

    #[test]
    fn closing_player_resets_icon_when_shown_inactive() {
        let mut panel = PanelState::new(shown_inactive());
        panel.on_connection_changed(ConnectionState::Connected);
        panel.on_playback_status_changed(PlaybackStatus::Playing);
        panel.on_song_changed(song("Title"));

        panel.on_connection_changed(ConnectionState::Disconnected);

        assert_eq!(panel.icon(), ToggleIcon::Play);
        assert_eq!(panel.track().map(|t| t.title.as_str()), Some("Title"));
        assert_eq!(
            panel.render().as_deref(),
            Some("▶ Title - Album - One, Two")
        );
    }

    #[test]
    fn closing_player_hides_widget() {
        let mut panel = PanelState::new(PanelConfig::default());
        panel.on_connection_changed(ConnectionState::Connected);
        panel.on_song_changed(song("Title"));
        panel.on_connection_changed(ConnectionState::Disconnected);

        assert!(!panel.is_visible());
        assert!(panel.track().is_none());
        assert_eq!(panel.render(), None);
    }

    #[test]
    fn placement_follows_visibility() {
        let mut panel = PanelState::new(PanelConfig {
            place: PanelPlace::Left,
            index: 4,
            ..PanelConfig::default()
        });
        assert_eq!(panel.placement(), None);

        panel.on_connection_changed(ConnectionState::Connected);
        assert_eq!(
            panel.placement(),
            Some(Placement {
                place: PanelPlace::Left,
                index: 4,
            })
        );

        panel.on_connection_changed(ConnectionState::Disconnected);
        assert_eq!(panel.placement(), None);
    }

    #[test]
    fn reconfigure_moves_and_reveals_widget() {
        let mut panel = PanelState::new(PanelConfig::default());
        panel.on_connection_changed(ConnectionState::Connected);
        assert_eq!(
            panel.placement(),
            Some(Placement {
                place: PanelPlace::Right,
                index: 0,
            })
        );

        panel.on_connection_changed(ConnectionState::Disconnected);
        panel.reconfigure(PanelConfig {
            show_inactive: true,
            place: PanelPlace::Center,
            index: 1,
            ..PanelConfig::default()
        });

        assert_eq!(
            panel.placement(),
            Some(Placement {
                place: PanelPlace::Center,
                index: 1,
            })
        );
        assert_eq!(panel.render().as_deref(), Some("▶"));
    }

    #[test]
    fn describe_skips_empty_parts() {
        let track = Track {
            title: "Solo".to_string(),
            album: String::new(),
            artists: Vec::new(),
            art_url: String::new(),
        };

        assert_eq!(describe(&track), "Solo");
    }
}
