//! Unit tests for config module
//!
//! Tests configuration types, defaults, validation and schema output.
//! No filesystem dependencies - all in-memory.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::time::Duration;

use crate::{
    NowPlayingError,
    config::{Config, LogLevel, PanelConfig, PanelPlace, PlayerConfig},
    services::now_playing,
};

#[test]
fn config_default() {
    let config = Config::default();

    assert_eq!(config.general.log_level, LogLevel::Info);
    assert_eq!(config.player.service_name, "org.mpris.MediaPlayer2.spotify");
    assert_eq!(config.player.object_path, "/org/mpris/MediaPlayer2");
    assert_eq!(config.player.call_timeout_ms, 2000);
    assert!(config.player.enable_controls);
    assert!(!config.panel.show_inactive);
    assert!(config.panel.show_song);
}

#[test]
fn config_serialize_toml() {
    let toml_str = toml::to_string(&Config::default()).unwrap();

    assert!(toml_str.contains("[general]"));
    assert!(toml_str.contains("[player]"));
    assert!(toml_str.contains("[panel]"));
}

#[test]
fn config_empty_toml() {
    let config = Config::from_toml("").unwrap();

    assert_eq!(config, Config::default());
}

#[test]
fn config_partial_sections_keep_defaults() {
    let config = Config::from_toml(
        r#"
        [general]
        log_level = "debug"

        [player]
        service_name = "org.mpris.MediaPlayer2.vlc"

        [panel]
        show_inactive = true
    "#,
    )
    .unwrap();

    assert_eq!(config.general.log_level, LogLevel::Debug);
    assert_eq!(config.player.service_name, "org.mpris.MediaPlayer2.vlc");
    assert_eq!(config.player.call_timeout_ms, 2000);
    assert!(config.panel.show_inactive);
    assert!(config.panel.show_song);
}

#[test]
fn config_serialize_roundtrip() {
    let original = Config {
        player: PlayerConfig {
            call_timeout_ms: 500,
            enable_controls: false,
            ..PlayerConfig::default()
        },
        panel: PanelConfig {
            show_inactive: true,
            show_song: false,
            place: PanelPlace::Left,
            index: 3,
        },
        ..Config::default()
    };

    let toml_str = toml::to_string(&original).unwrap();
    let deserialized = Config::from_toml(&toml_str).unwrap();

    assert_eq!(original, deserialized);
}

#[test]
fn unknown_log_level_is_rejected() {
    let result = Config::from_toml(
        r#"
        [general]
        log_level = "loud"
    "#,
    );

    assert!(matches!(result, Err(NowPlayingError::TomlParseError { .. })));
}

mod validation {
    use super::*;

    fn invalid_component(toml_str: &str) -> String {
        match Config::from_toml(toml_str) {
            Err(NowPlayingError::ConfigValidation { component, .. }) => component,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn bad_service_name() {
        let component = invalid_component(
            r#"
            [player]
            service_name = "not a bus name"
        "#,
        );

        assert_eq!(component, "player.service_name");
    }

    #[test]
    fn bad_object_path() {
        let component = invalid_component(
            r#"
            [player]
            object_path = "org/mpris"
        "#,
        );

        assert_eq!(component, "player.object_path");
    }

    #[test]
    fn zero_timeout() {
        let component = invalid_component(
            r#"
            [player]
            call_timeout_ms = 0
        "#,
        );

        assert_eq!(component, "player.call_timeout_ms");
    }

    #[test]
    fn panel_index_out_of_range() {
        let component = invalid_component(
            r#"
            [panel]
            index = 21
        "#,
        );

        assert_eq!(component, "panel.index");
    }
}

#[test]
fn panel_placement_defaults_to_start_of_right_box() {
    let config = Config::from_toml("[panel]\nshow_inactive = true\n").unwrap();

    assert_eq!(config.panel.place, PanelPlace::Right);
    assert_eq!(config.panel.index, 0);
}

#[test]
fn panel_placement_is_read_from_toml() {
    let config = Config::from_toml(
        r#"
        [panel]
        place = "center"
        index = 2
    "#,
    )
    .unwrap();

    assert_eq!(config.panel.place, PanelPlace::Center);
    assert_eq!(config.panel.index, 2);
}

#[test]
fn unknown_panel_place_is_rejected() {
    let result = Config::from_toml("[panel]\nplace = \"top\"\n");

    assert!(matches!(result, Err(NowPlayingError::TomlParseError { .. })));
}

#[test]
fn player_config_converts_to_service_config() {
    let player = PlayerConfig {
        call_timeout_ms: 750,
        enable_controls: false,
        ..PlayerConfig::default()
    };

    let service = now_playing::Config::from(&player);

    assert_eq!(service.service_name, player.service_name);
    assert_eq!(service.object_path, player.object_path);
    assert_eq!(service.call_timeout, Duration::from_millis(750));
    assert!(!service.enable_controls);
}

#[test]
fn schema_lists_all_sections() {
    let schema = Config::schema_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&schema).unwrap();

    let properties = value["properties"].as_object().unwrap();
    assert!(properties.contains_key("general"));
    assert!(properties.contains_key("player"));
    assert!(properties.contains_key("panel"));
    for place in ["left", "center", "right"] {
        assert!(schema.contains(&format!("\"{place}\"")), "{place} missing");
    }
}

#[test]
fn log_level_display_matches_serialized_name() {
    for level in [
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
    ] {
        let config = Config {
            general: crate::config::GeneralConfig { log_level: level },
            ..Config::default()
        };
        let toml_str = toml::to_string(&config).unwrap();

        assert!(toml_str.contains(&format!("log_level = \"{level}\"")));
    }
}
