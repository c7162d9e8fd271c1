//! Integration tests for loading the config file from disk.

#![allow(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::panic))]

use std::{fs, path::PathBuf};

use nowplaying::{
    NowPlayingError,
    config::{Config, ConfigPaths, LogLevel},
    services::now_playing,
};
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, content).unwrap();
    path
}

mod loading {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();

        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn loads_all_sections() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[general]
log_level = "trace"

[player]
service_name = "org.mpris.MediaPlayer2.vlc"
object_path = "/org/mpris/MediaPlayer2"
call_timeout_ms = 300
enable_controls = false

[panel]
show_inactive = true
show_song = false
"#,
        );

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.general.log_level, LogLevel::Trace);
        assert_eq!(config.player.service_name, "org.mpris.MediaPlayer2.vlc");
        assert_eq!(config.player.call_timeout_ms, 300);
        assert!(!config.player.enable_controls);
        assert!(config.panel.show_inactive);
        assert!(!config.panel.show_song);

        let service = now_playing::Config::from(&config.player);
        assert_eq!(service.call_timeout.as_millis(), 300);
    }

    #[test]
    fn empty_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "# nowplaying\n");

        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn invalid_toml_names_the_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[player\nservice_name = ");

        match Config::load_from(&path) {
            Err(NowPlayingError::TomlParseError { location, .. }) => {
                assert!(location.ends_with("config.toml"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn wrong_type_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[panel]
show_song = "yes"
"#,
        );

        assert!(matches!(
            Config::load_from(&path),
            Err(NowPlayingError::TomlParseError { .. })
        ));
    }

    #[test]
    fn invalid_values_fail_validation() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[player]
call_timeout_ms = 0
"#,
        );

        assert!(matches!(
            Config::load_from(&path),
            Err(NowPlayingError::ConfigValidation { .. })
        ));
    }

    #[test]
    fn unreadable_path_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::create_dir_all(&path).unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(NowPlayingError::IoError { .. })
        ));
    }
}

#[test]
fn default_location_follows_xdg_config_home() {
    let dir = TempDir::new().unwrap();
    unsafe {
        std::env::set_var("XDG_CONFIG_HOME", dir.path());
    }

    let expected = dir.path().join("nowplaying").join("config.toml");
    assert_eq!(ConfigPaths::main_config().unwrap(), expected);

    fs::create_dir_all(expected.parent().unwrap()).unwrap();
    fs::write(&expected, "[panel]\nshow_inactive = true\n").unwrap();

    assert!(Config::load().unwrap().panel.show_inactive);
}
