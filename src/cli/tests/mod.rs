//! Unit tests for argument parsing and the commands that need no bus.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::path::PathBuf;

use clap::Parser;

use crate::{
    NowPlayingError,
    cli::{Cli, CliError, Command, ConfigCommand, PanelAction, formatting},
    config::Config,
    services::now_playing::{MediaError, PlayerCommand},
};

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("nowplaying").chain(args.iter().copied())).unwrap()
}

mod parsing {
    use super::*;

    #[test]
    fn subcommands() {
        assert_eq!(parse(&["watch"]).command, Command::Watch);
        assert_eq!(parse(&["status"]).command, Command::Status);
        assert_eq!(parse(&["toggle"]).command, Command::Toggle);
        assert_eq!(
            parse(&["config", "schema"]).command,
            Command::Config {
                command: ConfigCommand::Schema
            }
        );
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = parse(&["next", "--player", "org.mpris.MediaPlayer2.vlc", "-c", "/tmp/np.toml"]);

        assert_eq!(cli.player.as_deref(), Some("org.mpris.MediaPlayer2.vlc"));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/np.toml")));
    }

    #[test]
    fn missing_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["nowplaying"]).is_err());
    }

    #[test]
    fn control_subcommands_map_to_player_commands() {
        assert_eq!(Command::Next.player_command(), Some(PlayerCommand::Next));
        assert_eq!(Command::Previous.player_command(), Some(PlayerCommand::Previous));
        assert_eq!(Command::Toggle.player_command(), Some(PlayerCommand::PlayPause));
        assert_eq!(Command::Raise.player_command(), Some(PlayerCommand::Raise));
        assert_eq!(Command::Quit.player_command(), Some(PlayerCommand::Quit));
        assert_eq!(Command::Watch.player_command(), None);
        assert_eq!(Command::Status.player_command(), None);
    }

    #[test]
    fn only_watch_is_long_running() {
        assert!(Command::Watch.is_long_running());
        assert!(!Command::Status.is_long_running());
    }
}

#[test]
fn panel_actions_from_keyboard() {
    assert_eq!("t".parse::<PanelAction>(), Ok(PanelAction::Toggle));
    assert_eq!(" Next \n".parse::<PanelAction>(), Ok(PanelAction::Next));
    assert_eq!("prev".parse::<PanelAction>(), Ok(PanelAction::Previous));
    assert_eq!("R".parse::<PanelAction>(), Ok(PanelAction::Raise));
    assert_eq!("quit".parse::<PanelAction>(), Ok(PanelAction::Quit));
    assert!("volume".parse::<PanelAction>().is_err());
}

#[test]
fn player_override_is_validated() {
    let dir = std::env::temp_dir().join("nowplaying-cli-tests-missing");
    let cli = parse(&[
        "status",
        "--config",
        dir.join("config.toml").to_str().unwrap(),
        "--player",
        "spotify",
    ]);

    assert!(matches!(
        cli.load_config(),
        Err(NowPlayingError::ConfigValidation { .. })
    ));
}

#[tokio::test]
async fn config_path_prints_explicit_path() {
    let cli = parse(&["config", "path", "--config", "/etc/nowplaying.toml"]);

    let output = cli.run(Ok(Config::default())).await.unwrap();

    assert_eq!(output, "/etc/nowplaying.toml");
}

#[tokio::test]
async fn config_schema_works_without_loaded_config() {
    let cli = parse(&["config", "schema"]);
    let broken = Err(NowPlayingError::ConfigValidation {
        component: "player.call_timeout_ms".to_string(),
        details: "must be greater than zero".to_string(),
    });

    let output = cli.run(broken).await.unwrap();

    assert!(output.contains("\"player\""));
}

#[tokio::test]
async fn other_commands_report_config_errors() {
    let cli = parse(&["status"]);
    let broken = Err(NowPlayingError::TomlParseError {
        location: "string".to_string(),
        details: "expected `=`".to_string(),
    });

    assert!(matches!(cli.run(broken).await, Err(CliError::ConfigError(_))));
}

#[tokio::test]
async fn disabled_controls_refuse_commands() {
    let mut config = Config::default();
    config.player.enable_controls = false;

    let result = parse(&["next"]).run(Ok(config)).await;

    assert!(matches!(result, Err(CliError::ControlsDisabled)));
}

#[test]
fn media_errors_become_service_errors() {
    let error: CliError = NowPlayingError::Media(MediaError::RemoteUnavailable(
        "org.mpris.MediaPlayer2.spotify".to_string(),
    ))
    .into();

    match error {
        CliError::ServiceError { service, details } => {
            assert_eq!(service, "Media");
            assert!(details.contains("not running"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn formatting_wraps_text_in_styles() {
    let error = formatting::format_error("boom");
    assert!(error.starts_with(formatting::Colors::BOLD));
    assert!(error.contains("boom"));
    assert!(error.ends_with(formatting::Colors::RESET));

    let field = formatting::format_field("Title", "Song");
    assert!(field.contains("Title:"));
    assert!(field.ends_with(" Song"));
}
