use tracing::instrument;

use crate::{
    cli::{CliError, CommandResult},
    config::PlayerConfig,
    services::now_playing::{NowPlayingService, PlayerCommand, PresenceState},
};

/// Send a single command and wait for the player to accept it
///
/// # Errors
///
/// Returns CliError if controls are disabled, the player is not running, or
/// the call fails
#[instrument(skip(config), fields(service = %config.service_name))]
pub async fn send(config: &PlayerConfig, command: PlayerCommand) -> CommandResult {
    if !config.enable_controls {
        return Err(CliError::ControlsDisabled);
    }

    let service = NowPlayingService::new(config.into()).await?;
    if service.presence().await? == PresenceState::Closed {
        return Err(CliError::PlayerNotRunning(config.service_name.clone()));
    }

    service.client().execute(command).await?;

    Ok(format!("Sent {command} to {}", config.service_name))
}
