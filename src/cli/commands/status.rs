use tracing::{debug, instrument};

use crate::{
    cli::{
        CommandResult,
        formatting::{format_field, format_header},
    },
    config::PlayerConfig,
    services::now_playing::{MediaPlayerClient, NowPlayingService, PresenceState},
};

/// Describe the player's presence, status and current track
///
/// # Errors
///
/// Returns CliError if the session bus cannot be reached
#[instrument(skip(config), fields(service = %config.service_name))]
pub async fn status(config: &PlayerConfig) -> CommandResult {
    let service = NowPlayingService::new(config.into()).await?;
    let client = service.client();

    if service.presence().await? == PresenceState::Closed {
        return Ok(format!("{} is not running", config.service_name));
    }

    let name = match client.identity().await {
        Ok(identity) => identity,
        Err(e) => {
            debug!("No identity: {e}");
            config.service_name.clone()
        }
    };

    let mut lines = vec![format_header(&name)];

    match client.playback_status().await {
        Ok(status) => lines.push(format_field("Status", &status.to_string())),
        Err(e) => lines.push(format_field("Status", &format!("unknown ({e})"))),
    }

    match client.current_track().await {
        Ok(track) => {
            lines.push(format_field("Title", &track.title));
            lines.push(format_field("Album", &track.album));
            lines.push(format_field("Artists", &track.artists_label()));
            lines.push(format_field("Art", &track.art_url));
        }
        Err(e) => lines.push(format_field("Track", &format!("unknown ({e})"))),
    }

    Ok(lines.join("\n"))
}
