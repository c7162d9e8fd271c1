use thiserror::Error;

use crate::{NowPlayingError, services::now_playing::MediaError};

/// Errors that can occur during CLI command execution.
#[derive(Error, Debug)]
pub enum CliError {
    /// The configured player does not own its bus name.
    #[error("{0} is not running")]
    PlayerNotRunning(String),

    /// Playback commands are switched off in the config.
    #[error("Controls are disabled in the configuration (player.enable_controls)")]
    ControlsDisabled,

    /// The configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The media service failed.
    #[error("{service} service error: {details}")]
    ServiceError {
        /// Name of the failing service
        service: String,
        /// What went wrong
        details: String,
    },

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<MediaError> for CliError {
    fn from(error: MediaError) -> Self {
        CliError::ServiceError {
            service: "Media".to_string(),
            details: error.to_string(),
        }
    }
}

impl From<NowPlayingError> for CliError {
    fn from(error: NowPlayingError) -> Self {
        match error {
            NowPlayingError::Media(media) => media.into(),
            other => CliError::ConfigError(other.to_string()),
        }
    }
}

/// Type alias for command execution results.
///
/// Commands return the text to print on success.
pub type CommandResult = Result<String, CliError>;
