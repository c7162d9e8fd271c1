use std::time::Duration;

use zbus::fdo;

/// Errors that can occur while talking to the remote media player
#[derive(thiserror::Error, Debug)]
pub enum MediaError {
    /// The service name has no owner on the bus
    #[error("Media player {0} is not running")]
    RemoteUnavailable(String),

    /// A metadata map could not be decoded into a track
    #[error("Malformed track metadata: {0}")]
    MalformedMetadata(String),

    /// The playback status property held an unknown or mistyped value
    #[error("Malformed playback status: {0}")]
    MalformedPlaybackStatus(String),

    /// Registering for property change notifications failed
    #[error("Failed to subscribe to player changes: {0}")]
    SubscriptionFailure(String),

    /// A remote call did not complete within the configured timeout
    #[error("Remote call timed out after {0:?}")]
    Timeout(Duration),

    /// D-Bus communication error
    #[error("D-Bus operation failed: {0}")]
    DbusError(#[from] zbus::Error),

    /// Failed to initialize the now playing service
    #[error("Failed to initialize now playing service: {0}")]
    InitializationFailed(String),
}

impl MediaError {
    /// Map a failed `org.freedesktop.DBus.Properties` call to a media error.
    ///
    /// Errors meaning "nobody is there" become `RemoteUnavailable`.
    pub fn from_fdo(service_name: &str, error: fdo::Error) -> Self {
        match error {
            fdo::Error::ServiceUnknown(_)
            | fdo::Error::NameHasNoOwner(_)
            | fdo::Error::UnknownObject(_)
            | fdo::Error::NoReply(_)
            | fdo::Error::Disconnected(_) => Self::RemoteUnavailable(service_name.to_string()),
            other => Self::DbusError(other.into()),
        }
    }

    /// Whether the error only means the player is not reachable right now
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::RemoteUnavailable(_) | Self::Timeout(_))
    }
}
