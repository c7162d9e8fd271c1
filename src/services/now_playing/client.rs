use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use async_trait::async_trait;

use super::{ChangedProperties, MediaError, PlaybackStatus, PlayerCommand, Track};

/// Callback receiving raw `PropertiesChanged` payloads of the player interface
pub type ChangeHandler = Arc<dyn Fn(ChangedProperties) + Send + Sync>;

static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

/// Handle to a live property change subscription.
///
/// Clones share the same liveness flag, so deactivating any clone stops
/// delivery for all of them.
#[derive(Debug, Clone)]
pub struct SubscriptionHandle {
    id: u64,
    active: Arc<AtomicBool>,
}

impl SubscriptionHandle {
    /// Create a new, active handle with a process-unique id
    pub fn new() -> Self {
        Self {
            id: NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed),
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Process-unique id of the subscription
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether notifications may still be delivered through this subscription
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Mark the subscription as cancelled.
    ///
    /// Returns true only for the call that actually deactivated it.
    pub fn deactivate(&self) -> bool {
        self.active.swap(false, Ordering::AcqRel)
    }
}

impl Default for SubscriptionHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Connection to one named remote media player.
///
/// Reads are awaited round-trips; commands are fire-and-forget.
#[async_trait]
pub trait MediaPlayerClient: Send + Sync + 'static {
    /// Bus name of the remote service
    fn service_name(&self) -> &str;

    /// Whether the remote player currently answers property reads.
    ///
    /// Absence of the service is a normal condition and yields `false`.
    async fn is_open(&self) -> bool;

    /// Read the current playback status
    ///
    /// # Errors
    /// Returns `MediaError::RemoteUnavailable` if the service is absent and
    /// `MediaError::MalformedPlaybackStatus` if the value cannot be decoded.
    async fn playback_status(&self) -> Result<PlaybackStatus, MediaError>;

    /// Read and decode the metadata of the current track
    ///
    /// # Errors
    /// Returns `MediaError::RemoteUnavailable` if the service is absent and
    /// `MediaError::MalformedMetadata` if required fields are missing.
    async fn current_track(&self) -> Result<Track, MediaError>;

    /// Send a command without waiting for its outcome.
    ///
    /// Failures are logged, never returned.
    async fn send_command(&self, command: PlayerCommand);

    /// Register the single change handler of this client.
    ///
    /// Any previous subscription is cancelled first.
    ///
    /// # Errors
    /// Returns `MediaError::SubscriptionFailure` if the signal match could not be registered.
    async fn subscribe_to_changes(
        &self,
        handler: ChangeHandler,
    ) -> Result<SubscriptionHandle, MediaError>;

    /// Cancel a subscription. Safe to call repeatedly and from inside the handler.
    fn unsubscribe(&self, handle: &SubscriptionHandle);
}
