use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tracing::debug;

use super::{MediaPlayerClient, PlayerCommand};

/// Shared on/off switch deciding whether commands reach the player.
///
/// Owned by the host: it is switched on while the tracker is connected and
/// off while it is disconnected.
#[derive(Debug, Clone, Default)]
pub struct ControlsGate(Arc<AtomicBool>);

impl ControlsGate {
    /// Create a gate in the given position
    pub fn new(enabled: bool) -> Self {
        Self(Arc::new(AtomicBool::new(enabled)))
    }

    /// Whether commands are currently let through
    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Open or close the gate
    pub fn set(&self, enabled: bool) {
        self.0.store(enabled, Ordering::Release);
    }
}

/// User-facing playback commands.
///
/// Commands are fire-and-forget; the UI learns the outcome from the next
/// change notification.
pub struct ControlFacade<C: MediaPlayerClient> {
    client: Arc<C>,
    gate: ControlsGate,
}

impl<C: MediaPlayerClient> ControlFacade<C> {
    /// Create a facade sending through `client` whenever `gate` is enabled
    pub fn new(client: Arc<C>, gate: ControlsGate) -> Self {
        Self { client, gate }
    }

    /// Whether commands currently reach the player
    pub fn is_enabled(&self) -> bool {
        self.gate.is_enabled()
    }

    /// Toggle play/pause
    pub async fn toggle(&self) {
        self.send(PlayerCommand::PlayPause).await;
    }

    /// Skip to the next track
    pub async fn next(&self) {
        self.send(PlayerCommand::Next).await;
    }

    /// Go back to the previous track
    pub async fn previous(&self) {
        self.send(PlayerCommand::Previous).await;
    }

    /// Bring the player window to the front
    pub async fn raise(&self) {
        self.send(PlayerCommand::Raise).await;
    }

    /// Ask the player to exit
    pub async fn quit(&self) {
        self.send(PlayerCommand::Quit).await;
    }

    async fn send(&self, command: PlayerCommand) {
        if !self.gate.is_enabled() {
            debug!(%command, "Controls disabled, not sending");
            return;
        }
        self.client.send_command(command).await;
    }
}
