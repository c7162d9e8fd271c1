use std::{sync::Arc, time::Duration};

use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};
use zbus::Connection;

use super::{
    BusNameWatcher, ConnectionState, ControlFacade, ControlsGate, DbusMediaPlayerClient,
    MediaError, PlaybackStateTracker, PresenceCallback, PresenceState, PresenceWatcher,
    WatchHandle,
};

/// Default bus name of the watched player
pub const DEFAULT_SERVICE_NAME: &str = "org.mpris.MediaPlayer2.spotify";

/// Object path every MPRIS player exports
pub const DEFAULT_OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";

/// Configuration for the now playing service
#[derive(Debug, Clone)]
pub struct Config {
    /// Bus name of the player to follow
    pub service_name: String,

    /// Object path of the MPRIS interfaces
    pub object_path: String,

    /// Upper bound for every remote call
    pub call_timeout: Duration,

    /// Whether commands are sent at all
    pub enable_controls: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            object_path: DEFAULT_OBJECT_PATH.to_string(),
            call_timeout: Duration::from_secs(2),
            enable_controls: true,
        }
    }
}

/// Follows one MPRIS player on the session bus.
///
/// Wires presence watching, the playback tracker and the command facade
/// together. Register tracker handlers before calling `start` to receive the
/// initial state.
pub struct NowPlayingService {
    client: Arc<DbusMediaPlayerClient>,
    watcher: BusNameWatcher,
    tracker: Arc<PlaybackStateTracker<DbusMediaPlayerClient>>,
    controls: ControlFacade<DbusMediaPlayerClient>,
    watch: Option<WatchHandle>,
    driver: Option<JoinHandle<()>>,
}

impl NowPlayingService {
    /// Connect to the session bus and build all components without starting them.
    ///
    /// # Errors
    /// Returns `MediaError::InitializationFailed` if the D-Bus connection fails and
    /// `MediaError::DbusError` if the configured names are invalid.
    #[instrument(skip(config), fields(service = %config.service_name))]
    pub async fn new(config: Config) -> Result<Self, MediaError> {
        let connection = Connection::session().await.map_err(|e| {
            MediaError::InitializationFailed(format!("D-Bus connection failed: {e}"))
        })?;

        let client = Arc::new(
            DbusMediaPlayerClient::new(
                &connection,
                &config.service_name,
                &config.object_path,
                config.call_timeout,
            )
            .await?,
        );
        let watcher = BusNameWatcher::new(connection, config.service_name.clone());
        let tracker = Arc::new(PlaybackStateTracker::new(Arc::clone(&client)));

        let gate = ControlsGate::new(false);
        let gate_switch = gate.clone();
        let enable_controls = config.enable_controls;
        tracker.on_connection_changed(move |state| {
            gate_switch.set(enable_controls && *state == ConnectionState::Connected);
        });

        let controls = ControlFacade::new(Arc::clone(&client), gate);

        Ok(Self {
            client,
            watcher,
            tracker,
            controls,
            watch: None,
            driver: None,
        })
    }

    /// Reconcile with the player's current presence and begin following it.
    ///
    /// Calling it again while running does nothing.
    ///
    /// # Errors
    /// Returns `MediaError::SubscriptionFailure` if the player is running but its
    /// changes cannot be subscribed to, and `MediaError::InitializationFailed` if
    /// the presence watch cannot be set up.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> Result<(), MediaError> {
        if self.watch.is_some() {
            return Ok(());
        }

        info!("Starting now playing service");

        if self.driver.is_none() {
            let tracker = Arc::clone(&self.tracker);
            self.driver = Some(tokio::spawn(async move { tracker.run().await }));
        }

        // A failed subscription is reported once; the watch below still gets the
        // tracker connected on the next presence transition.
        let started = self.tracker.start().await;

        let on_open: PresenceCallback = {
            let inputs = self.tracker.inputs();
            Arc::new(move || inputs.presence(PresenceState::Open))
        };
        let on_close: PresenceCallback = {
            let inputs = self.tracker.inputs();
            Arc::new(move || inputs.presence(PresenceState::Closed))
        };

        self.watch = Some(self.watcher.watch(on_open, on_close).await?);
        started
    }

    /// Stop watching, drop the subscription and clear the cache.
    pub async fn shutdown(&mut self) {
        if let Some(watch) = self.watch.take() {
            self.watcher.unwatch(&watch);
        }

        self.tracker.stop().await;

        if let Some(driver) = self.driver.take() {
            driver.abort();
        }
        info!("Now playing service stopped");
    }

    /// The playback tracker, for registering event handlers
    pub fn tracker(&self) -> &Arc<PlaybackStateTracker<DbusMediaPlayerClient>> {
        &self.tracker
    }

    /// Playback commands
    pub fn controls(&self) -> &ControlFacade<DbusMediaPlayerClient> {
        &self.controls
    }

    /// The underlying player client
    pub fn client(&self) -> &Arc<DbusMediaPlayerClient> {
        &self.client
    }

    /// One-shot presence check of the watched player
    ///
    /// # Errors
    /// Returns `MediaError::DbusError` if the bus daemon cannot be queried.
    pub async fn presence(&self) -> Result<PresenceState, MediaError> {
        self.watcher.presence().await
    }
}

impl Drop for NowPlayingService {
    fn drop(&mut self) {
        if let Some(watch) = self.watch.take() {
            self.watcher.unwatch(&watch);
        }
        if let Some(driver) = self.driver.take() {
            warn!("Now playing service dropped without shutdown");
            driver.abort();
        }
    }
}
