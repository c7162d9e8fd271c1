use std::sync::{
    Arc, Mutex as SyncMutex, MutexGuard, PoisonError,
    atomic::{AtomicU64, Ordering},
};

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, instrument, warn};

use super::{
    ChangeHandler, ChangedProperties, ConnectionState, METADATA_PROPERTY, MediaError,
    MediaPlayerClient, PLAYBACK_STATUS_PROPERTY, PlaybackStatus, PresenceState,
    SubscriptionHandle, Track, metadata,
};
use crate::services::common::{EventPublisher, HandlerId};

/// Work items processed by the tracker strictly in arrival order
#[derive(Debug)]
pub enum TrackerInput {
    /// The watched service appeared or vanished
    Presence(PresenceState),

    /// A property change notification from the subscription of `generation`
    Changed {
        /// Connect cycle that produced the subscription
        generation: u64,
        /// Raw notification payload
        changes: ChangedProperties,
    },

    /// Teardown requested with [`PlaybackStateTracker::cancel`]
    Stop,
}

/// Sending side of the tracker's input queue, handed to watcher callbacks
#[derive(Debug, Clone)]
pub struct TrackerInputs {
    tx: mpsc::UnboundedSender<TrackerInput>,
}

impl TrackerInputs {
    /// Queue a presence transition
    pub fn presence(&self, state: PresenceState) {
        if self.tx.send(TrackerInput::Presence(state)).is_err() {
            debug!("Tracker is gone, dropping presence {state:?}");
        }
    }
}

/// Point-in-time view of the tracker
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerSnapshot {
    /// Current connection state
    pub connection: ConnectionState,
    /// Last emitted playback status
    pub status: Option<PlaybackStatus>,
    /// Last emitted track
    pub track: Option<Track>,
    /// Whether a change subscription is held
    pub subscribed: bool,
}

#[derive(Debug, Default)]
struct TrackerState {
    connection: ConnectionState,
    status: Option<PlaybackStatus>,
    track: Option<Track>,
    subscription: Option<SubscriptionHandle>,
    generation: u64,
}

impl TrackerState {
    fn clear_cache(&mut self) {
        self.status = None;
        self.track = None;
    }
}

/// Keeps the last known playback status and track of one player in sync.
///
/// Two states only: `Disconnected` (no subscription, empty cache) and
/// `Connected`. Change events are emitted only when the new value differs from
/// the cached one: by status value, or by track title.
///
/// Handlers registered with the `on_*` methods run while the tracker state is
/// locked; they must not await tracker methods inline. To tear down from a
/// handler, call [`cancel`](Self::cancel).
pub struct PlaybackStateTracker<C: MediaPlayerClient> {
    client: Arc<C>,
    state: Mutex<TrackerState>,
    live: SyncMutex<Option<SubscriptionHandle>>,
    delivering: AtomicU64,
    inputs_tx: mpsc::UnboundedSender<TrackerInput>,
    inputs_rx: Mutex<mpsc::UnboundedReceiver<TrackerInput>>,
    playback_status_changed: EventPublisher<PlaybackStatus>,
    song_changed: EventPublisher<Track>,
    connection_changed: EventPublisher<ConnectionState>,
}

impl<C: MediaPlayerClient> PlaybackStateTracker<C> {
    /// Create a disconnected tracker for `client`
    pub fn new(client: Arc<C>) -> Self {
        let (inputs_tx, inputs_rx) = mpsc::unbounded_channel();

        Self {
            client,
            state: Mutex::new(TrackerState::default()),
            live: SyncMutex::new(None),
            delivering: AtomicU64::new(0),
            inputs_tx,
            inputs_rx: Mutex::new(inputs_rx),
            playback_status_changed: EventPublisher::new(),
            song_changed: EventPublisher::new(),
            connection_changed: EventPublisher::new(),
        }
    }

    /// Queue handle for presence callbacks
    pub fn inputs(&self) -> TrackerInputs {
        TrackerInputs {
            tx: self.inputs_tx.clone(),
        }
    }

    /// Register a handler for playback status changes
    pub fn on_playback_status_changed(
        &self,
        handler: impl Fn(&PlaybackStatus) + Send + Sync + 'static,
    ) -> HandlerId {
        self.playback_status_changed.subscribe(handler)
    }

    /// Register a handler for song changes
    pub fn on_song_changed(&self, handler: impl Fn(&Track) + Send + Sync + 'static) -> HandlerId {
        self.song_changed.subscribe(handler)
    }

    /// Register a handler for connect/disconnect transitions
    pub fn on_connection_changed(
        &self,
        handler: impl Fn(&ConnectionState) + Send + Sync + 'static,
    ) -> HandlerId {
        self.connection_changed.subscribe(handler)
    }

    /// Remove a handler registered with any of the `on_*` methods
    pub fn remove_handler(&self, id: HandlerId) -> bool {
        self.playback_status_changed.unsubscribe(id)
            || self.song_changed.unsubscribe(id)
            || self.connection_changed.unsubscribe(id)
    }

    /// Current connection state
    pub async fn connection_state(&self) -> ConnectionState {
        self.state.lock().await.connection
    }

    /// Current state and cache contents
    pub async fn snapshot(&self) -> TrackerSnapshot {
        let state = self.state.lock().await;
        TrackerSnapshot {
            connection: state.connection,
            status: state.status,
            track: state.track.clone(),
            subscribed: state.subscription.is_some(),
        }
    }

    /// Move to whatever state the player's presence currently indicates.
    ///
    /// Calling it again without a presence change does nothing.
    ///
    /// # Errors
    /// Returns `MediaError::SubscriptionFailure` if the player is present but the
    /// change subscription cannot be registered; the tracker stays disconnected.
    #[instrument(skip(self), fields(service = %self.client.service_name()))]
    pub async fn start(&self) -> Result<(), MediaError> {
        let presence = PresenceState::from(self.client.is_open().await);
        debug!("Initial presence: {presence:?}");
        self.handle_presence(presence).await
    }

    /// Force the tracker into `Disconnected`. Idempotent.
    #[instrument(skip(self), fields(service = %self.client.service_name()))]
    pub async fn stop(&self) {
        self.disconnect().await;
    }

    /// Stop delivery immediately, without awaiting. Safe inside event handlers.
    ///
    /// The subscription is cancelled and no further change event is emitted
    /// once this returns. Clearing the cache and emitting `Disconnected` happen
    /// when the input queue reaches the request.
    pub fn cancel(&self) {
        self.delivering.store(0, Ordering::Release);
        let live = self.live().take();
        if let Some(subscription) = live {
            self.client.unsubscribe(&subscription);
        }
        if self.inputs_tx.send(TrackerInput::Stop).is_err() {
            debug!("Tracker is gone, dropping stop request");
        }
    }

    /// Apply a presence transition
    ///
    /// # Errors
    /// Returns `MediaError::SubscriptionFailure` if connecting fails.
    pub async fn handle_presence(&self, presence: PresenceState) -> Result<(), MediaError> {
        match presence {
            PresenceState::Open => self.connect().await,
            PresenceState::Closed => {
                self.disconnect().await;
                Ok(())
            }
        }
    }

    /// Apply a change notification to the current subscription
    pub async fn handle_properties_changed(&self, changes: ChangedProperties) {
        let generation = self.state.lock().await.generation;
        self.apply_changes(generation, changes).await;
    }

    /// Process one queued input
    ///
    /// # Errors
    /// Returns the error of a failed connect triggered by a presence input.
    pub async fn process(&self, input: TrackerInput) -> Result<(), MediaError> {
        match input {
            TrackerInput::Presence(presence) => self.handle_presence(presence).await,
            TrackerInput::Changed {
                generation,
                changes,
            } => {
                self.apply_changes(generation, changes).await;
                Ok(())
            }
            TrackerInput::Stop => {
                self.disconnect().await;
                Ok(())
            }
        }
    }

    /// Process every input queued so far without waiting for more.
    ///
    /// For hosts that drive the tracker themselves instead of spawning `run`.
    /// Returns how many inputs were processed; 0 without waiting while `run`
    /// owns the queue.
    pub async fn process_pending(&self) -> usize {
        let Ok(mut inputs) = self.inputs_rx.try_lock() else {
            debug!("Inputs are drained by the running driver");
            return 0;
        };

        let mut processed = 0;
        loop {
            let Ok(input) = inputs.try_recv() else {
                return processed;
            };
            if let Err(e) = self.process(input).await {
                warn!("Failed to process tracker input: {e}");
            }
            processed += 1;
        }
    }

    /// Process queued inputs forever, one at a time in arrival order.
    pub async fn run(&self) {
        let mut inputs = self.inputs_rx.lock().await;
        while let Some(input) = inputs.recv().await {
            if let Err(e) = self.process(input).await {
                warn!("Failed to process tracker input: {e}");
            }
        }
    }

    async fn connect(&self) -> Result<(), MediaError> {
        let mut state = self.state.lock().await;
        if state.connection == ConnectionState::Connected {
            debug!("Already connected");
            return Ok(());
        }

        let status = self.read_status().await;
        let track = self.read_track().await;

        let generation = state.generation.wrapping_add(1).max(1);
        let inputs = self.inputs_tx.clone();
        let handler: ChangeHandler = Arc::new(move |changes| {
            let changed = TrackerInput::Changed {
                generation,
                changes,
            };
            if inputs.send(changed).is_err() {
                debug!("Tracker is gone, dropping notification");
            }
        });

        let subscription = match self.client.subscribe_to_changes(handler).await {
            Ok(subscription) => subscription,
            Err(e) => {
                warn!("Staying disconnected: {e}");
                state.clear_cache();
                return Err(match e {
                    MediaError::SubscriptionFailure(_) => e,
                    other => MediaError::SubscriptionFailure(other.to_string()),
                });
            }
        };

        state.generation = generation;
        *self.live() = Some(subscription.clone());
        self.delivering.store(generation, Ordering::Release);
        state.subscription = Some(subscription);
        state.connection = ConnectionState::Connected;
        info!("Connected to {}", self.client.service_name());
        self.connection_changed.emit(&ConnectionState::Connected);

        if let Some(status) = status.filter(|_| self.is_delivering(generation)) {
            self.apply_status(&mut state, status);
        }
        if let Some(track) = track.filter(|_| self.is_delivering(generation)) {
            self.apply_track(&mut state, track);
        }

        Ok(())
    }

    async fn disconnect(&self) {
        let mut state = self.state.lock().await;

        self.delivering.store(0, Ordering::Release);
        self.live().take();
        if let Some(subscription) = state.subscription.take() {
            self.client.unsubscribe(&subscription);
        }
        state.clear_cache();

        if state.connection == ConnectionState::Connected {
            state.connection = ConnectionState::Disconnected;
            info!("Disconnected from {}", self.client.service_name());
            self.connection_changed
                .emit(&ConnectionState::Disconnected);
        }
    }

    async fn apply_changes(&self, generation: u64, changes: ChangedProperties) {
        let mut state = self.state.lock().await;

        if state.connection != ConnectionState::Connected
            || state.generation != generation
            || !self.is_delivering(generation)
        {
            debug!("Dropping notification from a torn down subscription");
            return;
        }
        if !changes.is_player_interface() {
            return;
        }

        if let Some(value) = changes.changed.get(PLAYBACK_STATUS_PROPERTY) {
            match metadata::decode_playback_status(value) {
                Ok(status) => self.apply_status(&mut state, status),
                Err(e) => warn!("Skipping playback status update: {e}"),
            }
        } else if changes.is_invalidated(PLAYBACK_STATUS_PROPERTY) {
            if let Some(status) = self.read_status().await {
                self.apply_status(&mut state, status);
            }
        }

        if !self.is_delivering(generation) {
            debug!("Delivery cancelled mid-notification");
            return;
        }

        if let Some(value) = changes.changed.get(METADATA_PROPERTY) {
            match metadata::decode_track(value) {
                Ok(track) => self.apply_track(&mut state, track),
                Err(e) => warn!("Skipping metadata update: {e}"),
            }
        } else if changes.is_invalidated(METADATA_PROPERTY) {
            if let Some(track) = self.read_track().await {
                self.apply_track(&mut state, track);
            }
        }
    }

    fn is_delivering(&self, generation: u64) -> bool {
        self.delivering.load(Ordering::Acquire) == generation
    }

    fn live(&self) -> MutexGuard<'_, Option<SubscriptionHandle>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn apply_status(&self, state: &mut TrackerState, status: PlaybackStatus) {
        if state.status == Some(status) {
            debug!("Playback status unchanged: {status}");
            return;
        }

        state.status = Some(status);
        self.playback_status_changed.emit(&status);
    }

    fn apply_track(&self, state: &mut TrackerState, track: Track) {
        if state
            .track
            .as_ref()
            .is_some_and(|cached| cached.same_song(&track))
        {
            debug!("Song unchanged: {}", track.title);
            return;
        }

        self.song_changed.emit(&track);
        state.track = Some(track);
    }

    async fn read_status(&self) -> Option<PlaybackStatus> {
        match self.client.playback_status().await {
            Ok(status) => Some(status),
            Err(e) if e.is_unavailable() => {
                debug!("Playback status not available: {e}");
                None
            }
            Err(e) => {
                warn!("Ignoring playback status: {e}");
                None
            }
        }
    }

    async fn read_track(&self) -> Option<Track> {
        match self.client.current_track().await {
            Ok(track) => Some(track),
            Err(e) if e.is_unavailable() => {
                debug!("Track metadata not available: {e}");
                None
            }
            Err(e) => {
                warn!("Ignoring track metadata: {e}");
                None
            }
        }
    }
}
