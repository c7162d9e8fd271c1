use std::{
    future::Future,
    sync::{Mutex, PoisonError},
    time::Duration,
};

use async_trait::async_trait;
use futures::StreamExt;
use tokio::{task::JoinHandle, time::timeout};
use tracing::{Instrument, debug, info_span, instrument, warn};
use zbus::{
    Connection, fdo,
    fdo::PropertiesChanged,
    names::InterfaceName,
    proxy::CacheProperties,
    zvariant::OwnedValue,
};

use super::{
    ChangeHandler, ChangedProperties, MediaError, MediaPlayer2PlayerProxy, MediaPlayer2Proxy,
    MediaPlayerClient, METADATA_PROPERTY, PLAYBACK_STATUS_PROPERTY, PLAYER_INTERFACE,
    PlaybackStatus, PlayerCommand, SubscriptionHandle, Track, metadata,
};

struct LiveSubscription {
    handle: SubscriptionHandle,
    task: JoinHandle<()>,
}

/// `MediaPlayerClient` backed by the D-Bus session bus.
///
/// Proxies are built without property caching so that construction succeeds
/// while the player is not running.
pub struct DbusMediaPlayerClient {
    service_name: String,
    properties: fdo::PropertiesProxy<'static>,
    root: MediaPlayer2Proxy<'static>,
    player: MediaPlayer2PlayerProxy<'static>,
    call_timeout: Duration,
    subscription: Mutex<Option<LiveSubscription>>,
}

impl DbusMediaPlayerClient {
    /// Create a client for the player owning `service_name` at `object_path`
    ///
    /// # Errors
    /// Returns `MediaError::DbusError` if the names are invalid or proxy creation fails
    pub async fn new(
        connection: &Connection,
        service_name: &str,
        object_path: &str,
        call_timeout: Duration,
    ) -> Result<Self, MediaError> {
        let properties = fdo::PropertiesProxy::builder(connection)
            .destination(service_name.to_string())?
            .path(object_path.to_string())?
            .cache_properties(CacheProperties::No)
            .build()
            .await?;

        let root = MediaPlayer2Proxy::builder(connection)
            .destination(service_name.to_string())?
            .path(object_path.to_string())?
            .cache_properties(CacheProperties::No)
            .build()
            .await?;

        let player = MediaPlayer2PlayerProxy::builder(connection)
            .destination(service_name.to_string())?
            .path(object_path.to_string())?
            .cache_properties(CacheProperties::No)
            .build()
            .await?;

        Ok(Self {
            service_name: service_name.to_string(),
            properties,
            root,
            player,
            call_timeout,
            subscription: Mutex::new(None),
        })
    }

    /// Human-readable name the player reports for itself
    ///
    /// # Errors
    /// Returns `MediaError::Timeout` or `MediaError::DbusError` if the read fails
    pub async fn identity(&self) -> Result<String, MediaError> {
        self.bounded(self.root.identity())
            .await?
            .map_err(MediaError::DbusError)
    }

    /// Send `command` and wait for the player to acknowledge it
    ///
    /// Unlike `send_command` the outcome is returned, for one-shot callers that
    /// exit right after.
    ///
    /// # Errors
    /// Returns `MediaError::Timeout` or `MediaError::DbusError` if the call fails
    #[instrument(skip(self), fields(service = %self.service_name))]
    pub async fn execute(&self, command: PlayerCommand) -> Result<(), MediaError> {
        self.bounded(dispatch(&self.root, &self.player, command))
            .await?
            .map_err(MediaError::DbusError)
    }

    async fn bounded<F: Future>(&self, call: F) -> Result<F::Output, MediaError> {
        timeout(self.call_timeout, call)
            .await
            .map_err(|_| MediaError::Timeout(self.call_timeout))
    }

    async fn read_property(&self, property: &str) -> Result<OwnedValue, MediaError> {
        let interface = InterfaceName::from_static_str_unchecked(PLAYER_INTERFACE);
        self.bounded(self.properties.get(interface, property))
            .await?
            .map_err(|e| MediaError::from_fdo(&self.service_name, e))
    }

    fn replace_subscription(&self, next: Option<LiveSubscription>) {
        let mut current = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(previous) = current.take() {
            previous.handle.deactivate();
            previous.task.abort();
        }
        *current = next;
    }
}

#[async_trait]
impl MediaPlayerClient for DbusMediaPlayerClient {
    fn service_name(&self) -> &str {
        &self.service_name
    }

    async fn is_open(&self) -> bool {
        self.read_property(PLAYBACK_STATUS_PROPERTY).await.is_ok()
    }

    #[instrument(skip(self), fields(service = %self.service_name))]
    async fn playback_status(&self) -> Result<PlaybackStatus, MediaError> {
        let value = self.read_property(PLAYBACK_STATUS_PROPERTY).await?;
        metadata::decode_playback_status(&value)
    }

    #[instrument(skip(self), fields(service = %self.service_name))]
    async fn current_track(&self) -> Result<Track, MediaError> {
        let value = self.read_property(METADATA_PROPERTY).await?;
        metadata::decode_track(&value)
    }

    async fn send_command(&self, command: PlayerCommand) {
        let root = self.root.clone();
        let player = self.player.clone();
        let call_timeout = self.call_timeout;
        let span = info_span!("send_command", service = %self.service_name, %command);

        tokio::spawn(
            async move {
                match timeout(call_timeout, dispatch(&root, &player, command)).await {
                    Ok(Ok(())) => debug!("Command delivered"),
                    Ok(Err(e)) => warn!("Command failed: {e}"),
                    Err(_) => warn!("Command timed out after {call_timeout:?}"),
                }
            }
            .instrument(span),
        );
    }

    #[instrument(skip(self, handler), fields(service = %self.service_name))]
    async fn subscribe_to_changes(
        &self,
        handler: ChangeHandler,
    ) -> Result<SubscriptionHandle, MediaError> {
        self.replace_subscription(None);

        let mut changes = self
            .bounded(self.properties.receive_properties_changed())
            .await
            .map_err(|e| MediaError::SubscriptionFailure(e.to_string()))?
            .map_err(|e| MediaError::SubscriptionFailure(e.to_string()))?;

        let handle = SubscriptionHandle::new();
        let task_handle = handle.clone();
        let service = self.service_name.clone();

        let task = tokio::spawn(async move {
            while let Some(signal) = changes.next().await {
                if !task_handle.is_active() {
                    break;
                }

                let Some(payload) = changed_payload(&signal) else {
                    continue;
                };

                if payload.is_player_interface() {
                    handler(payload);
                }
            }
            debug!("Property change stream ended for {service}");
        });

        self.replace_subscription(Some(LiveSubscription {
            handle: handle.clone(),
            task,
        }));

        debug!(subscription = handle.id(), "Subscribed to property changes");
        Ok(handle)
    }

    fn unsubscribe(&self, handle: &SubscriptionHandle) {
        if !handle.deactivate() {
            return;
        }

        let mut current = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if current
            .as_ref()
            .is_some_and(|live| live.handle.id() == handle.id())
        {
            if let Some(live) = current.take() {
                live.task.abort();
            }
            debug!(subscription = handle.id(), "Unsubscribed from property changes");
        }
    }
}

impl Drop for DbusMediaPlayerClient {
    fn drop(&mut self) {
        self.replace_subscription(None);
    }
}

async fn dispatch(
    root: &MediaPlayer2Proxy<'_>,
    player: &MediaPlayer2PlayerProxy<'_>,
    command: PlayerCommand,
) -> zbus::Result<()> {
    match command {
        PlayerCommand::Next => player.next().await,
        PlayerCommand::Previous => player.previous().await,
        PlayerCommand::PlayPause => player.play_pause().await,
        PlayerCommand::Raise => root.raise().await,
        PlayerCommand::Quit => root.quit().await,
    }
}

fn changed_payload(signal: &PropertiesChanged) -> Option<ChangedProperties> {
    let args = match signal.args() {
        Ok(args) => args,
        Err(e) => {
            warn!("Ignoring undecodable PropertiesChanged signal: {e}");
            return None;
        }
    };

    let changed = args
        .changed_properties()
        .iter()
        .filter_map(|(name, value)| match value.try_to_owned() {
            Ok(value) => Some((name.to_string(), value)),
            Err(e) => {
                warn!("Skipping property {name}: {e}");
                None
            }
        })
        .collect();

    Some(ChangedProperties {
        interface_name: args.interface_name().to_string(),
        changed,
        invalidated: args
            .invalidated_properties()
            .iter()
            .map(|name| name.to_string())
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::collections::HashMap;

    use zbus::{Message, zvariant::Value};

    use super::*;

    fn signal(
        interface: &str,
        changed: HashMap<&str, Value<'_>>,
        invalidated: Vec<&str>,
    ) -> PropertiesChanged {
        let message = Message::signal(
            "/org/mpris/MediaPlayer2",
            "org.freedesktop.DBus.Properties",
            "PropertiesChanged",
        )
        .unwrap()
        .build(&(interface, changed, invalidated))
        .unwrap();
        PropertiesChanged::from_message(message).unwrap()
    }

    #[test]
    fn payload_keeps_changed_and_invalidated_properties() {
        let changed = HashMap::from([(PLAYBACK_STATUS_PROPERTY, Value::from("Paused"))]);
        let payload =
            changed_payload(&signal(PLAYER_INTERFACE, changed, vec![METADATA_PROPERTY])).unwrap();

        assert!(payload.is_player_interface());
        let status = &payload.changed[PLAYBACK_STATUS_PROPERTY];
        assert_eq!(
            metadata::decode_playback_status(status).unwrap(),
            PlaybackStatus::Paused
        );
        assert!(payload.is_invalidated(METADATA_PROPERTY));
        assert!(!payload.is_invalidated(PLAYBACK_STATUS_PROPERTY));
    }

    #[test]
    fn payload_reports_the_emitting_interface() {
        let payload = changed_payload(&signal(
            "org.mpris.MediaPlayer2.TrackList",
            HashMap::new(),
            Vec::new(),
        ))
        .unwrap();

        assert!(!payload.is_player_interface());
        assert!(payload.changed.is_empty());
    }
}
