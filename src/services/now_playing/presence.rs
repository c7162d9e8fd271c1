use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use async_trait::async_trait;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use zbus::{Connection, fdo, names::BusName};

use super::{MediaError, PresenceState, SubscriptionHandle};

/// Callback invoked on a presence transition
pub type PresenceCallback = Arc<dyn Fn() + Send + Sync>;

/// Handle to an active presence watch
pub type WatchHandle = SubscriptionHandle;

/// Watches whether a bus name has an owner.
#[async_trait]
pub trait PresenceWatcher: Send + Sync + 'static {
    /// Start watching.
    ///
    /// The current presence is reported once right away, then `on_open` and
    /// `on_close` fire once per actual transition.
    ///
    /// # Errors
    /// Returns `MediaError::InitializationFailed` if the bus watch cannot be set up.
    async fn watch(
        &self,
        on_open: PresenceCallback,
        on_close: PresenceCallback,
    ) -> Result<WatchHandle, MediaError>;

    /// Stop watching. Idempotent.
    fn unwatch(&self, handle: &WatchHandle);
}

/// Collapses raw owner-change observations into open/close transitions.
#[derive(Debug, Default)]
pub struct PresenceTransitions {
    last: Option<PresenceState>,
}

impl PresenceTransitions {
    /// Record an observation, returning it only if it differs from the previous one
    pub fn observe(&mut self, state: PresenceState) -> Option<PresenceState> {
        if self.last == Some(state) {
            return None;
        }
        self.last = Some(state);
        Some(state)
    }
}

/// `PresenceWatcher` on top of `org.freedesktop.DBus` name ownership signals
pub struct BusNameWatcher {
    connection: Connection,
    service_name: String,
    watches: Mutex<HashMap<u64, JoinHandle<()>>>,
}

impl BusNameWatcher {
    /// Create a watcher for `service_name`
    pub fn new(connection: Connection, service_name: impl Into<String>) -> Self {
        Self {
            connection,
            service_name: service_name.into(),
            watches: Mutex::new(HashMap::new()),
        }
    }

    /// One-shot check whether the name currently has an owner
    ///
    /// # Errors
    /// Returns `MediaError::DbusError` if the bus daemon cannot be queried
    pub async fn presence(&self) -> Result<PresenceState, MediaError> {
        let dbus_proxy = fdo::DBusProxy::new(&self.connection).await?;
        let name = BusName::try_from(self.service_name.as_str()).map_err(zbus::Error::from)?;
        let has_owner = dbus_proxy
            .name_has_owner(name)
            .await
            .map_err(zbus::Error::from)?;
        Ok(PresenceState::from(has_owner))
    }
}

#[async_trait]
impl PresenceWatcher for BusNameWatcher {
    #[instrument(skip(self, on_open, on_close), fields(service = %self.service_name))]
    async fn watch(
        &self,
        on_open: PresenceCallback,
        on_close: PresenceCallback,
    ) -> Result<WatchHandle, MediaError> {
        let dbus_proxy = fdo::DBusProxy::new(&self.connection)
            .await
            .map_err(|e| MediaError::InitializationFailed(format!("DBus proxy failed: {e}")))?;

        let mut owner_changes = dbus_proxy
            .receive_name_owner_changed_with_args(&[(0, self.service_name.as_str())])
            .await
            .map_err(|e| {
                MediaError::InitializationFailed(format!("Signal subscription failed: {e}"))
            })?;

        // Query after subscribing so no transition can slip in between.
        let initial = self.presence().await.map_err(|e| {
            MediaError::InitializationFailed(format!("Name owner query failed: {e}"))
        })?;

        let handle = WatchHandle::new();
        let task_handle = handle.clone();
        let service_name = self.service_name.clone();

        let task = tokio::spawn(async move {
            let mut transitions = PresenceTransitions::default();
            let report = |state: Option<PresenceState>| match state {
                Some(PresenceState::Open) => {
                    info!("{service_name} appeared on the bus");
                    on_open();
                }
                Some(PresenceState::Closed) => {
                    info!("{service_name} vanished from the bus");
                    on_close();
                }
                None => {}
            };

            report(transitions.observe(initial));

            while let Some(signal) = owner_changes.next().await {
                if !task_handle.is_active() {
                    break;
                }

                let args = match signal.args() {
                    Ok(args) => args,
                    Err(e) => {
                        warn!("Ignoring undecodable NameOwnerChanged signal: {e}");
                        continue;
                    }
                };

                if args.name().as_str() != service_name {
                    continue;
                }

                let state = PresenceState::from(args.new_owner().is_some());
                match transitions.observe(state) {
                    Some(state) => report(Some(state)),
                    None => debug!("Owner change without presence transition"),
                }
            }
        });

        self.watches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(handle.id(), task);

        Ok(handle)
    }

    fn unwatch(&self, handle: &WatchHandle) {
        handle.deactivate();

        let task = self
            .watches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&handle.id());

        if let Some(task) = task {
            task.abort();
            debug!(watch = handle.id(), "Stopped watching {}", self.service_name);
        }
    }
}

impl Drop for BusNameWatcher {
    fn drop(&mut self) {
        let watches = self.watches.get_mut().unwrap_or_else(PoisonError::into_inner);
        for (_, task) in watches.drain() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_observation_is_reported() {
        let mut transitions = PresenceTransitions::default();
        assert_eq!(
            transitions.observe(PresenceState::Closed),
            Some(PresenceState::Closed)
        );
    }

    #[test]
    fn repeated_state_is_not_reported() {
        let mut transitions = PresenceTransitions::default();
        transitions.observe(PresenceState::Open);

        assert_eq!(transitions.observe(PresenceState::Open), None);
        assert_eq!(
            transitions.observe(PresenceState::Closed),
            Some(PresenceState::Closed)
        );
        assert_eq!(transitions.observe(PresenceState::Closed), None);
        assert_eq!(
            transitions.observe(PresenceState::Open),
            Some(PresenceState::Open)
        );
    }
}
