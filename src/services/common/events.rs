use std::{
    fmt,
    sync::{
        Arc, PoisonError, RwLock,
        atomic::{AtomicU64, Ordering},
    },
};

/// Identifies a registered event handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;

// Shared across publishers so ids from different publishers never collide.
static NEXT_HANDLER_ID: AtomicU64 = AtomicU64::new(1);

/// Typed multi-subscriber event publisher.
///
/// Handlers run synchronously on the emitting task, in registration order.
/// Emission works on a snapshot of the handler list, so a handler may
/// subscribe or unsubscribe (itself included) while being called; such
/// changes take effect from the next emission.
pub struct EventPublisher<T> {
    handlers: RwLock<Vec<(HandlerId, Handler<T>)>>,
}

impl<T> EventPublisher<T> {
    /// Create a publisher without handlers
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
        }
    }

    /// Register a handler, returning the id needed to remove it again
    pub fn subscribe(&self, handler: impl Fn(&T) + Send + Sync + 'static) -> HandlerId {
        let id = HandlerId(NEXT_HANDLER_ID.fetch_add(1, Ordering::Relaxed));
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(handler)));
        id
    }

    /// Remove a handler. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: HandlerId) -> bool {
        let mut handlers = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = handlers.len();
        handlers.retain(|(handler_id, _)| *handler_id != id);
        handlers.len() != before
    }

    /// Call every registered handler with `event`
    pub fn emit(&self, event: &T) {
        let snapshot: Vec<Handler<T>> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        for handler in snapshot {
            handler(event);
        }
    }

    /// Number of registered handlers
    pub fn subscriber_count(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<T> Default for EventPublisher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for EventPublisher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventPublisher")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
