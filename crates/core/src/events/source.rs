//! Push event source trait and the listener registry behind it.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, error, warn};

use super::{EventKind, PushEvent};

pub type ListenerId = u64;

/// Callback invoked for every event of the kind it was registered for.
pub type Listener = Arc<dyn Fn(&PushEvent) + Send + Sync>;

/// Subscribe/unsubscribe interface keyed by event kind.
pub trait PushEventSource: Send + Sync {
    /// Registers a listener and returns the id needed to remove it.
    fn add_listener(&self, kind: EventKind, listener: Listener) -> ListenerId;

    /// Removes a listener. Returns false when it was not registered.
    fn remove_listener(&self, kind: EventKind, id: ListenerId) -> bool;
}

#[derive(Default)]
struct Registry {
    next_id: ListenerId,
    listeners: HashMap<EventKind, Vec<(ListenerId, Listener)>>,
}

/// Listener registry shared by push event sources and test doubles.
///
/// Cloning yields another handle to the same registry.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    registry: Arc<Mutex<Registry>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls every listener registered for the event's kind, in
    /// registration order.
    ///
    /// The registry lock is released before listeners run, so a listener may
    /// add or remove listeners. A panicking listener is logged and the
    /// remaining listeners still run.
    pub fn dispatch(&self, event: &PushEvent) {
        let kind = event.kind();
        let listeners: Vec<Listener> = {
            let registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
            registry
                .listeners
                .get(&kind)
                .map(|entries| entries.iter().map(|(_, l)| l.clone()).collect())
                .unwrap_or_default()
        };

        if listeners.is_empty() {
            debug!("No listeners for push event '{}'", kind);
            return;
        }

        for listener in listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                error!("Listener for push event '{}' panicked", kind);
            }
        }
    }

    /// Parses a raw text frame and dispatches it.
    ///
    /// Malformed frames are logged and dropped; unknown event names are
    /// ignored.
    pub fn dispatch_raw(&self, text: &str) {
        match PushEvent::parse_message(text) {
            Ok(Some(event)) => self.dispatch(&event),
            Ok(None) => debug!("Ignoring unknown push event: {}", text),
            Err(e) => warn!("Failed to decode push event: {}", e),
        }
    }

    /// Number of listeners registered for a kind.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        let registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        registry.listeners.get(&kind).map_or(0, Vec::len)
    }
}

impl PushEventSource for EventDispatcher {
    fn add_listener(&self, kind: EventKind, listener: Listener) -> ListenerId {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        registry.next_id += 1;
        let id = registry.next_id;
        registry
            .listeners
            .entry(kind)
            .or_default()
            .push((id, listener));
        id
    }

    fn remove_listener(&self, kind: EventKind, id: ListenerId) -> bool {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(entries) = registry.listeners.get_mut(&kind) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|(listener_id, _)| *listener_id != id);
        before != entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_listener(counter: Arc<AtomicUsize>) -> Listener {
        Arc::new(move |_event: &PushEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_dispatch_reaches_only_matching_kind() {
        let dispatcher = EventDispatcher::new();
        let deleted = Arc::new(AtomicUsize::new(0));
        let connected = Arc::new(AtomicUsize::new(0));
        dispatcher.add_listener(EventKind::WalletDeleted, counting_listener(deleted.clone()));
        dispatcher.add_listener(EventKind::Connected, counting_listener(connected.clone()));

        dispatcher.dispatch_raw(r#"{"event":"wallet_deleted","data":{"wallet_id":4}}"#);

        assert_eq!(deleted.load(Ordering::SeqCst), 1);
        assert_eq!(connected.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_remove_listener_stops_delivery() {
        let dispatcher = EventDispatcher::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let id = dispatcher.add_listener(EventKind::Connected, counting_listener(counter.clone()));

        let event = PushEvent::lifecycle(EventKind::Connected, serde_json::Value::Null);
        dispatcher.dispatch(&event);
        assert!(dispatcher.remove_listener(EventKind::Connected, id));
        dispatcher.dispatch(&event);

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(!dispatcher.remove_listener(EventKind::Connected, id));
        assert_eq!(dispatcher.listener_count(EventKind::Connected), 0);
    }

    #[test]
    fn test_panicking_listener_does_not_stop_dispatch() {
        let dispatcher = EventDispatcher::new();
        let counter = Arc::new(AtomicUsize::new(0));
        dispatcher.add_listener(
            EventKind::WalletDeleted,
            Arc::new(|_event: &PushEvent| panic!("listener failure")),
        );
        dispatcher.add_listener(EventKind::WalletDeleted, counting_listener(counter.clone()));

        dispatcher.dispatch_raw(r#"{"event":"wallet_deleted","data":{"wallet_id":4}}"#);
        dispatcher.dispatch_raw(r#"{"event":"wallet_deleted","data":{"wallet_id":5}}"#);

        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(dispatcher.listener_count(EventKind::WalletDeleted), 2);
    }

    #[test]
    fn test_malformed_frame_is_dropped() {
        let dispatcher = EventDispatcher::new();
        let counter = Arc::new(AtomicUsize::new(0));
        dispatcher.add_listener(EventKind::WalletDeleted, counting_listener(counter.clone()));

        dispatcher.dispatch_raw(r#"{"event":"wallet_deleted","data":{}}"#);
        dispatcher.dispatch_raw("garbage");

        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
