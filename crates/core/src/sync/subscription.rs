//! Binding between a push event source and a synchronizer.

use std::sync::Arc;

use log::debug;

use super::synchronizer::ViewSynchronizer;
use crate::events::{EventKind, Listener, ListenerId, PushEvent, PushEventSource};

/// Listeners registered on behalf of one synchronizer.
///
/// Dropping the subscription unregisters them.
pub struct Subscription {
    source: Arc<dyn PushEventSource>,
    registrations: Vec<(EventKind, ListenerId)>,
}

impl Subscription {
    /// Registers exactly one listener per event kind.
    ///
    /// Calling this twice for the same pair without unsubscribing registers
    /// every handler twice.
    pub fn subscribe(source: Arc<dyn PushEventSource>, synchronizer: &ViewSynchronizer) -> Self {
        let registrations = EventKind::ALL
            .into_iter()
            .map(|kind| {
                let synchronizer = synchronizer.clone();
                let listener: Listener = Arc::new(move |event: &PushEvent| {
                    synchronizer.handle_push_event(event)
                });
                (kind, source.add_listener(kind, listener))
            })
            .collect::<Vec<_>>();
        debug!("Subscribed to {} push event kinds", registrations.len());

        Self {
            source,
            registrations,
        }
    }

    /// Removes exactly the listeners this subscription registered.
    /// Idempotent.
    pub fn unsubscribe(&mut self) {
        if self.registrations.is_empty() {
            return;
        }
        for (kind, id) in self.registrations.drain(..) {
            self.source.remove_listener(kind, id);
        }
        debug!("Unsubscribed from push events");
    }

    pub fn is_active(&self) -> bool {
        !self.registrations.is_empty()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
