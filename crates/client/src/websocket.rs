//! WebSocket push event source.
//!
//! One connection per signed-in user at `{ws_base}/ws/{user_id}`. Frames
//! are `{"event": ..., "data": ...}` envelopes dispatched to listeners by
//! event name. The connection emits `connected` and `disconnected`, and
//! after the last failed reconnection attempt `reconnection_failed`.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::StreamExt;
use log::{debug, error, info, warn};
use serde_json::json;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use fintrack_core::events::{
    EventDispatcher, EventKind, Listener, ListenerId, PushEvent, PushEventSource,
};
use fintrack_core::sync::LifecycleToken;

use crate::error::ClientError;

/// Bounded linear back-off between reconnection attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(3),
        }
    }
}

impl ReconnectPolicy {
    /// Delay before the given attempt (1-based), or `None` once the attempts
    /// are exhausted.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        (attempt >= 1 && attempt <= self.max_attempts).then(|| self.base_delay * attempt)
    }
}

struct Connection {
    user_id: i64,
    stop: LifecycleToken,
    task: JoinHandle<()>,
}

/// Push event source backed by the per-user WebSocket channel.
///
/// Listeners may be registered before `connect`; they stay registered
/// across reconnects and `disconnect`.
pub struct WebSocketEventSource {
    ws_base: String,
    policy: ReconnectPolicy,
    dispatcher: EventDispatcher,
    connection: Mutex<Option<Connection>>,
}

impl WebSocketEventSource {
    /// # Arguments
    ///
    /// * `ws_base` - WebSocket origin, e.g. "ws://localhost:8000".
    pub fn new(ws_base: &str) -> Self {
        Self::with_policy(ws_base, ReconnectPolicy::default())
    }

    pub fn with_policy(ws_base: &str, policy: ReconnectPolicy) -> Self {
        Self {
            ws_base: ws_base.trim_end_matches('/').to_string(),
            policy,
            dispatcher: EventDispatcher::new(),
            connection: Mutex::new(None),
        }
    }

    pub fn url_for(&self, user_id: i64) -> String {
        format!("{}/ws/{}", self.ws_base, user_id)
    }

    /// Registry behind this source, for dispatching events locally.
    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    /// Opens the channel for `user_id` in a background task.
    ///
    /// A running connection for the same user is kept; one for another user
    /// is closed first. Must be called inside a tokio runtime.
    pub fn connect(&self, user_id: i64) {
        let mut connection = self
            .connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(current) = connection.as_ref() {
            if current.user_id == user_id && !current.task.is_finished() {
                debug!("WebSocket already connected for user {}", user_id);
                return;
            }
        }
        if let Some(previous) = connection.take() {
            previous.stop.cancel();
        }

        let stop = LifecycleToken::new();
        let task = tokio::spawn(run_connection(
            self.url_for(user_id),
            user_id,
            self.dispatcher.clone(),
            stop.clone(),
            self.policy,
        ));
        *connection = Some(Connection {
            user_id,
            stop,
            task,
        });
    }

    /// Closes the channel and resets the reconnection attempts.
    pub fn disconnect(&self) {
        let previous = self
            .connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(previous) = previous {
            info!("Disconnecting WebSocket for user {}", previous.user_id);
            previous.stop.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|c| !c.task.is_finished())
    }
}

impl Drop for WebSocketEventSource {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl PushEventSource for WebSocketEventSource {
    fn add_listener(&self, kind: EventKind, listener: Listener) -> ListenerId {
        self.dispatcher.add_listener(kind, listener)
    }

    fn remove_listener(&self, kind: EventKind, id: ListenerId) -> bool {
        self.dispatcher.remove_listener(kind, id)
    }
}

async fn run_connection(
    url: String,
    user_id: i64,
    dispatcher: EventDispatcher,
    stop: LifecycleToken,
    policy: ReconnectPolicy,
) {
    let mut attempts = 0u32;

    loop {
        let connected = tokio::select! {
            result = connect_async(url.as_str()) => result,
            _ = stop.cancelled() => return,
        };

        match connected {
            Ok((mut stream, _)) => {
                info!("WebSocket connected for user {}", user_id);
                attempts = 0;
                dispatcher.dispatch(&PushEvent::lifecycle(
                    EventKind::Connected,
                    json!({ "user_id": user_id }),
                ));

                let close_detail = loop {
                    tokio::select! {
                        frame = stream.next() => match frame {
                            Some(Ok(Message::Text(text))) => dispatcher.dispatch_raw(text.as_str()),
                            Some(Ok(Message::Close(frame))) => {
                                break match frame {
                                    Some(frame) => json!({
                                        "code": u16::from(frame.code),
                                        "reason": frame.reason.as_str(),
                                    }),
                                    None => json!({}),
                                };
                            }
                            Some(Ok(_)) => {}
                            Some(Err(e)) => {
                                error!("WebSocket error: {}", e);
                                dispatcher.dispatch(&PushEvent::lifecycle(
                                    EventKind::Error,
                                    json!({ "error": e.to_string() }),
                                ));
                                break json!({});
                            }
                            None => break json!({}),
                        },
                        _ = stop.cancelled() => {
                            if let Err(e) = stream.close(None).await {
                                debug!("Error closing WebSocket: {}", e);
                            }
                            dispatcher.dispatch(&PushEvent::lifecycle(
                                EventKind::Disconnected,
                                json!({ "reason": "client disconnect" }),
                            ));
                            return;
                        }
                    }
                };

                info!("WebSocket disconnected: {}", close_detail);
                dispatcher.dispatch(&PushEvent::lifecycle(EventKind::Disconnected, close_detail));
            }
            Err(e) => {
                let err = ClientError::from(e);
                warn!("Failed to open WebSocket connection: {}", err);
                dispatcher.dispatch(&PushEvent::lifecycle(
                    EventKind::Error,
                    json!({ "error": err.to_string() }),
                ));
            }
        }

        attempts += 1;
        let Some(delay) = policy.delay_for(attempts) else {
            error!("Max reconnection attempts reached");
            dispatcher.dispatch(&PushEvent::lifecycle(EventKind::ReconnectionFailed, json!({})));
            return;
        };
        info!(
            "Attempting to reconnect in {}s ({}/{})",
            delay.as_secs(),
            attempts,
            policy.max_attempts
        );
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = stop.cancelled() => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_reconnect_delays_grow_linearly() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay_for(1), Some(Duration::from_secs(3)));
        assert_eq!(policy.delay_for(5), Some(Duration::from_secs(15)));
        assert_eq!(policy.delay_for(6), None);
        assert_eq!(policy.delay_for(0), None);
    }

    #[test]
    fn test_url_for_user() {
        let source = WebSocketEventSource::new("ws://localhost:8000/");
        assert_eq!(source.url_for(42), "ws://localhost:8000/ws/42");
    }

    #[test]
    fn test_listeners_survive_disconnect() {
        let source = WebSocketEventSource::new("ws://localhost:8000");
        let id = source.add_listener(EventKind::WalletDeleted, Arc::new(|_: &PushEvent| {}));
        source.disconnect();
        assert_eq!(source.dispatcher().listener_count(EventKind::WalletDeleted), 1);
        assert!(source.remove_listener(EventKind::WalletDeleted, id));
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let policy = ReconnectPolicy {
            max_attempts: 2,
            base_delay: Duration::from_millis(10),
        };
        // Nothing listens on port 9 of localhost, so every attempt fails fast.
        let source = WebSocketEventSource::with_policy("ws://127.0.0.1:9", policy);
        let failures = Arc::new(AtomicUsize::new(0));
        let gave_up = Arc::new(AtomicUsize::new(0));

        let counter = failures.clone();
        source.add_listener(
            EventKind::Error,
            Arc::new(move |_: &PushEvent| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        let counter = gave_up.clone();
        source.add_listener(
            EventKind::ReconnectionFailed,
            Arc::new(move |_: &PushEvent| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        source.connect(1);
        for _ in 0..250 {
            if gave_up.load(Ordering::SeqCst) > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        assert_eq!(failures.load(Ordering::SeqCst), 3);
        assert_eq!(gave_up.load(Ordering::SeqCst), 1);
    }
}
