//! Notification sink trait and implementations.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A short, non-fatal message for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}

/// Trait for surfacing notifications to the user.
///
/// `notify()` must be fast and non-blocking. Failing to show a notification
/// must not affect the command that produced it.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// No-op implementation for headless contexts.
#[derive(Clone, Default)]
pub struct NoOpNotificationSink;

impl NotificationSink for NoOpNotificationSink {
    fn notify(&self, _notification: Notification) {}
}

/// Mock sink for testing - collects notifications.
#[derive(Clone, Default)]
pub struct MockNotificationSink {
    notifications: Arc<Mutex<Vec<Notification>>>,
}

impl MockNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected notifications.
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }

    /// Returns only the error notifications.
    pub fn errors(&self) -> Vec<Notification> {
        self.notifications()
            .into_iter()
            .filter(Notification::is_error)
            .collect()
    }

    pub fn clear(&self) {
        self.notifications.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.notifications.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.lock().unwrap().is_empty()
    }
}

impl NotificationSink for MockNotificationSink {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}
