//! Synchronizer configuration.

use std::time::Duration;

/// Default debounce window for refresh requests.
pub const DEFAULT_REFRESH_DEBOUNCE: Duration = Duration::from_millis(250);

/// Tuning knobs for a [`ViewSynchronizer`](super::ViewSynchronizer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Quiet period collecting refresh requests into one `refresh_all`.
    pub refresh_debounce: Duration,
    /// Optional periodic anti-entropy refresh. `None` keeps the synchronizer
    /// purely event driven.
    pub refresh_interval: Option<Duration>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            refresh_debounce: DEFAULT_REFRESH_DEBOUNCE,
            refresh_interval: None,
        }
    }
}

impl SyncConfig {
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = Some(interval);
        self
    }

    pub fn with_refresh_debounce(mut self, debounce: Duration) -> Self {
        self.refresh_debounce = debounce;
        self
    }
}
