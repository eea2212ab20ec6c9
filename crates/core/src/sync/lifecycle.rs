//! Liveness token tying background work to the owning view.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

#[derive(Default)]
struct TokenState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Cancellation flag shared by a synchronizer and the tasks it spawns.
///
/// Once cancelled, every mutator gated on the token becomes a no-op, so a
/// gateway response that resolves after teardown cannot touch the snapshot.
#[derive(Clone, Default)]
pub struct LifecycleToken {
    state: Arc<TokenState>,
}

impl LifecycleToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the token. Idempotent.
    pub fn cancel(&self) {
        if !self.state.cancelled.swap(true, Ordering::SeqCst) {
            self.state.notify.notify_waiters();
        }
    }

    pub fn is_live(&self) -> bool {
        !self.state.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once the token is cancelled.
    pub async fn cancelled(&self) {
        loop {
            // Register before checking so a concurrent cancel is not missed.
            let notified = self.state.notify.notified();
            if !self.is_live() {
                return;
            }
            notified.await;
        }
    }
}

impl std::fmt::Debug for LifecycleToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleToken")
            .field("live", &self.is_live())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cancel_is_idempotent() {
        let token = LifecycleToken::new();
        assert!(token.is_live());
        token.cancel();
        token.cancel();
        assert!(!token.is_live());
    }

    #[tokio::test]
    async fn test_cancelled_resolves_for_clones() {
        let token = LifecycleToken::new();
        let waiter = token.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("cancelled() should resolve")
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_resolves_immediately_after_cancel() {
        let token = LifecycleToken::new();
        token.cancel();
        tokio::time::timeout(Duration::from_millis(100), token.cancelled())
            .await
            .expect("already cancelled");
    }
}
