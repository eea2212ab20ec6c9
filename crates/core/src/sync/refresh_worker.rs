//! Background tasks feeding `refresh_all`.
//!
//! Refresh requests are collected over a debounce window and executed as a
//! single pass. A steady stream of requests delays the pass by at most four
//! debounce windows. Requests arriving while a pass is running queue up and yield
//! exactly one follow-up pass.

use std::sync::Weak;
use std::time::Duration;

use log::{debug, info};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::lifecycle::LifecycleToken;
use super::synchronizer::SyncCore;

/// Upper bound on how long pending requests wait, in debounce windows,
/// counted from the first request of the batch.
const MAX_WAIT_FACTOR: u32 = 4;

pub(super) fn spawn_refresh_worker(
    rx: mpsc::UnboundedReceiver<()>,
    core: Weak<SyncCore>,
    token: LifecycleToken,
    debounce: Duration,
) -> JoinHandle<()> {
    tokio::spawn(refresh_worker(rx, core, token, debounce))
}

async fn refresh_worker(
    mut rx: mpsc::UnboundedReceiver<()>,
    core: Weak<SyncCore>,
    token: LifecycleToken,
    debounce: Duration,
) {
    debug!("Refresh worker started");
    let max_wait = debounce * MAX_WAIT_FACTOR;
    let mut pending = 0usize;
    let mut deadline = Instant::now();

    loop {
        if pending == 0 {
            tokio::select! {
                request = rx.recv() => match request {
                    Some(()) => {
                        pending += 1;
                        deadline = Instant::now() + max_wait;
                    }
                    None => break,
                },
                _ = token.cancelled() => break,
            }
            continue;
        }

        let wake_at = (Instant::now() + debounce).min(deadline);
        tokio::select! {
            request = rx.recv() => match request {
                Some(()) => pending += 1,
                None => break,
            },
            _ = tokio::time::sleep_until(wake_at) => {
                let Some(core) = core.upgrade() else {
                    break;
                };
                debug!("Running refresh for {} coalesced request(s)", pending);
                pending = 0;
                let report = core.refresh_all().await;
                if !report.failed.is_empty() {
                    debug!("Refresh finished with {} failed read(s)", report.failed.len());
                }
            }
            _ = token.cancelled() => break,
        }
    }

    debug!("Refresh worker stopped");
}

/// Periodic anti-entropy refresh. The first request fires one full period
/// after start.
pub(super) fn spawn_periodic_refresh(
    tx: mpsc::UnboundedSender<()>,
    token: LifecycleToken,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Periodic refresh started ({}s interval)", period.as_secs());
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if tx.send(()).is_err() {
                        break;
                    }
                }
                _ = token.cancelled() => break,
            }
        }
        debug!("Periodic refresh stopped");
    })
}
