//! View-state synchronizer.
//!
//! Keeps one in-process [`Snapshot`] consistent with the server under three
//! change sources: initial load, user commands and push events. Inputs are
//! unordered; every mutator is idempotent and last-write-wins per field, and
//! `refresh_all` heals whatever the fast path missed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::{debug, error, info, warn};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::{mpsc, watch};

use super::config::SyncConfig;
use super::lifecycle::LifecycleToken;
use super::refresh_worker::{spawn_periodic_refresh, spawn_refresh_worker};
use super::snapshot::Snapshot;
use crate::errors::{Error, Result};
use crate::events::PushEvent;
use crate::gateway::GatewayTrait;
use crate::notifications::{Notification, NotificationSink};
use crate::summary::AggregateStats;
use crate::transactions::{NewTransaction, NewTransfer, Transaction, TransferReceipt};
use crate::wallets::{NewWallet, Wallet, WalletId, WalletUpdate};

/// A user command the gateway has accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    WalletCreated(Wallet),
    WalletUpdated(Wallet),
    WalletDeleted(WalletId),
    TransactionCreated,
    TransferCreated,
}

/// The independent reads issued by `refresh_all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshRead {
    TotalBalance,
    PeriodSummary,
    CurrentUser,
    Wallets,
}

/// Outcome of one `refresh_all` pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub succeeded: Vec<RefreshRead>,
    pub failed: Vec<(RefreshRead, String)>,
    /// Set when the synchronizer was already torn down.
    pub skipped: bool,
}

impl RefreshReport {
    pub fn is_complete(&self) -> bool {
        !self.skipped && self.failed.is_empty()
    }

    pub fn has_failed(&self, read: RefreshRead) -> bool {
        self.failed.iter().any(|(r, _)| *r == read)
    }

    fn record<T>(&mut self, read: RefreshRead, result: &Result<T>) {
        match result {
            Ok(_) => self.succeeded.push(read),
            Err(e) => self.failed.push((read, e.to_string())),
        }
    }
}

pub(super) struct SyncCore {
    gateway: Arc<dyn GatewayTrait>,
    notifier: Arc<dyn NotificationSink>,
    snapshot: watch::Sender<Snapshot>,
    refresh_tx: mpsc::UnboundedSender<()>,
    token: LifecycleToken,
    refresh_requests: AtomicU64,
    refreshes_completed: AtomicU64,
}

impl SyncCore {
    /// Applies a merge rule unless the owning view is gone. Publishes only
    /// when the rule reports a change.
    fn mutate<F>(&self, rule: F) -> bool
    where
        F: FnOnce(&mut Snapshot) -> bool,
    {
        if !self.token.is_live() {
            debug!("Ignoring snapshot mutation after teardown");
            return false;
        }
        self.snapshot.send_if_modified(rule)
    }

    fn schedule_refresh(&self) {
        if !self.token.is_live() {
            return;
        }
        self.refresh_requests.fetch_add(1, Ordering::SeqCst);
        if self.refresh_tx.send(()).is_err() {
            debug!("Refresh worker is gone, dropping refresh request");
        }
    }

    pub(super) async fn refresh_all(&self) -> RefreshReport {
        if !self.token.is_live() {
            return RefreshReport {
                skipped: true,
                ..Default::default()
            };
        }

        let gateway = &self.gateway;
        let (balance, summary, user, wallets) = futures::join!(
            gateway.get_user_total_balance(),
            gateway.get_current_summary(),
            gateway.get_current_user(),
            gateway.get_wallets(),
        );

        let mut report = RefreshReport::default();
        report.record(RefreshRead::TotalBalance, &balance);
        report.record(RefreshRead::PeriodSummary, &summary);
        report.record(RefreshRead::CurrentUser, &user);
        report.record(RefreshRead::Wallets, &wallets);

        match balance {
            Ok(balance) => {
                self.mutate(|s| s.set_total_balance(balance.amount()));
            }
            Err(e) => warn!("Error refreshing total balance: {}", e),
        }
        match summary {
            Ok(summary) => {
                self.mutate(|s| s.set_period_summary(&summary));
            }
            Err(e) => warn!("Error refreshing period summary: {}", e),
        }
        match user {
            Ok(user) => {
                self.mutate(|s| s.set_default_currency(user.default_currency.as_deref()));
            }
            Err(e) => warn!("Error refreshing current user: {}", e),
        }
        match wallets {
            Ok(wallets) => {
                debug!("Refreshed {} wallet(s)", wallets.len());
                self.mutate(|s| s.replace_wallets(wallets));
            }
            Err(e) => warn!("Error refreshing wallets: {}", e),
        }

        self.refreshes_completed.fetch_add(1, Ordering::SeqCst);
        report
    }
}

/// Owner of the snapshot. Cloning yields another handle to the same state.
///
/// Must be created inside a tokio runtime: construction spawns the refresh
/// worker. The worker stops when the last handle is dropped or on
/// [`teardown`](Self::teardown).
#[derive(Clone)]
pub struct ViewSynchronizer {
    core: Arc<SyncCore>,
}

impl ViewSynchronizer {
    pub fn new(
        gateway: Arc<dyn GatewayTrait>,
        notifier: Arc<dyn NotificationSink>,
        config: SyncConfig,
    ) -> Self {
        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();
        let (snapshot, _) = watch::channel(Snapshot::new());
        let token = LifecycleToken::new();

        let core = Arc::new(SyncCore {
            gateway,
            notifier,
            snapshot,
            refresh_tx: refresh_tx.clone(),
            token: token.clone(),
            refresh_requests: AtomicU64::new(0),
            refreshes_completed: AtomicU64::new(0),
        });

        spawn_refresh_worker(
            refresh_rx,
            Arc::downgrade(&core),
            token.clone(),
            config.refresh_debounce,
        );
        if let Some(interval) = config.refresh_interval {
            spawn_periodic_refresh(refresh_tx, token, interval);
        }

        Self { core }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Seeds the snapshot. Missing parts are loaded by a scheduled
    /// `refresh_all`.
    pub fn initialize(
        &self,
        initial_wallets: Option<Vec<Wallet>>,
        initial_stats: Option<AggregateStats>,
    ) {
        let needs_refresh = initial_wallets.is_none() || initial_stats.is_none();
        let seeded = Snapshot::seeded(initial_wallets, initial_stats);
        self.core.mutate(|s| {
            let changed = *s != seeded;
            *s = seeded;
            changed
        });
        if needs_refresh {
            debug!("Initial data incomplete, scheduling full refresh");
            self.core.schedule_refresh();
        }
    }

    /// Invalidates the lifecycle token. In-flight gateway calls may still
    /// resolve, but they can no longer change the snapshot.
    pub fn teardown(&self) {
        if self.core.token.is_live() {
            info!("Tearing down view synchronizer");
        }
        self.core.token.cancel();
    }

    pub fn is_live(&self) -> bool {
        self.core.token.is_live()
    }

    pub fn lifecycle_token(&self) -> LifecycleToken {
        self.core.token.clone()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Snapshot {
        self.core.snapshot.borrow().clone()
    }

    /// Read-only, render-triggering view of the snapshot.
    pub fn subscribe_changes(&self) -> watch::Receiver<Snapshot> {
        self.core.snapshot.subscribe()
    }

    /// Number of refreshes scheduled so far.
    pub fn refresh_requests(&self) -> u64 {
        self.core.refresh_requests.load(Ordering::SeqCst)
    }

    /// Number of `refresh_all` passes that ran to completion.
    pub fn refreshes_completed(&self) -> u64 {
        self.core.refreshes_completed.load(Ordering::SeqCst)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Merge rules
    // ─────────────────────────────────────────────────────────────────────────

    /// Issues every read concurrently and applies each result on its own.
    /// A failed read leaves its field untouched. Never fails.
    pub async fn refresh_all(&self) -> RefreshReport {
        self.core.refresh_all().await
    }

    pub fn schedule_refresh(&self) {
        self.core.schedule_refresh();
    }

    /// Inserts or replaces a wallet by id, preserving its position.
    pub fn apply_wallet_upserted(&self, wallet: Wallet) -> bool {
        debug!("Upserting wallet {}", wallet.id);
        self.core.mutate(|s| s.upsert_wallet(wallet))
    }

    /// Patches the balance of one wallet. No-op when it is not in the
    /// snapshot, for example after a concurrent delete.
    pub fn apply_wallet_balance_updated(&self, wallet_id: WalletId, new_balance: Decimal) -> bool {
        debug!("Updating balance of wallet {} to {}", wallet_id, new_balance);
        self.core
            .mutate(|s| s.patch_wallet_balance(wallet_id, new_balance))
    }

    /// Removes a wallet. Duplicate delete notifications are no-ops.
    pub fn apply_wallet_deleted(&self, wallet_id: WalletId) -> bool {
        debug!("Removing wallet {}", wallet_id);
        self.core.mutate(|s| s.remove_wallet(wallet_id))
    }

    /// Transactions carry no balance data usable in isolation, so the only
    /// reaction is to invalidate and refetch.
    pub fn apply_transaction_signal(&self) {
        debug!("Transaction update, refreshing wallets and stats");
        self.core.mutate(Snapshot::invalidate);
        self.core.schedule_refresh();
    }

    pub fn on_user_command_succeeded(&self, outcome: CommandOutcome) {
        match outcome {
            CommandOutcome::WalletCreated(wallet) | CommandOutcome::WalletUpdated(wallet) => {
                self.apply_wallet_upserted(wallet);
                self.core.mutate(Snapshot::invalidate_stats);
            }
            CommandOutcome::WalletDeleted(wallet_id) => {
                self.apply_wallet_deleted(wallet_id);
                self.core.mutate(Snapshot::invalidate_stats);
            }
            CommandOutcome::TransactionCreated | CommandOutcome::TransferCreated => {
                self.core.mutate(Snapshot::invalidate);
            }
        }
        self.core.schedule_refresh();
    }

    /// Routes a push event to its merge rule.
    pub fn handle_push_event(&self, event: &PushEvent) {
        match event {
            PushEvent::WalletCreated { wallet } => {
                debug!("Real-time: wallet {} created", wallet.id);
                self.apply_wallet_upserted(wallet.clone());
                self.refresh_stats();
            }
            PushEvent::WalletUpdated {
                wallet_id,
                wallet_balance,
                wallet,
            } => {
                debug!("Real-time: wallet {} updated", wallet_id);
                match (wallet, wallet_balance) {
                    (Some(wallet), _) => {
                        self.apply_wallet_upserted(wallet.clone());
                    }
                    (None, Some(balance)) => {
                        self.apply_wallet_balance_updated(*wallet_id, *balance);
                    }
                    (None, None) => {}
                }
                self.refresh_stats();
            }
            PushEvent::WalletDeleted { wallet_id } => {
                debug!("Real-time: wallet {} deleted", wallet_id);
                self.apply_wallet_deleted(*wallet_id);
                self.refresh_stats();
            }
            PushEvent::Transaction { change, event } => {
                debug!(
                    "Real-time: transaction {:?} {:?} (wallet {:?})",
                    event.transaction_id, change, event.wallet_id
                );
                self.apply_transaction_signal();
            }
            PushEvent::Lifecycle { kind, detail } => {
                info!("Push channel {}: {}", kind, detail);
            }
        }
    }

    fn refresh_stats(&self) {
        self.core.mutate(Snapshot::invalidate_stats);
        self.core.schedule_refresh();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // User commands
    // ─────────────────────────────────────────────────────────────────────────

    fn ensure_live(&self) -> Result<()> {
        if self.is_live() {
            Ok(())
        } else {
            Err(Error::TornDown)
        }
    }

    fn notify_failure(&self, action: &str, err: &Error) {
        error!("Error trying to {}: {}", action, err);
        self.core.notifier.notify(Notification::error(format!(
            "Failed to {}: {}",
            action,
            err.user_message()
        )));
    }

    /// Creates a wallet and inserts it optimistically. Balance side effects
    /// of the initial deposit come from the scheduled refresh.
    pub async fn create_wallet(&self, new_wallet: NewWallet) -> Result<Wallet> {
        self.ensure_live()?;
        debug!("Creating wallet '{}'", new_wallet.name);

        match self.core.gateway.create_wallet(new_wallet).await {
            Ok(wallet) => {
                info!("Wallet {} created", wallet.id);
                self.on_user_command_succeeded(CommandOutcome::WalletCreated(wallet.clone()));
                self.core
                    .notifier
                    .notify(Notification::success("Wallet created successfully!"));
                Ok(wallet)
            }
            Err(err) => {
                self.notify_failure("create wallet", &err);
                self.reload_wallets().await;
                Err(err)
            }
        }
    }

    pub async fn update_wallet(&self, wallet_id: WalletId, update: WalletUpdate) -> Result<Wallet> {
        self.ensure_live()?;

        match self.core.gateway.update_wallet(wallet_id, update).await {
            Ok(wallet) => {
                self.on_user_command_succeeded(CommandOutcome::WalletUpdated(wallet.clone()));
                self.core
                    .notifier
                    .notify(Notification::success("Wallet updated successfully!"));
                Ok(wallet)
            }
            Err(err) => {
                self.notify_failure("update wallet", &err);
                Err(err)
            }
        }
    }

    pub async fn delete_wallet(&self, wallet_id: WalletId) -> Result<()> {
        self.ensure_live()?;

        match self.core.gateway.delete_wallet(wallet_id).await {
            Ok(()) => {
                self.on_user_command_succeeded(CommandOutcome::WalletDeleted(wallet_id));
                self.core
                    .notifier
                    .notify(Notification::success("Wallet deleted successfully!"));
                Ok(())
            }
            Err(err) => {
                self.notify_failure("delete wallet", &err);
                Err(err)
            }
        }
    }

    /// Records a transaction. No optimistic patch: the server owns balance
    /// and category arithmetic.
    pub async fn create_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        self.ensure_live()?;

        match self.core.gateway.create_transaction(new_transaction).await {
            Ok(transaction) => {
                self.on_user_command_succeeded(CommandOutcome::TransactionCreated);
                self.core
                    .notifier
                    .notify(Notification::success("Transaction added successfully!"));
                Ok(transaction)
            }
            Err(err) => {
                self.notify_failure("add transaction", &err);
                Err(err)
            }
        }
    }

    /// Moves money between wallets. Both legs and any conversion are
    /// computed by the server.
    pub async fn create_transfer(&self, transfer: NewTransfer) -> Result<Option<TransferReceipt>> {
        self.ensure_live()?;

        match self.core.gateway.create_transfer(transfer).await {
            Ok(receipt) => {
                self.on_user_command_succeeded(CommandOutcome::TransferCreated);
                self.core
                    .notifier
                    .notify(Notification::success("Transfer completed successfully!"));
                Ok(receipt)
            }
            Err(err) => {
                self.notify_failure("transfer funds", &err);
                Err(err)
            }
        }
    }

    /// Silent wallet-list reload used after a failed create.
    async fn reload_wallets(&self) {
        match self.core.gateway.get_wallets().await {
            Ok(wallets) => {
                self.core.mutate(|s| s.replace_wallets(wallets));
            }
            Err(e) => warn!("Error refreshing wallets: {}", e),
        }
    }
}
