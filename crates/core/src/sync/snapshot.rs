//! The client-side snapshot and its merge rules.
//!
//! All functions here are synchronous and side-effect free beyond the
//! snapshot itself. They report whether anything changed so the caller can
//! decide whether to publish.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::summary::{AggregateStats, PeriodSummary};
use crate::wallets::{Wallet, WalletId};

/// Freshness of one snapshot field.
///
/// There is no TTL: `Fresh` only means the last write came from the server
/// and no signal has invalidated it since.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FieldState {
    #[default]
    Absent,
    Stale,
    Fresh,
}

impl FieldState {
    /// A single-entity write makes an absent field fresh but cannot heal
    /// staleness of the whole field.
    fn after_partial_write(self) -> Self {
        match self {
            FieldState::Absent => FieldState::Fresh,
            other => other,
        }
    }

    fn invalidated(self) -> Self {
        match self {
            FieldState::Fresh => FieldState::Stale,
            other => other,
        }
    }
}

/// Per-field freshness. Wallet entries share the freshness of the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Freshness {
    pub wallets: FieldState,
    pub total_balance: FieldState,
    pub total_spending: FieldState,
    pub total_saved: FieldState,
    pub default_currency: FieldState,
}

impl Freshness {
    fn all(state: FieldState) -> Self {
        Self {
            wallets: state,
            total_balance: state,
            total_spending: state,
            total_saved: state,
            default_currency: state,
        }
    }
}

/// Wallets in insertion order plus aggregate statistics.
///
/// Invariant: at most one wallet per id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    wallets: Vec<Wallet>,
    stats: AggregateStats,
    freshness: Freshness,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from optional initial data. Provided parts are
    /// considered fresh.
    pub fn seeded(wallets: Option<Vec<Wallet>>, stats: Option<AggregateStats>) -> Self {
        let mut snapshot = Snapshot::new();
        if let Some(wallets) = wallets {
            snapshot.replace_wallets(wallets);
        }
        if let Some(stats) = stats {
            snapshot.stats = stats;
            snapshot.freshness = Freshness {
                wallets: snapshot.freshness.wallets,
                ..Freshness::all(FieldState::Fresh)
            };
        }
        snapshot
    }

    pub fn wallets(&self) -> &[Wallet] {
        &self.wallets
    }

    pub fn wallet(&self, wallet_id: WalletId) -> Option<&Wallet> {
        self.wallets.iter().find(|w| w.id == wallet_id)
    }

    pub fn stats(&self) -> &AggregateStats {
        &self.stats
    }

    pub fn freshness(&self) -> Freshness {
        self.freshness
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    /// Replaces the wallet with the same id in place, or appends it.
    ///
    /// Idempotent: applying the same wallet twice leaves the snapshot as
    /// after the first application.
    pub fn upsert_wallet(&mut self, wallet: Wallet) -> bool {
        let previous_state = self.freshness.wallets;
        self.freshness.wallets = previous_state.after_partial_write();
        let state_changed = previous_state != self.freshness.wallets;

        match self.wallets.iter_mut().find(|w| w.id == wallet.id) {
            Some(existing) if *existing == wallet => state_changed,
            Some(existing) => {
                *existing = wallet;
                true
            }
            None => {
                self.wallets.push(wallet);
                true
            }
        }
    }

    /// Patches only the balance of the matching wallet. No-op when absent.
    pub fn patch_wallet_balance(&mut self, wallet_id: WalletId, balance: Decimal) -> bool {
        match self.wallets.iter_mut().find(|w| w.id == wallet_id) {
            Some(existing) if existing.balance != balance => {
                existing.balance = balance;
                true
            }
            _ => false,
        }
    }

    /// Removes the matching wallet. No-op when absent.
    pub fn remove_wallet(&mut self, wallet_id: WalletId) -> bool {
        let before = self.wallets.len();
        self.wallets.retain(|w| w.id != wallet_id);
        before != self.wallets.len()
    }

    /// Replaces the whole list with an authoritative one.
    ///
    /// Duplicate ids keep the position of their first occurrence and the
    /// value of their last.
    pub fn replace_wallets(&mut self, wallets: Vec<Wallet>) -> bool {
        let mut deduped: Vec<Wallet> = Vec::with_capacity(wallets.len());
        for wallet in wallets {
            match deduped.iter_mut().find(|w| w.id == wallet.id) {
                Some(existing) => *existing = wallet,
                None => deduped.push(wallet),
            }
        }
        let changed = self.wallets != deduped || self.freshness.wallets != FieldState::Fresh;
        self.wallets = deduped;
        self.freshness.wallets = FieldState::Fresh;
        changed
    }

    pub fn set_total_balance(&mut self, total_balance: Decimal) -> bool {
        let changed = self.stats.total_balance != total_balance
            || self.freshness.total_balance != FieldState::Fresh;
        self.stats.total_balance = total_balance;
        self.freshness.total_balance = FieldState::Fresh;
        changed
    }

    /// Applies the spending and savings figures of a period summary.
    pub fn set_period_summary(&mut self, summary: &PeriodSummary) -> bool {
        let changed = self.stats.total_spending != summary.total_spent
            || self.stats.total_saved != summary.total_saved
            || self.freshness.total_spending != FieldState::Fresh
            || self.freshness.total_saved != FieldState::Fresh;
        self.stats.total_spending = summary.total_spent;
        self.stats.total_saved = summary.total_saved;
        self.freshness.total_spending = FieldState::Fresh;
        self.freshness.total_saved = FieldState::Fresh;
        changed
    }

    /// Sets the display currency. A user record without one keeps the
    /// current value but still counts as a successful read.
    pub fn set_default_currency(&mut self, currency: Option<&str>) -> bool {
        let mut changed = self.freshness.default_currency != FieldState::Fresh;
        if let Some(currency) = currency.filter(|c| !c.is_empty()) {
            changed |= self.stats.default_currency != currency;
            self.stats.default_currency = currency.to_string();
        }
        self.freshness.default_currency = FieldState::Fresh;
        changed
    }

    /// Marks the wallet list and every stats field as stale.
    pub fn invalidate(&mut self) -> bool {
        let before = self.freshness;
        self.freshness = Freshness {
            wallets: before.wallets.invalidated(),
            total_balance: before.total_balance.invalidated(),
            total_spending: before.total_spending.invalidated(),
            total_saved: before.total_saved.invalidated(),
            default_currency: before.default_currency.invalidated(),
        };
        before != self.freshness
    }

    /// Marks every stats field as stale, leaving the wallet list alone.
    pub fn invalidate_stats(&mut self) -> bool {
        let before = self.freshness;
        self.freshness.total_balance = before.total_balance.invalidated();
        self.freshness.total_spending = before.total_spending.invalidated();
        self.freshness.total_saved = before.total_saved.invalidated();
        self.freshness.default_currency = before.default_currency.invalidated();
        before != self.freshness
    }
}
