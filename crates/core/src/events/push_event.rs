//! Push event types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{Error, Result};
use crate::transactions::TransactionId;
use crate::wallets::{Wallet, WalletId};

/// Named channels of the push event source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    WalletCreated,
    WalletUpdated,
    WalletDeleted,
    TransactionCreated,
    TransactionUpdated,
    TransactionDeleted,
    Connected,
    Disconnected,
    Error,
    ReconnectionFailed,
}

impl EventKind {
    pub const ALL: [EventKind; 10] = [
        EventKind::WalletCreated,
        EventKind::WalletUpdated,
        EventKind::WalletDeleted,
        EventKind::TransactionCreated,
        EventKind::TransactionUpdated,
        EventKind::TransactionDeleted,
        EventKind::Connected,
        EventKind::Disconnected,
        EventKind::Error,
        EventKind::ReconnectionFailed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::WalletCreated => "wallet_created",
            EventKind::WalletUpdated => "wallet_updated",
            EventKind::WalletDeleted => "wallet_deleted",
            EventKind::TransactionCreated => "transaction_created",
            EventKind::TransactionUpdated => "transaction_updated",
            EventKind::TransactionDeleted => "transaction_deleted",
            EventKind::Connected => "connected",
            EventKind::Disconnected => "disconnected",
            EventKind::Error => "error",
            EventKind::ReconnectionFailed => "reconnection_failed",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Connection lifecycle kinds never touch the snapshot.
    pub fn is_informational(&self) -> bool {
        matches!(
            self,
            EventKind::Connected
                | EventKind::Disconnected
                | EventKind::Error
                | EventKind::ReconnectionFailed
        )
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionChange {
    Created,
    Updated,
    Deleted,
}

/// Payload of a transaction event.
///
/// This is a signal to re-synchronize, not a source of truth: a single
/// transaction can move money in two wallets and in category rollups the
/// client does not replicate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionEvent {
    #[serde(default)]
    pub transaction_id: Option<TransactionId>,
    #[serde(default)]
    pub wallet_id: Option<WalletId>,
    #[serde(default)]
    pub wallet_balance: Option<Decimal>,
}

/// A decoded notification from the push event source.
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    WalletCreated {
        wallet: Wallet,
    },
    WalletUpdated {
        wallet_id: WalletId,
        wallet_balance: Option<Decimal>,
        wallet: Option<Wallet>,
    },
    WalletDeleted {
        wallet_id: WalletId,
    },
    Transaction {
        change: TransactionChange,
        event: TransactionEvent,
    },
    /// `connected`, `disconnected`, `error` and `reconnection_failed`.
    Lifecycle {
        kind: EventKind,
        detail: Value,
    },
}

/// Wire envelope: `{"event": "<name>", "data": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Deserialize)]
struct WalletCreatedData {
    wallet: Wallet,
}

#[derive(Deserialize)]
struct WalletUpdatedData {
    #[serde(default, alias = "id")]
    wallet_id: Option<WalletId>,
    #[serde(default, alias = "balance")]
    wallet_balance: Option<Decimal>,
    #[serde(default)]
    wallet: Option<Value>,
}

/// Fields read from a `wallet` object that is not a complete wallet.
#[derive(Default, Deserialize)]
struct PartialWallet {
    #[serde(default)]
    id: Option<WalletId>,
    #[serde(default)]
    balance: Option<Decimal>,
}

/// Splits the `wallet` object of a `wallet_updated` payload into a full
/// wallet, or the id and balance of a partial one.
///
/// An object without a balance is never taken as a full wallet, so a
/// missing balance cannot reset the stored one.
fn split_wallet(value: Option<Value>) -> (Option<Wallet>, PartialWallet) {
    let Some(value) = value.filter(|v| v.is_object()) else {
        return (None, PartialWallet::default());
    };
    if value.get("balance").is_some() {
        if let Ok(wallet) = Wallet::deserialize(&value) {
            return (Some(wallet), PartialWallet::default());
        }
    }
    let partial = PartialWallet::deserialize(&value).unwrap_or_default();
    (None, partial)
}

#[derive(Deserialize)]
struct WalletDeletedData {
    #[serde(alias = "id")]
    wallet_id: WalletId,
}

impl PushEvent {
    /// Decodes the payload of a named event.
    pub fn from_parts(kind: EventKind, data: Value) -> Result<Self> {
        let event = match kind {
            EventKind::WalletCreated => {
                let data: WalletCreatedData = serde_json::from_value(data)?;
                PushEvent::WalletCreated {
                    wallet: data.wallet,
                }
            }
            EventKind::WalletUpdated => {
                let data: WalletUpdatedData = serde_json::from_value(data)?;
                let (wallet, partial) = split_wallet(data.wallet);
                let wallet_id = data
                    .wallet_id
                    .or_else(|| wallet.as_ref().map(|w| w.id))
                    .or(partial.id)
                    .ok_or_else(|| Error::Decode("wallet_updated without wallet_id".to_string()))?;
                PushEvent::WalletUpdated {
                    wallet_id,
                    wallet_balance: data.wallet_balance.or(partial.balance),
                    wallet,
                }
            }
            EventKind::WalletDeleted => {
                let data: WalletDeletedData = serde_json::from_value(data)?;
                PushEvent::WalletDeleted {
                    wallet_id: data.wallet_id,
                }
            }
            EventKind::TransactionCreated
            | EventKind::TransactionUpdated
            | EventKind::TransactionDeleted => {
                let change = match kind {
                    EventKind::TransactionCreated => TransactionChange::Created,
                    EventKind::TransactionUpdated => TransactionChange::Updated,
                    _ => TransactionChange::Deleted,
                };
                let event = if data.is_null() {
                    TransactionEvent::default()
                } else {
                    serde_json::from_value(data)?
                };
                PushEvent::Transaction { change, event }
            }
            EventKind::Connected
            | EventKind::Disconnected
            | EventKind::Error
            | EventKind::ReconnectionFailed => PushEvent::Lifecycle { kind, detail: data },
        };
        Ok(event)
    }

    /// Parses a raw text frame.
    ///
    /// Returns `Ok(None)` for event names this client does not know about.
    pub fn parse_message(text: &str) -> Result<Option<Self>> {
        let envelope: EventEnvelope = serde_json::from_str(text)?;
        match EventKind::from_name(&envelope.event) {
            Some(kind) => Self::from_parts(kind, envelope.data).map(Some),
            None => Ok(None),
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            PushEvent::WalletCreated { .. } => EventKind::WalletCreated,
            PushEvent::WalletUpdated { .. } => EventKind::WalletUpdated,
            PushEvent::WalletDeleted { .. } => EventKind::WalletDeleted,
            PushEvent::Transaction { change, .. } => match change {
                TransactionChange::Created => EventKind::TransactionCreated,
                TransactionChange::Updated => EventKind::TransactionUpdated,
                TransactionChange::Deleted => EventKind::TransactionDeleted,
            },
            PushEvent::Lifecycle { kind, .. } => *kind,
        }
    }

    /// Builds a lifecycle event raised by the source itself.
    pub fn lifecycle(kind: EventKind, detail: Value) -> Self {
        PushEvent::Lifecycle { kind, detail }
    }
}
