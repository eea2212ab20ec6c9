//! Wallet domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Server-assigned wallet identifier.
pub type WalletId = i64;

pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_WALLET_COLOR: &str = "#3B82F6";

/// Kind of wallet as reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WalletType {
    #[default]
    DebitCard,
    Cash,
    CreditCard,
    SavingAccount,
    Investment,
    Loan,
    Mortgage,
    Goal,
}

impl WalletType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletType::DebitCard => "debit_card",
            WalletType::Cash => "cash",
            WalletType::CreditCard => "credit_card",
            WalletType::SavingAccount => "saving_account",
            WalletType::Investment => "investment",
            WalletType::Loan => "loan",
            WalletType::Mortgage => "mortgage",
            WalletType::Goal => "goal",
        }
    }
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_color() -> String {
    DEFAULT_WALLET_COLOR.to_string()
}

/// Client view of a wallet.
///
/// `balance` is always the last value delivered by the server, either in a
/// gateway response or in a push event. It is never derived locally from
/// transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: WalletId,
    pub name: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub balance: Decimal,
    #[serde(default)]
    pub wallet_type: WalletType,
    #[serde(default)]
    pub card_number: Option<String>,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(
        default,
        deserialize_with = "crate::utils::time_utils::deserialize_option_timestamp"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl Wallet {
    /// Returns the card number with everything but the last four digits hidden.
    pub fn masked_card_number(&self) -> Option<String> {
        let digits: Vec<char> = self
            .card_number
            .as_deref()?
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();
        if digits.is_empty() {
            return None;
        }
        let tail: String = digits[digits.len().saturating_sub(4)..].iter().collect();
        Some(format!("**** {}", tail))
    }
}

/// Input model for creating a new wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWallet {
    pub name: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub wallet_type: WalletType,
    #[serde(default)]
    pub card_number: Option<String>,
    #[serde(default = "default_color")]
    pub color: String,
    /// Initial deposit. The resulting balance side effects are computed by
    /// the server.
    #[serde(default)]
    pub balance: Decimal,
}

impl NewWallet {
    pub fn new(name: impl Into<String>, wallet_type: WalletType) -> Self {
        Self {
            name: name.into(),
            currency: default_currency(),
            wallet_type,
            card_number: None,
            color: default_color(),
            balance: Decimal::ZERO,
        }
    }
}

/// Partial update for an existing wallet. Only present fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_type: Option<WalletType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<Decimal>,
}

impl WalletUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.currency.is_none()
            && self.wallet_type.is_none()
            && self.card_number.is_none()
            && self.color.is_none()
            && self.balance.is_none()
    }
}
