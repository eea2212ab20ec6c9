//! Transaction domain models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::wallets::WalletId;

pub type TransactionId = i64;
pub type CategoryId = i64;

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
            TransactionKind::Transfer => "transfer",
        }
    }
}

/// A transaction as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(default)]
    pub name: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub transaction_date: NaiveDate,
    pub wallet_id: WalletId,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(
        default,
        deserialize_with = "crate::utils::time_utils::deserialize_option_timestamp"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

/// Input model for recording a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub name: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub transaction_date: NaiveDate,
    pub wallet_id: WalletId,
    pub category_id: CategoryId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Tag ids, sent as a comma separated list.
    #[serde(default)]
    pub tags: Vec<i64>,
}

impl NewTransaction {
    /// Form fields in the order the API expects them.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("name", self.name.clone()),
            ("amount", self.amount.to_string()),
            ("type", self.kind.as_str().to_string()),
            ("transaction_date", self.transaction_date.to_string()),
            ("wallet_id", self.wallet_id.to_string()),
            ("category_id", self.category_id.to_string()),
        ];
        if let Some(note) = self.note.as_ref().filter(|n| !n.is_empty()) {
            fields.push(("note", note.clone()));
        }
        if !self.tags.is_empty() {
            let tags = self
                .tags
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(",");
            fields.push(("tags", tags));
        }
        fields
    }
}

/// Input model for moving money between two wallets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransfer {
    pub source_wallet_id: WalletId,
    pub destination_wallet_id: WalletId,
    pub amount: Decimal,
    #[serde(default)]
    pub note: Option<String>,
}

/// Server response to a transfer. Both legs are computed server-side,
/// including any currency conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferReceipt {
    #[serde(default)]
    pub message: String,
    pub source_transaction: Transaction,
    pub destination_transaction: Transaction,
    #[serde(default)]
    pub exchange_rate: Option<f64>,
    #[serde(default)]
    pub converted_amount: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_transaction_kind_uses_type_key() {
        let json = r#"{
            "id": 11,
            "name": "Groceries",
            "amount": "42.10",
            "type": "expense",
            "transaction_date": "2024-06-02",
            "wallet_id": 1,
            "category_id": 4,
            "user_id": 2,
            "tags": ["food"],
            "created_at": "2024-06-02T18:00:00"
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.kind, TransactionKind::Expense);
        assert_eq!(tx.amount, dec!(42.10));
        assert_eq!(tx.tags, vec!["food".to_string()]);
    }

    #[test]
    fn test_transaction_accepts_offset_timestamp() {
        let json = r#"{
            "id": 12,
            "amount": 10,
            "type": "income",
            "transaction_date": "2024-06-02",
            "wallet_id": 1,
            "created_at": "2024-06-02T18:00:00.5-05:00"
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(
            tx.created_at.map(|t| t.to_rfc3339()).as_deref(),
            Some("2024-06-02T23:00:00.500+00:00")
        );
    }

    #[test]
    fn test_form_fields_skip_empty_optionals() {
        let tx = NewTransaction {
            name: "Salary".to_string(),
            amount: dec!(3000),
            kind: TransactionKind::Income,
            transaction_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            wallet_id: 2,
            category_id: 9,
            note: Some(String::new()),
            tags: vec![],
        };
        let fields = tx.form_fields();
        assert_eq!(fields.len(), 6);
        assert_eq!(fields[2], ("type", "income".to_string()));
        assert_eq!(fields[3], ("transaction_date", "2024-06-01".to_string()));
    }

    #[test]
    fn test_form_fields_join_tags() {
        let tx = NewTransaction {
            name: "Dinner".to_string(),
            amount: dec!(55.5),
            kind: TransactionKind::Expense,
            transaction_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            wallet_id: 2,
            category_id: 3,
            note: Some("with friends".to_string()),
            tags: vec![1, 4],
        };
        let fields = tx.form_fields();
        assert!(fields.contains(&("note", "with friends".to_string())));
        assert!(fields.contains(&("tags", "1,4".to_string())));
    }
}
