//! Tests for wallet domain models.

#[cfg(test)]
mod tests {
    use crate::wallets::{NewWallet, Wallet, WalletType, WalletUpdate};
    use rust_decimal_macros::dec;

    fn wallet_with_card(card_number: Option<&str>) -> Wallet {
        Wallet {
            id: 1,
            name: "Main".to_string(),
            currency: "USD".to_string(),
            balance: dec!(0),
            wallet_type: WalletType::DebitCard,
            card_number: card_number.map(str::to_string),
            color: "#6FBAFC".to_string(),
            created_at: None,
        }
    }

    // ==================== WalletType Serialization ====================

    #[test]
    fn test_wallet_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&WalletType::SavingAccount).unwrap(),
            "\"saving_account\""
        );
        assert_eq!(
            serde_json::from_str::<WalletType>("\"credit_card\"").unwrap(),
            WalletType::CreditCard
        );
        assert_eq!(WalletType::Loan.as_str(), "loan");
    }

    // ==================== Wallet Deserialization ====================

    #[test]
    fn test_wallet_from_server_payload() {
        let json = r##"{
            "id": 7,
            "name": "Savings",
            "currency": "EUR",
            "balance": "1250.50",
            "wallet_type": "saving_account",
            "card_number": null,
            "color": "#10B981",
            "user_id": 3,
            "created_at": "2024-05-01T09:30:00"
        }"##;

        let wallet: Wallet = serde_json::from_str(json).unwrap();
        assert_eq!(wallet.id, 7);
        assert_eq!(wallet.currency, "EUR");
        assert_eq!(wallet.balance, dec!(1250.50));
        assert_eq!(wallet.wallet_type, WalletType::SavingAccount);
        assert!(wallet.created_at.is_some());
    }

    #[test]
    fn test_wallet_accepts_offset_timestamp() {
        let json = r##"{
            "id": 7,
            "name": "Savings",
            "currency": "EUR",
            "balance": 1250.5,
            "wallet_type": "saving_account",
            "color": "#10B981",
            "created_at": "2024-05-01T09:30:00.123456+00:00"
        }"##;

        let wallet: Wallet = serde_json::from_str(json).unwrap();
        assert_eq!(
            wallet.created_at.map(|t| t.to_rfc3339()).as_deref(),
            Some("2024-05-01T09:30:00.123456+00:00")
        );
    }

    #[test]
    fn test_wallet_list_with_mixed_timestamps() {
        let json = r#"[
            {"id": 1, "name": "Main", "created_at": "2024-05-01T09:30:00+02:00"},
            {"id": 2, "name": "Cash", "created_at": "2024-05-01T07:30:00"},
            {"id": 3, "name": "Card", "created_at": null}
        ]"#;

        let wallets: Vec<Wallet> = serde_json::from_str(json).unwrap();
        assert_eq!(wallets.len(), 3);
        assert_eq!(wallets[0].created_at, wallets[1].created_at);
        assert!(wallets[2].created_at.is_none());
    }

    #[test]
    fn test_wallet_defaults_for_sparse_payload() {
        let wallet: Wallet = serde_json::from_str(r#"{"id": 5, "name": "Cash"}"#).unwrap();
        assert_eq!(wallet.currency, "USD");
        assert_eq!(wallet.balance, dec!(0));
        assert_eq!(wallet.color, "#3B82F6");
        assert!(wallet.card_number.is_none());
    }

    #[test]
    fn test_wallet_accepts_numeric_balance() {
        let wallet: Wallet =
            serde_json::from_str(r#"{"id": 1, "name": "Main", "balance": 250}"#).unwrap();
        assert_eq!(wallet.balance, dec!(250));
    }

    // ==================== Card masking ====================

    #[test]
    fn test_masked_card_number_keeps_last_four() {
        let wallet = wallet_with_card(Some("4111 1111 1111 1234"));
        assert_eq!(wallet.masked_card_number().as_deref(), Some("**** 1234"));
    }

    #[test]
    fn test_masked_card_number_short_or_missing() {
        assert_eq!(
            wallet_with_card(Some("12")).masked_card_number().as_deref(),
            Some("**** 12")
        );
        assert!(wallet_with_card(Some("")).masked_card_number().is_none());
        assert!(wallet_with_card(None).masked_card_number().is_none());
    }

    // ==================== Payloads ====================

    #[test]
    fn test_new_wallet_defaults() {
        let wallet = NewWallet::new("Travel", WalletType::Cash);
        assert_eq!(wallet.currency, "USD");
        assert_eq!(wallet.color, "#3B82F6");
        assert_eq!(wallet.balance, dec!(0));
    }

    #[test]
    fn test_wallet_update_serializes_only_present_fields() {
        let update = WalletUpdate {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "Renamed" }));
        assert!(!update.is_empty());
        assert!(WalletUpdate::default().is_empty());
    }
}
