//! Tests for snapshot merge rules.

#[cfg(test)]
mod tests {
    use crate::summary::{AggregateStats, PeriodSummary};
    use crate::sync::{FieldState, Snapshot};
    use crate::wallets::{Wallet, WalletType};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn wallet(id: i64, name: &str, balance: Decimal) -> Wallet {
        Wallet {
            id,
            name: name.to_string(),
            currency: "USD".to_string(),
            balance,
            wallet_type: WalletType::DebitCard,
            card_number: None,
            color: "#3B82F6".to_string(),
            created_at: None,
        }
    }

    fn loaded() -> Snapshot {
        Snapshot::seeded(
            Some(vec![wallet(1, "Main", dec!(100)), wallet(2, "Cash", dec!(20))]),
            Some(AggregateStats {
                total_balance: dec!(120),
                ..Default::default()
            }),
        )
    }

    // ==================== Upsert ====================

    #[test]
    fn test_upsert_is_idempotent() {
        let mut once = loaded();
        once.upsert_wallet(wallet(3, "Savings", dec!(5)));

        let mut twice = once.clone();
        assert!(!twice.upsert_wallet(wallet(3, "Savings", dec!(5))));
        assert_eq!(once, twice);
        assert_eq!(twice.wallets().len(), 3);
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut snapshot = loaded();
        assert!(snapshot.upsert_wallet(wallet(1, "Renamed", dec!(100))));

        let ids: Vec<i64> = snapshot.wallets().iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(snapshot.wallet(1).unwrap().name, "Renamed");
    }

    #[test]
    fn test_upsert_into_empty_snapshot_marks_list_fresh() {
        let mut snapshot = Snapshot::new();
        assert_eq!(snapshot.freshness().wallets, FieldState::Absent);

        snapshot.upsert_wallet(wallet(7, "New", dec!(0)));
        assert_eq!(snapshot.freshness().wallets, FieldState::Fresh);
    }

    #[test]
    fn test_upsert_does_not_heal_stale_list() {
        let mut snapshot = loaded();
        snapshot.invalidate();
        snapshot.upsert_wallet(wallet(1, "Main", dec!(90)));
        assert_eq!(snapshot.freshness().wallets, FieldState::Stale);
    }

    // ==================== Balance patch ====================

    #[test]
    fn test_balance_patch_touches_only_balance() {
        let mut snapshot = loaded();
        let before = snapshot.clone();

        assert!(snapshot.patch_wallet_balance(1, dec!(250)));

        let patched = snapshot.wallet(1).unwrap();
        let original = before.wallet(1).unwrap();
        assert_eq!(patched.balance, dec!(250));
        assert_eq!(patched.name, original.name);
        assert_eq!(patched.currency, original.currency);
        assert_eq!(patched.color, original.color);
        assert_eq!(snapshot.wallet(2), before.wallet(2));
        assert_eq!(snapshot.stats(), before.stats());
    }

    #[test]
    fn test_balance_patch_for_unknown_wallet_is_noop() {
        let mut snapshot = loaded();
        let before = snapshot.clone();
        assert!(!snapshot.patch_wallet_balance(99, dec!(1)));
        assert_eq!(snapshot, before);
    }

    // ==================== Delete ====================

    #[test]
    fn test_delete_unknown_wallet_is_noop() {
        let mut snapshot = loaded();
        let before = snapshot.clone();
        assert!(!snapshot.remove_wallet(42));
        assert_eq!(snapshot, before);
    }

    #[test]
    fn test_delete_twice() {
        let mut snapshot = loaded();
        assert!(snapshot.remove_wallet(1));
        assert!(!snapshot.remove_wallet(1));
        assert_eq!(snapshot.wallets().len(), 1);
    }

    // ==================== Authoritative writes ====================

    #[test]
    fn test_replace_wallets_dedupes_by_id() {
        let mut snapshot = Snapshot::new();
        snapshot.replace_wallets(vec![
            wallet(1, "First", dec!(1)),
            wallet(2, "Other", dec!(2)),
            wallet(1, "Last", dec!(3)),
        ]);

        assert_eq!(snapshot.wallets().len(), 2);
        assert_eq!(snapshot.wallets()[0].id, 1);
        assert_eq!(snapshot.wallets()[0].name, "Last");
    }

    #[test]
    fn test_replace_wallets_heals_stale_list() {
        let mut snapshot = loaded();
        snapshot.invalidate();
        let wallets = snapshot.wallets().to_vec();

        assert!(snapshot.replace_wallets(wallets));
        assert_eq!(snapshot.freshness().wallets, FieldState::Fresh);
    }

    #[test]
    fn test_period_summary_maps_spent_and_saved() {
        let mut snapshot = Snapshot::new();
        snapshot.set_period_summary(&PeriodSummary {
            total_income: dec!(1000),
            total_spent: dec!(400),
            total_saved: dec!(600),
        });

        assert_eq!(snapshot.stats().total_spending, dec!(400));
        assert_eq!(snapshot.stats().total_saved, dec!(600));
        assert_eq!(snapshot.stats().total_balance, dec!(0));
        assert_eq!(snapshot.freshness().total_balance, FieldState::Absent);
    }

    #[test]
    fn test_missing_currency_keeps_current_value() {
        let mut snapshot = Snapshot::new();
        snapshot.set_default_currency(Some("EUR"));
        snapshot.set_default_currency(None);
        assert_eq!(snapshot.stats().default_currency, "EUR");
        assert_eq!(snapshot.freshness().default_currency, FieldState::Fresh);
    }

    // ==================== Invalidation ====================

    #[test]
    fn test_invalidate_stats_leaves_wallets_fresh() {
        let mut snapshot = loaded();
        assert!(snapshot.invalidate_stats());

        let freshness = snapshot.freshness();
        assert_eq!(freshness.wallets, FieldState::Fresh);
        assert_eq!(freshness.total_balance, FieldState::Stale);
        assert_eq!(freshness.total_spending, FieldState::Stale);
        assert!(!snapshot.invalidate_stats());
    }

    #[test]
    fn test_invalidate_keeps_absent_fields_absent() {
        let mut snapshot = Snapshot::seeded(Some(vec![wallet(1, "Main", dec!(1))]), None);
        snapshot.invalidate();

        let freshness = snapshot.freshness();
        assert_eq!(freshness.wallets, FieldState::Stale);
        assert_eq!(freshness.total_balance, FieldState::Absent);
    }
}
