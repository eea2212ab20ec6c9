//! Aggregate statistics and gateway read models.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::wallets::DEFAULT_CURRENCY;

/// Rollup shown next to the wallet list.
///
/// Every field is re-queried from the server. None of them is derived from
/// individual transaction deltas, since the server applies currency
/// conversion and category rules the client does not replicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    pub total_balance: Decimal,
    pub total_spending: Decimal,
    pub total_saved: Decimal,
    pub default_currency: String,
}

impl Default for AggregateStats {
    fn default() -> Self {
        Self {
            total_balance: Decimal::ZERO,
            total_spending: Decimal::ZERO,
            total_saved: Decimal::ZERO,
            default_currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

/// Answer of the total balance endpoint.
///
/// The server has answered with a bare number, `{"total_balance": n}` and
/// `{"balance": n}` over time; all three decode into the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct TotalBalance(pub Decimal);

impl TotalBalance {
    pub fn amount(&self) -> Decimal {
        self.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TotalBalanceRepr {
    Amount(Decimal),
    Object {
        #[serde(default)]
        total_balance: Option<Decimal>,
        #[serde(default)]
        balance: Option<Decimal>,
    },
}

impl<'de> Deserialize<'de> for TotalBalance {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let amount = match TotalBalanceRepr::deserialize(deserializer)? {
            TotalBalanceRepr::Amount(amount) => amount,
            TotalBalanceRepr::Object {
                total_balance,
                balance,
            } => total_balance.or(balance).unwrap_or(Decimal::ZERO),
        };
        Ok(TotalBalance(amount))
    }
}

/// Income/spending summary for the current period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PeriodSummary {
    #[serde(default)]
    pub total_income: Decimal,
    #[serde(default)]
    pub total_spent: Decimal,
    #[serde(default)]
    pub total_saved: Decimal,
}

/// The signed-in user, as far as the synchronizer cares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub default_currency: Option<String>,
}

/// Monthly budget for the current month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub year: i32,
    pub month: u32,
    pub monthly_limit: Decimal,
    #[serde(default)]
    pub monthly_spent: Decimal,
}

impl Budget {
    /// Amount left before the limit is reached. Negative when overspent.
    pub fn remaining(&self) -> Decimal {
        self.monthly_limit - self.monthly_spent
    }

    /// Spent share of the limit, `None` when no limit is set.
    pub fn utilization(&self) -> Option<Decimal> {
        if self.monthly_limit <= Decimal::ZERO {
            return None;
        }
        Some(self.monthly_spent / self.monthly_limit)
    }

    pub fn is_exceeded(&self) -> bool {
        self.monthly_spent > self.monthly_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_total_balance_accepts_all_shapes() {
        let bare: TotalBalance = serde_json::from_str("1520.75").unwrap();
        assert_eq!(bare.amount(), dec!(1520.75));

        let total: TotalBalance = serde_json::from_str(r#"{"total_balance": 300}"#).unwrap();
        assert_eq!(total.amount(), dec!(300));

        let balance: TotalBalance = serde_json::from_str(r#"{"balance": "12.5"}"#).unwrap();
        assert_eq!(balance.amount(), dec!(12.5));

        let empty: TotalBalance = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.amount(), dec!(0));
    }

    #[test]
    fn test_total_balance_prefers_total_field() {
        let value: TotalBalance =
            serde_json::from_str(r#"{"total_balance": 10, "balance": 99}"#).unwrap();
        assert_eq!(value.amount(), dec!(10));
    }

    #[test]
    fn test_aggregate_stats_default_currency() {
        let stats = AggregateStats::default();
        assert_eq!(stats.default_currency, "USD");
        assert_eq!(stats.total_balance, dec!(0));
    }

    #[test]
    fn test_budget_helpers() {
        let budget = Budget {
            year: 2024,
            month: 6,
            monthly_limit: dec!(1000),
            monthly_spent: dec!(250),
        };
        assert_eq!(budget.remaining(), dec!(750));
        assert_eq!(budget.utilization(), Some(dec!(0.25)));
        assert!(!budget.is_exceeded());

        let unlimited = Budget {
            monthly_limit: dec!(0),
            ..budget
        };
        assert_eq!(unlimited.utilization(), None);
    }
}
