//! Month-granularity series.

use chrono::{Datelike, Month};
use rust_decimal::Decimal;

use super::charts_model::MonthlyBucket;
use crate::transactions::{Transaction, TransactionKind};

/// Twelve buckets, January first, for the given calendar year.
pub fn build_monthly_series(transactions: &[Transaction], year: i32) -> Vec<MonthlyBucket> {
    let mut buckets: Vec<MonthlyBucket> = (1..=12u32)
        .map(|month| MonthlyBucket {
            month,
            label: month_label(month),
            income: Decimal::ZERO,
            expense: Decimal::ZERO,
        })
        .collect();

    for transaction in transactions {
        let date = transaction.transaction_date;
        if date.year() != year {
            continue;
        }
        let bucket = &mut buckets[date.month0() as usize];
        match transaction.kind {
            TransactionKind::Income => {
                bucket.income = bucket.income.saturating_add(transaction.amount)
            }
            TransactionKind::Expense => {
                bucket.expense = bucket.expense.saturating_add(transaction.amount)
            }
            TransactionKind::Transfer => {}
        }
    }

    buckets
}

fn month_label(month: u32) -> String {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name()[..3].to_string())
        .unwrap_or_default()
}
