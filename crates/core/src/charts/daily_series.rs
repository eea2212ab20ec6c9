//! Day-granularity series.

use chrono::{Duration, Local, NaiveDate};

use super::charts_model::{ChartWindow, DailyBucket};
use crate::transactions::{Transaction, TransactionKind};

/// Buckets transactions into the `window` days ending at `today`, oldest
/// first.
///
/// Always returns exactly `window.days()` buckets. Transfers and
/// transactions outside the window are ignored. Bucket sums saturate at
/// the decimal bounds.
pub fn build_series(
    transactions: &[Transaction],
    window: ChartWindow,
    today: NaiveDate,
) -> Vec<DailyBucket> {
    let from = today - Duration::days(i64::from(window.days()) - 1);
    build_range_series(transactions, from, today)
}

/// Same as [`build_series`], anchored on the local calendar date.
pub fn build_series_today(transactions: &[Transaction], window: ChartWindow) -> Vec<DailyBucket> {
    build_series(transactions, window, Local::now().date_naive())
}

/// One bucket per day of the inclusive range `[from, to]`. Empty when
/// `from > to`.
pub fn build_range_series(
    transactions: &[Transaction],
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<DailyBucket> {
    if from > to {
        return Vec::new();
    }

    let mut buckets: Vec<DailyBucket> = from
        .iter_days()
        .take_while(|date| *date <= to)
        .map(DailyBucket::empty)
        .collect();

    for transaction in transactions {
        let date = transaction.transaction_date;
        if date < from || date > to {
            continue;
        }
        let Ok(index) = usize::try_from((date - from).num_days()) else {
            continue;
        };
        let Some(bucket) = buckets.get_mut(index) else {
            continue;
        };
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
