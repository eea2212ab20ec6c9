//! Expense breakdown by category.

use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};

use super::charts_model::CategoryTotal;
use crate::transactions::{Transaction, TransactionKind};

pub const UNCATEGORIZED: &str = "Other";

/// Expense totals grouped by category name, largest first.
///
/// Transactions without a category name are grouped under `"Other"`. Ties
/// are ordered by name. At most `limit` entries are returned.
pub fn top_expense_categories(transactions: &[Transaction], limit: usize) -> Vec<CategoryTotal> {
    let mut totals: HashMap<&str, (Decimal, usize)> = HashMap::new();
    let mut grand_total = Decimal::ZERO;

    for transaction in transactions
        .iter()
        .filter(|t| t.kind == TransactionKind::Expense)
    {
        let name = transaction
            .category_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(UNCATEGORIZED);
        let entry = totals.entry(name).or_insert((Decimal::ZERO, 0));
        entry.0 = entry.0.saturating_add(transaction.amount);
        entry.1 += 1;
        grand_total = grand_total.saturating_add(transaction.amount);
    }

    let mut categories: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(name, (total, count))| CategoryTotal {
            category_name: name.to_string(),
            total,
            count,
            share: share_of(total, grand_total),
        })
        .collect();

    categories.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.category_name.cmp(&b.category_name))
    });
    categories.truncate(limit);
    categories
}

fn share_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|share| share.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .unwrap_or(Decimal::ZERO)
}
