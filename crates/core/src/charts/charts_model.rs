//! Chart data models.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Fixed day windows offered by the transaction charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ChartWindow {
    #[serde(rename = "7d")]
    Week,
    #[default]
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
}

impl ChartWindow {
    pub const ALL: [ChartWindow; 3] = [ChartWindow::Week, ChartWindow::Month, ChartWindow::Quarter];

    /// Number of daily buckets in the window.
    pub fn days(&self) -> u32 {
        match self {
            ChartWindow::Week => 7,
            ChartWindow::Month => 30,
            ChartWindow::Quarter => 90,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartWindow::Week => "7d",
            ChartWindow::Month => "30d",
            ChartWindow::Quarter => "90d",
        }
    }

    /// Parses `"7d"`, `"30d"` or `"90d"`. The unit suffix is optional.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        let days = trimmed.strip_suffix('d').unwrap_or(trimmed);
        Self::ALL
            .into_iter()
            .find(|w| w.days().to_string() == days)
            .ok_or_else(|| {
                ValidationError::InvalidInput(format!("Unsupported chart window '{}'", value))
            })
    }
}

impl FromStr for ChartWindow {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for ChartWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Income and expense totals of one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub income: Decimal,
    pub expense: Decimal,
}

impl DailyBucket {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            income: Decimal::ZERO,
            expense: Decimal::ZERO,
        }
    }

    pub fn net(&self) -> Decimal {
        self.income.saturating_sub(self.expense)
    }
}

/// Income and expense totals of one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyBucket {
    /// 1 = January.
    pub month: u32,
    /// Short English month name, e.g. `"Jan"`.
    pub label: String,
    pub income: Decimal,
    pub expense: Decimal,
}

/// Expense total of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category_name: String,
    pub total: Decimal,
    pub count: usize,
    /// Share of all expenses in percent, two decimal places.
    pub share: Decimal,
}
