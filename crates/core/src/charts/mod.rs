//! Chart aggregation.
//!
//! Pure functions bucketing a flat transaction list for the dashboard and
//! transaction charts. None of them fail: malformed or out-of-range input
//! is skipped.

mod categories;
mod charts_model;
mod daily_series;
mod monthly_series;

pub use categories::*;
pub use charts_model::*;
pub use daily_series::*;
pub use monthly_series::*;
