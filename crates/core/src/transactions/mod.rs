//! Transactions module - transaction and transfer models.

mod transactions_model;

pub use transactions_model::*;
