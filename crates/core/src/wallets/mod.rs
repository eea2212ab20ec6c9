//! Wallets module - client-side wallet models.

mod wallets_model;

#[cfg(test)]
mod wallets_model_tests;

pub use wallets_model::*;
