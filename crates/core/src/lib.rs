//! Fintrack Core - client-side state for a personal finance API.
//!
//! This crate keeps the wallet list and aggregate statistics of one signed-in
//! user consistent with the server under user commands, push events and
//! periodic re-synchronization. It is transport-agnostic: the gateway and the
//! push event source are traits implemented by the `fintrack-client` crate.

pub mod charts;
pub mod errors;
pub mod events;
pub mod gateway;
pub mod notifications;
pub mod summary;
pub mod sync;
pub mod transactions;
pub mod utils;
pub mod wallets;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
