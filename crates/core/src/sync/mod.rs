//! View-state synchronization.
//!
//! Owns the client-side snapshot of wallets and aggregate statistics and
//! reconciles it with the server under unordered inputs.

mod config;
mod lifecycle;
mod refresh_worker;
mod snapshot;
mod subscription;
mod synchronizer;

pub use config::*;
pub use lifecycle::*;
pub use snapshot::*;
pub use subscription::*;
pub use synchronizer::*;

#[cfg(test)]
mod snapshot_tests;
