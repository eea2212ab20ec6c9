//! Remote data gateway contract.
//!
//! The gateway is the only path to server state. Implementations live outside
//! this crate (see `fintrack-client`); tests use in-memory doubles.

mod gateway_traits;

pub use gateway_traits::*;
