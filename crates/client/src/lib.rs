//! Fintrack Client - transport implementations for `fintrack-core`.
//!
//! - [`HttpGateway`] implements the gateway over the REST API.
//! - [`WebSocketEventSource`] implements the push event source over the
//!   per-user WebSocket channel, with bounded reconnection.

mod client;
mod error;
mod websocket;

pub use client::{HttpGateway, API_PREFIX, DEFAULT_TIMEOUT_SECS};
pub use error::{ClientError, Result};
pub use websocket::{ReconnectPolicy, WebSocketEventSource};
