//! Push events module.
//!
//! Provides the typed notifications delivered by the server's push channel
//! and the listener registry used to bind handlers to them. Events carry no
//! ordering or delivery guarantee relative to gateway responses.

mod push_event;
mod source;

pub use push_event::*;
pub use source::*;
