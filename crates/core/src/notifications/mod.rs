//! User-visible notifications.
//!
//! Only failures of user-initiated commands reach the user. Background
//! refresh and push event failures are logged and never notified.

mod sink;

pub use sink::*;
