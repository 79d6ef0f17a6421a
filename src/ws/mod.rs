//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The endpoint at `/ws` accepts `subscribe`, `unsubscribe` and `get_state`
//! commands and pushes every bus event matching the connection's
//! subscriptions.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
