//! WebSocket message types: envelope, commands, and events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::PoolEvent;

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; server-generated for events.
    #[serde(default)]
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl WsMessage {
    /// Response to the command with the given `id`.
    #[must_use]
    pub fn response(id: String, payload: serde_json::Value) -> Self {
        Self {
            id,
            msg_type: WsMessageType::Response,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Error envelope with an HTTP-like numeric code.
    #[must_use]
    pub fn error(id: String, code: u16, message: impl Into<String>) -> Self {
        Self {
            id,
            msg_type: WsMessageType::Error,
            timestamp: Utc::now(),
            payload: serde_json::json!({
                "code": code,
                "message": message.into(),
            }),
        }
    }

    /// Server push wrapping a bus event.
    #[must_use]
    pub fn event(event: &PoolEvent) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            msg_type: WsMessageType::Event,
            timestamp: Utc::now(),
            payload: serde_json::to_value(event).unwrap_or_default(),
        }
    }
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client broadcast event.
    Event,
    /// Server → Client error.
    Error,
}

/// Commands that a client can send in a `command` envelope's payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Subscribe to events for specific pools.
    Subscribe {
        /// Pool IDs to subscribe to. Use `["*"]` for all pools.
        pool_ids: Vec<String>,
    },
    /// Unsubscribe from events for specific pools.
    Unsubscribe {
        /// Pool IDs to unsubscribe from. `"*"` drops the wildcard.
        pool_ids: Vec<String>,
    },
    /// Get full pool state.
    GetState {
        /// Target pool ID.
        pool_id: String,
    },
}

impl WsCommand {
    /// Names accepted in the `command` field.
    pub const NAMES: [&'static str; 3] = ["subscribe", "unsubscribe", "get_state"];
}
