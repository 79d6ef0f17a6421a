//! WebSocket connection loop.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered events.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::{SubscriptionManager, parse_targets};
use crate::api::dto::PoolDetailResponse;
use crate::domain::{PoolEvent, PoolId};
use crate::service::PoolService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards matching events from the [`broadcast::Receiver`] to the client.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<PoolEvent>,
    pool_service: Arc<PoolService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_text_message(&text, &mut subs, &pool_service).await;
                        let json = serde_json::to_string(&reply).unwrap_or_default();
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(error = %e, "ws read failed");
                        break;
                    }
                    _ => {}
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(pool_event) => {
                        if subs.matches(pool_event.pool_id()) {
                            let json = serde_json::to_string(&WsMessage::event(&pool_event))
                                .unwrap_or_default();
                            if ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Handles one text frame from the client and builds the reply envelope.
async fn handle_text_message(
    text: &str,
    subs: &mut SubscriptionManager,
    pool_service: &PoolService,
) -> WsMessage {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return WsMessage::error(String::new(), 400, "malformed JSON");
    };
    if msg.msg_type != WsMessageType::Command {
        return WsMessage::error(msg.id, 400, "expected a command message");
    }

    let command = match serde_json::from_value::<WsCommand>(msg.payload.clone()) {
        Ok(command) => command,
        Err(e) => {
            let name = msg.payload.get("command").and_then(|v| v.as_str());
            return match name {
                Some(name) if WsCommand::NAMES.contains(&name) => {
                    WsMessage::error(msg.id, 400, format!("invalid {name} command: {e}"))
                }
                _ => WsMessage::error(msg.id, 404, "unknown command"),
            };
        }
    };

    match command {
        WsCommand::Subscribe { pool_ids } => {
            let targets = parse_targets(&pool_ids);
            subs.subscribe(&targets.pool_ids, targets.wildcard);
            WsMessage::response(
                msg.id,
                serde_json::json!({
                    "subscribed": targets.pool_ids,
                    "rejected": targets.rejected,
                    "count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
        WsCommand::Unsubscribe { pool_ids } => {
            let targets = parse_targets(&pool_ids);
            subs.unsubscribe(&targets.pool_ids, targets.wildcard);
            WsMessage::response(
                msg.id,
                serde_json::json!({
                    "unsubscribed": targets.pool_ids,
                    "remaining_count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
        WsCommand::GetState { pool_id } => {
            let Ok(pool_id) = pool_id.parse::<PoolId>() else {
                return WsMessage::error(msg.id, 400, format!("invalid pool_id: {pool_id}"));
            };
            match pool_service.pool_state(pool_id).await {
                Ok(state) => WsMessage::response(
                    msg.id,
                    serde_json::to_value(PoolDetailResponse::from(state)).unwrap_or_default(),
                ),
                Err(e) => WsMessage::error(msg.id, e.status_code().as_u16(), e.to_string()),
            }
        }
    }
}
