//! Shared helpers for integration tests: spawns the gateway on an
//! ephemeral port.

#![allow(dead_code, clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use cpamm_gateway::app_state::AppState;
use cpamm_gateway::build_app;
use cpamm_gateway::domain::{EventBus, PoolRegistry};
use cpamm_gateway::service::PoolService;
use serde_json::{Value, json};

/// Starts a server with a fresh in-memory registry and returns its address.
pub async fn spawn_server() -> SocketAddr {
    let registry = Arc::new(PoolRegistry::new());
    let service = Arc::new(PoolService::new(registry, EventBus::new(1024)));
    let app = build_app(AppState::new(service), Duration::from_secs(30));

    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// `POST`s JSON and returns `(status, body)`.
pub async fn post(client: &reqwest::Client, url: &str, body: Value) -> (u16, Value) {
    let Ok(resp) = client.post(url).json(&body).send().await else {
        panic!("request to {url} failed");
    };
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap_or(Value::Null))
}

/// `GET`s and returns `(status, body)`.
pub async fn get(client: &reqwest::Client, url: &str) -> (u16, Value) {
    let Ok(resp) = client.get(url).send().await else {
        panic!("request to {url} failed");
    };
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap_or(Value::Null))
}

/// Creates a DAPP/USD pool and returns its ID.
pub async fn create_pool(client: &reqwest::Client, base: &str) -> String {
    let (status, body) = post(
        client,
        &format!("{base}/api/v1/pools"),
        json!({
            "token1": {"address": "0xdapp", "symbol": "DAPP"},
            "token2": {"address": "0xusd", "symbol": "USD"},
            "name": "DAPP/USD"
        }),
    )
    .await;
    assert_eq!(status, 201, "{body}");
    body.get("pool_id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Reads a string field from a JSON body.
pub fn field<'a>(body: &'a Value, key: &str) -> &'a str {
    body.get(key).and_then(Value::as_str).unwrap_or_default()
}

/// Reads `error.code` from an error body.
pub fn error_code(body: &Value) -> u64 {
    body.get("error")
        .and_then(|e| e.get("code"))
        .and_then(Value::as_u64)
        .unwrap_or_default()
}
