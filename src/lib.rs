//! # cpamm-gateway
//!
//! A fee-less two-token constant-product automated market maker
//! (`reserve1 * reserve2 = k`) with a REST and WebSocket gateway.
//!
//! The pool core in [`amm`] is synchronous and transport-free: a
//! [`amm::PoolLedger`] owns reserves and share balances, quotes are pure
//! functions of the reserves, and every committed mutation appends one
//! event to the pool's log. The layers above add identity, concurrency,
//! transport and durability.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── PoolService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── PoolRegistry (domain/)
//!     ├── PoolLedger (amm/)
//!     │
//!     └── PostgreSQL Persistence (persistence/)
//! ```

pub mod amm;
pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

/// Builds the full HTTP application: REST routes, `/ws`, and the
/// tracing, CORS and timeout layers.
pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws::handler::ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .with_state(state)
}
