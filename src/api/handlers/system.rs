//! System endpoints: health check and AMM configuration.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::amm::{DECIMALS, Shares};
use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health`: Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Fixed parameters shared by every pool.
#[derive(Debug, Serialize, ToSchema)]
pub struct AmmConfigResponse {
    curve: &'static str,
    formula: &'static str,
    decimals: u32,
    initial_shares: String,
    fee_bps: u32,
}

/// `GET /config/amm`: Curve parameters.
#[utoipa::path(
    get,
    path = "/config/amm",
    tag = "System",
    summary = "AMM configuration",
    description = "Returns the curve, token decimals, initial share supply and fee applied to every pool.",
    responses(
        (status = 200, description = "AMM configuration", body = AmmConfigResponse),
    )
)]
pub async fn amm_config_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(AmmConfigResponse {
            curve: "constant_product",
            formula: "x * y = k",
            decimals: DECIMALS,
            initial_shares: Shares::INITIAL.to_string(),
            fee_bps: 0,
        }),
    )
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/amm", get(amm_config_handler))
}
