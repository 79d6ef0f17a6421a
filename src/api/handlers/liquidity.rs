//! Liquidity handlers: deposit, withdraw and their quotes.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::amm::HolderId;
use crate::api::dto::{
    AddLiquidityRequest, AddLiquidityResponse, DepositQuoteRequest, DepositQuoteResponse,
    RemoveLiquidityRequest, RemoveLiquidityResponse, WithdrawQuoteRequest, WithdrawQuoteResponse,
    parse_amount, parse_shares,
};
use crate::app_state::AppState;
use crate::domain::PoolId;
use crate::error::{ErrorResponse, GatewayError};
use crate::service::DepositSide;

/// `POST /pools/:id/liquidity/add`: Deposit both tokens and mint shares.
///
/// # Errors
///
/// Returns [`GatewayError`] on malformed amounts, a missing pool, or a
/// deposit the ledger rejects (zero amount, ratio mismatch).
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/liquidity/add",
    tag = "Liquidity",
    summary = "Add liquidity",
    description = "Deposits token1 and token2. The first deposit sets the price; later deposits must match the reserve ratio.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
    ),
    request_body = AddLiquidityRequest,
    responses(
        (status = 200, description = "Liquidity added", body = AddLiquidityResponse),
        (status = 400, description = "Invalid amount", body = ErrorResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 422, description = "Ratio mismatch", body = ErrorResponse),
    )
)]
pub async fn add_liquidity(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<AddLiquidityRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let amount1 = parse_amount("amount1", &req.amount1)?;
    let amount2 = parse_amount("amount2", &req.amount2)?;

    let record = state
        .pool_service
        .add_liquidity(pool_id, &HolderId::new(req.holder), amount1, amount2)
        .await?;

    Ok(Json(AddLiquidityResponse::from_record(pool_id, record)))
}

/// `POST /pools/:id/liquidity/remove`: Burn shares for the proportional reserves.
///
/// # Errors
///
/// Returns [`GatewayError`] on malformed shares, a missing pool, or a
/// withdrawal the ledger rejects.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/liquidity/remove",
    tag = "Liquidity",
    summary = "Remove liquidity",
    description = "Burns the holder's shares and pays out token1 and token2 pro rata.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
    ),
    request_body = RemoveLiquidityRequest,
    responses(
        (status = 200, description = "Liquidity removed", body = RemoveLiquidityResponse),
        (status = 400, description = "Invalid amount", body = ErrorResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 422, description = "Insufficient shares", body = ErrorResponse),
    )
)]
pub async fn remove_liquidity(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<RemoveLiquidityRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let shares = parse_shares("shares", &req.shares)?;

    let record = state
        .pool_service
        .remove_liquidity(pool_id, &HolderId::new(req.holder), shares)
        .await?;

    Ok(Json(RemoveLiquidityResponse::from_record(pool_id, record)))
}

/// `POST /pools/:id/liquidity/quote`: Counterpart amount for a deposit.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] unless exactly one side is
/// given, or the quote engine's rejection.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/liquidity/quote",
    tag = "Liquidity",
    summary = "Quote a deposit",
    description = "Given one side of a deposit, returns the other side at the current ratio and the shares it would mint.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
    ),
    request_body = DepositQuoteRequest,
    responses(
        (status = 200, description = "Deposit quote", body = DepositQuoteResponse),
        (status = 400, description = "Invalid amount", body = ErrorResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 422, description = "Pool is empty", body = ErrorResponse),
    )
)]
pub async fn quote_deposit(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<DepositQuoteRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let side = match (req.amount1.as_deref(), req.amount2.as_deref()) {
        (Some(raw), None) => DepositSide::Amount1(parse_amount("amount1", raw)?),
        (None, Some(raw)) => DepositSide::Amount2(parse_amount("amount2", raw)?),
        _ => {
            return Err(GatewayError::InvalidRequest(
                "specify exactly one of amount1 or amount2".to_string(),
            ));
        }
    };

    let quote = state.pool_service.quote_deposit(pool_id, side).await?;

    Ok(Json(DepositQuoteResponse {
        pool_id,
        amount1: quote.amount1.to_string(),
        amount2: quote.amount2.to_string(),
        shares: quote.shares.to_string(),
    }))
}

/// `POST /pools/:id/liquidity/withdraw-quote`: Payout for burning shares.
///
/// # Errors
///
/// Returns [`GatewayError`] on malformed shares, a missing pool, or the
/// quote engine's rejection.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/liquidity/withdraw-quote",
    tag = "Liquidity",
    summary = "Quote a withdrawal",
    description = "Returns the token1 and token2 amounts the given shares would redeem right now.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
    ),
    request_body = WithdrawQuoteRequest,
    responses(
        (status = 200, description = "Withdrawal quote", body = WithdrawQuoteResponse),
        (status = 400, description = "Invalid amount", body = ErrorResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 422, description = "Exceeds outstanding shares", body = ErrorResponse),
    )
)]
pub async fn quote_withdraw(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<WithdrawQuoteRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let shares = parse_shares("shares", &req.shares)?;

    let (amount1, amount2) = state.pool_service.quote_withdraw(pool_id, shares).await?;

    Ok(Json(WithdrawQuoteResponse {
        pool_id,
        shares: shares.to_string(),
        amount1: amount1.to_string(),
        amount2: amount2.to_string(),
    }))
}

/// Liquidity routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pools/{id}/liquidity/add", post(add_liquidity))
        .route("/pools/{id}/liquidity/remove", post(remove_liquidity))
        .route("/pools/{id}/liquidity/quote", post(quote_deposit))
        .route("/pools/{id}/liquidity/withdraw-quote", post(quote_withdraw))
}
