//! Swap and quote endpoint handlers.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;

use crate::amm::{HolderId, TokenSide};
use crate::api::dto::{QuoteRequest, QuoteResponse, SwapRequest, SwapResponse, parse_amount};
use crate::app_state::AppState;
use crate::domain::PoolId;
use crate::domain::pool_entry::TokenInfo;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /pools/:id/swap`: Execute an exact-in swap.
///
/// # Errors
///
/// Returns [`GatewayError`] on invalid parameters, a missing pool, an empty
/// pool, or when the output falls below `min_amount_out`.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/swap",
    tag = "Swaps",
    summary = "Execute a swap",
    description = "Sells `amount_in` of one token for the other along x * y = k. No fee is charged.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
    ),
    request_body = SwapRequest,
    responses(
        (status = 200, description = "Swap executed", body = SwapResponse),
        (status = 400, description = "Invalid swap parameters", body = ErrorResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 422, description = "Empty pool or slippage exceeded", body = ErrorResponse),
    )
)]
pub async fn execute_swap(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<SwapRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let amount_in = parse_amount("amount_in", &req.amount_in)?;
    let min_amount_out = req
        .min_amount_out
        .as_deref()
        .map(|raw| parse_amount("min_amount_out", raw))
        .transpose()?;
    let (token_in, token_out) = resolve_tokens(&state, pool_id, &req.token_in).await?;

    let record = state
        .pool_service
        .swap(
            pool_id,
            &HolderId::new(req.holder),
            token_in.0,
            amount_in,
            min_amount_out,
        )
        .await?;

    Ok(Json(SwapResponse {
        pool_id,
        holder: record.holder.to_string(),
        token_in: token_in.1.address,
        token_out: token_out.address,
        amount_in: record.amount_given.to_string(),
        amount_out: record.amount_received.to_string(),
        reserve1: record.reserve1_after.to_string(),
        reserve2: record.reserve2_after.to_string(),
        executed_at: record.timestamp,
    }))
}

/// `POST /pools/:id/quote`: Get a swap quote (read-only).
///
/// # Errors
///
/// Returns [`GatewayError`] on invalid parameters, a missing pool, or an
/// empty pool.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/quote",
    tag = "Swaps",
    summary = "Get swap quote",
    description = "Returns the output a swap would produce right now. The pool state is not modified.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
    ),
    request_body = QuoteRequest,
    responses(
        (status = 200, description = "Quote computed", body = QuoteResponse),
        (status = 400, description = "Invalid swap parameters", body = ErrorResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 422, description = "Empty pool", body = ErrorResponse),
    )
)]
pub async fn quote_swap(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<QuoteRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let amount_in = parse_amount("amount_in", &req.amount_in)?;
    let (token_in, token_out) = resolve_tokens(&state, pool_id, &req.token_in).await?;

    let quote = state
        .pool_service
        .quote_swap(pool_id, token_in.0, amount_in)
        .await?;

    Ok(Json(QuoteResponse {
        pool_id,
        token_in: token_in.1.address,
        token_out: token_out.address,
        amount_in: quote.amount_in.to_string(),
        amount_out: quote.amount_out.to_string(),
        execution_price: quote.execution_price.to_string(),
        spot_price_before: quote.spot_price_before.map(|p| p.to_string()),
        spot_price_after: quote.spot_price_after.map(|p| p.to_string()),
        price_impact_bps: quote.price_impact_bps,
        quoted_at: Utc::now(),
    }))
}

/// Swap routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pools/{id}/swap", post(execute_swap))
        .route("/pools/{id}/quote", post(quote_swap))
}

/// Resolves `token_in` to a pool side plus both tokens' metadata.
async fn resolve_tokens(
    state: &AppState,
    pool_id: PoolId,
    token_in: &str,
) -> Result<((TokenSide, TokenInfo), TokenInfo), GatewayError> {
    let pool = state.pool_service.pool_state(pool_id).await?;
    let side = resolve_side(&pool.token1, &pool.token2, token_in)?;
    Ok(match side {
        TokenSide::Token1 => ((side, pool.token1), pool.token2),
        TokenSide::Token2 => ((side, pool.token2), pool.token1),
    })
}

/// Matches a side name, token address or token symbol (case-insensitive).
///
/// A value that matches both sides is rejected rather than guessed.
fn resolve_side(
    token1: &TokenInfo,
    token2: &TokenInfo,
    token_in: &str,
) -> Result<TokenSide, GatewayError> {
    let matches = |side: TokenSide, token: &TokenInfo| {
        token_in.eq_ignore_ascii_case(side.as_str())
            || token_in.eq_ignore_ascii_case(&token.address)
            || token_in.eq_ignore_ascii_case(&token.symbol)
    };
    match (
        matches(TokenSide::Token1, token1),
        matches(TokenSide::Token2, token2),
    ) {
        (true, false) => Ok(TokenSide::Token1),
        (false, true) => Ok(TokenSide::Token2),
        (true, true) => Err(GatewayError::InvalidRequest(format!(
            "token_in {token_in} matches both pool tokens"
        ))),
        (false, false) => Err(GatewayError::InvalidRequest(format!(
            "token_in {token_in} not found in pool"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(address: &str, symbol: &str) -> TokenInfo {
        TokenInfo {
            address: address.to_string(),
            symbol: symbol.to_string(),
        }
    }

    #[test]
    fn side_resolution() {
        let t1 = token("0xaaa", "DAPP");
        let t2 = token("0xbbb", "USD");
        assert!(matches!(resolve_side(&t1, &t2, "token1"), Ok(TokenSide::Token1)));
        assert!(matches!(resolve_side(&t1, &t2, "0xBBB"), Ok(TokenSide::Token2)));
        assert!(matches!(resolve_side(&t1, &t2, "usd"), Ok(TokenSide::Token2)));
        assert!(matches!(
            resolve_side(&t1, &t2, "ETH"),
            Err(GatewayError::InvalidRequest(_))
        ));
    }

    #[test]
    fn shared_symbol_is_ambiguous() {
        let t1 = token("0xaaa", "USDC");
        let t2 = token("0xbbb", "usdc");
        assert!(matches!(
            resolve_side(&t1, &t2, "USDC"),
            Err(GatewayError::InvalidRequest(_))
        ));
        assert!(matches!(resolve_side(&t1, &t2, "0xbbb"), Ok(TokenSide::Token2)));
    }

    #[test]
    fn symbol_shadowing_side_name_is_ambiguous() {
        let t1 = token("0xaaa", "token2");
        let t2 = token("0xbbb", "USD");
        assert!(matches!(
            resolve_side(&t1, &t2, "token2"),
            Err(GatewayError::InvalidRequest(_))
        ));
    }
}
