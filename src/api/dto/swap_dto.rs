//! Swap and quote DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::PoolId;

/// Request body for `POST /pools/:id/swap`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SwapRequest {
    /// Account performing the swap.
    pub holder: String,
    /// Token sold: `"token1"`, `"token2"`, or the token's address or symbol.
    pub token_in: String,
    /// Exact input amount (string-encoded u128).
    pub amount_in: String,
    /// Minimum output for slippage protection (string-encoded u128).
    #[serde(default)]
    pub min_amount_out: Option<String>,
}

/// Request body for `POST /pools/:id/quote`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct QuoteRequest {
    /// Token sold: `"token1"`, `"token2"`, or the token's address or symbol.
    pub token_in: String,
    /// Exact input amount (string-encoded u128).
    pub amount_in: String,
}

/// Response body for `POST /pools/:id/swap`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SwapResponse {
    /// Pool where the swap occurred.
    pub pool_id: PoolId,
    /// Account that swapped.
    pub holder: String,
    /// Input token address.
    pub token_in: String,
    /// Output token address.
    pub token_out: String,
    /// Input amount (string-encoded).
    pub amount_in: String,
    /// Output amount (string-encoded).
    pub amount_out: String,
    /// Token1 reserve after the swap.
    pub reserve1: String,
    /// Token2 reserve after the swap.
    pub reserve2: String,
    /// Execution timestamp.
    pub executed_at: DateTime<Utc>,
}

/// Response body for `POST /pools/:id/quote`.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuoteResponse {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Input token address.
    pub token_in: String,
    /// Output token address.
    pub token_out: String,
    /// Input amount (string-encoded).
    pub amount_in: String,
    /// Quoted output amount (string-encoded).
    pub amount_out: String,
    /// `amount_out / amount_in`, 18 decimals.
    pub execution_price: String,
    /// Token1 price before the swap, 18 decimals.
    pub spot_price_before: Option<String>,
    /// Token1 price after the swap, 18 decimals.
    pub spot_price_after: Option<String>,
    /// Signed token1 price change in basis points.
    pub price_impact_bps: i64,
    /// Quote timestamp.
    pub quoted_at: DateTime<Utc>,
}
