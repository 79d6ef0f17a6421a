//! Liquidity operation DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::amm::{DepositEvent, WithdrawEvent};
use crate::domain::PoolId;

/// Request body for `POST /pools/:id/liquidity/add`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddLiquidityRequest {
    /// Account receiving the minted shares.
    pub holder: String,
    /// Token1 to deposit (string-encoded u128).
    pub amount1: String,
    /// Token2 to deposit (string-encoded u128).
    pub amount2: String,
}

/// Response body for `POST /pools/:id/liquidity/add`.
#[derive(Debug, Serialize, ToSchema)]
pub struct AddLiquidityResponse {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Account credited.
    pub holder: String,
    /// Token1 deposited (string-encoded).
    pub amount1: String,
    /// Token2 deposited (string-encoded).
    pub amount2: String,
    /// Shares minted (string-encoded).
    pub shares_minted: String,
    /// Token1 reserve after the deposit.
    pub reserve1: String,
    /// Token2 reserve after the deposit.
    pub reserve2: String,
    /// Execution timestamp.
    pub executed_at: DateTime<Utc>,
}

impl AddLiquidityResponse {
    /// Builds the response from a committed deposit record.
    #[must_use]
    pub fn from_record(pool_id: PoolId, record: DepositEvent) -> Self {
        Self {
            pool_id,
            holder: record.holder.to_string(),
            amount1: record.amount1.to_string(),
            amount2: record.amount2.to_string(),
            shares_minted: record.shares.to_string(),
            reserve1: record.reserve1_after.to_string(),
            reserve2: record.reserve2_after.to_string(),
            executed_at: record.timestamp,
        }
    }
}

/// Request body for `POST /pools/:id/liquidity/remove`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RemoveLiquidityRequest {
    /// Account burning shares.
    pub holder: String,
    /// Shares to burn (string-encoded u128).
    pub shares: String,
}

/// Response body for `POST /pools/:id/liquidity/remove`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RemoveLiquidityResponse {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Account debited.
    pub holder: String,
    /// Token1 paid out (string-encoded).
    pub amount1: String,
    /// Token2 paid out (string-encoded).
    pub amount2: String,
    /// Shares burned (string-encoded).
    pub shares_burned: String,
    /// Token1 reserve after the withdrawal.
    pub reserve1: String,
    /// Token2 reserve after the withdrawal.
    pub reserve2: String,
    /// Execution timestamp.
    pub executed_at: DateTime<Utc>,
}

impl RemoveLiquidityResponse {
    /// Builds the response from a committed withdrawal record.
    #[must_use]
    pub fn from_record(pool_id: PoolId, record: WithdrawEvent) -> Self {
        Self {
            pool_id,
            holder: record.holder.to_string(),
            amount1: record.amount1.to_string(),
            amount2: record.amount2.to_string(),
            shares_burned: record.shares.to_string(),
            reserve1: record.reserve1_after.to_string(),
            reserve2: record.reserve2_after.to_string(),
            executed_at: record.timestamp,
        }
    }
}

/// Request body for `POST /pools/:id/liquidity/quote`.
///
/// Exactly one of `amount1` / `amount2` must be set; the response fills in
/// the other side at the current reserve ratio.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DepositQuoteRequest {
    /// Token1 the caller wants to deposit.
    #[serde(default)]
    pub amount1: Option<String>,
    /// Token2 the caller wants to deposit.
    #[serde(default)]
    pub amount2: Option<String>,
}

/// Response body for `POST /pools/:id/liquidity/quote`.
#[derive(Debug, Serialize, ToSchema)]
pub struct DepositQuoteResponse {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Token1 to deposit.
    pub amount1: String,
    /// Token2 to deposit.
    pub amount2: String,
    /// Shares the deposit would mint.
    pub shares: String,
}

/// Request body for `POST /pools/:id/liquidity/withdraw-quote`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct WithdrawQuoteRequest {
    /// Shares to price (string-encoded u128).
    pub shares: String,
}

/// Response body for `POST /pools/:id/liquidity/withdraw-quote`.
#[derive(Debug, Serialize, ToSchema)]
pub struct WithdrawQuoteResponse {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Shares priced.
    pub shares: String,
    /// Token1 the shares would redeem.
    pub amount1: String,
    /// Token2 the shares would redeem.
    pub amount2: String,
}
