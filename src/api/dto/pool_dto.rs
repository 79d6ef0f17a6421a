//! Pool-related DTOs for create, get, list, shares and event queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::{PaginationMeta, TokenDto};
use crate::amm::LedgerEvent;
use crate::domain::PoolId;
use crate::domain::pool_entry::PoolSummary;
use crate::service::PoolState;

/// Maximum accepted length of a pool name.
pub const MAX_POOL_NAME_LEN: usize = 100;

/// Request body for `POST /pools`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePoolRequest {
    /// Token held in `reserve1`.
    pub token1: TokenDto,
    /// Token held in `reserve2`.
    pub token2: TokenDto,
    /// Optional human-readable name (max 100 chars).
    #[serde(default)]
    pub name: Option<String>,
}

/// Response body for `POST /pools` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatePoolResponse {
    /// Unique pool identifier.
    pub pool_id: PoolId,
    /// Pool name echoed from request.
    pub name: Option<String>,
    /// Token held in `reserve1`.
    pub token1: TokenDto,
    /// Token held in `reserve2`.
    pub token2: TokenDto,
    /// Server creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Single pool detail for `GET /pools/:id`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PoolDetailResponse {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Pool name.
    pub name: Option<String>,
    /// Token held in `reserve1`.
    pub token1: TokenDto,
    /// Token held in `reserve2`.
    pub token2: TokenDto,
    /// Token1 reserve (string-encoded).
    pub reserve1: String,
    /// Token2 reserve (string-encoded).
    pub reserve2: String,
    /// `reserve1 * reserve2` (string-encoded).
    pub invariant: String,
    /// Shares outstanding (string-encoded).
    pub total_shares: String,
    /// Token1 price in token2, 18 decimals; absent while the pool is empty.
    pub spot_price: Option<String>,
    /// Holders with a non-zero share balance.
    pub holder_count: usize,
    /// Number of swaps executed.
    pub swap_count: u64,
    /// Number of ledger events recorded.
    pub event_count: usize,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<PoolState> for PoolDetailResponse {
    fn from(state: PoolState) -> Self {
        Self {
            pool_id: state.pool_id,
            name: state.name,
            token1: TokenDto::from(&state.token1),
            token2: TokenDto::from(&state.token2),
            reserve1: state.reserve1.to_string(),
            reserve2: state.reserve2.to_string(),
            invariant: state.invariant,
            total_shares: state.total_shares.to_string(),
            spot_price: state.spot_price.map(|p| p.to_string()),
            holder_count: state.holder_count,
            swap_count: state.swap_count,
            event_count: state.event_count,
            created_at: state.created_at,
            updated_at: state.last_modified_at,
        }
    }
}

/// Pool summary for list responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct PoolSummaryDto {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Pool name.
    pub name: Option<String>,
    /// Token1 symbol.
    pub token1_symbol: String,
    /// Token2 symbol.
    pub token2_symbol: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Number of swaps.
    pub swap_count: u64,
}

impl From<PoolSummary> for PoolSummaryDto {
    fn from(s: PoolSummary) -> Self {
        Self {
            pool_id: s.pool_id,
            name: s.name,
            token1_symbol: s.token1_symbol,
            token2_symbol: s.token2_symbol,
            created_at: s.created_at,
            swap_count: s.swap_count,
        }
    }
}

/// Paginated list response for `GET /pools`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PoolListResponse {
    /// Pool summaries.
    pub data: Vec<PoolSummaryDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Response body for `GET /pools/:id/shares/:holder`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SharesResponse {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Holder queried.
    pub holder: String,
    /// Holder balance (string-encoded, 0 for unknown holders).
    pub shares: String,
    /// Shares outstanding (string-encoded).
    pub total_shares: String,
}

/// Query parameters for `GET /pools/:id/events`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventQuery {
    /// Only events strictly after this instant (RFC 3339).
    #[serde(default)]
    pub since: Option<DateTime<Utc>>,
}

/// Response body for `GET /pools/:id/events`.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventListResponse {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Deposit, withdraw and swap records in chronological order.
    #[schema(value_type = Vec<Object>)]
    pub events: Vec<LedgerEvent>,
}
