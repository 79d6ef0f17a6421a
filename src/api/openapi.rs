//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use crate::api::dto;
use crate::api::handlers::{liquidity, pool, swap, system};
use crate::error::{ErrorBody, ErrorResponse};

/// Generated OpenAPI specification, served at `/api-docs/openapi.json`
/// when the `swagger-ui` feature is enabled.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "cpamm-gateway",
        description = "Fee-less two-token constant-product AMM"
    ),
    paths(
        system::health_handler,
        system::amm_config_handler,
        pool::create_pool,
        pool::list_pools,
        pool::get_pool,
        pool::delete_pool,
        pool::get_shares,
        pool::list_events,
        liquidity::add_liquidity,
        liquidity::remove_liquidity,
        liquidity::quote_deposit,
        liquidity::quote_withdraw,
        swap::execute_swap,
        swap::quote_swap,
    ),
    components(schemas(
        ErrorResponse,
        ErrorBody,
        dto::TokenDto,
        dto::PaginationMeta,
        dto::CreatePoolRequest,
        dto::CreatePoolResponse,
        dto::PoolDetailResponse,
        dto::PoolSummaryDto,
        dto::PoolListResponse,
        dto::SharesResponse,
        dto::EventListResponse,
        dto::AddLiquidityRequest,
        dto::AddLiquidityResponse,
        dto::RemoveLiquidityRequest,
        dto::RemoveLiquidityResponse,
        dto::DepositQuoteRequest,
        dto::DepositQuoteResponse,
        dto::WithdrawQuoteRequest,
        dto::WithdrawQuoteResponse,
        dto::SwapRequest,
        dto::QuoteRequest,
        dto::SwapResponse,
        dto::QuoteResponse,
    )),
    tags(
        (name = "System", description = "Health and configuration"),
        (name = "Pools", description = "Pool lifecycle and queries"),
        (name = "Liquidity", description = "Deposits, withdrawals and their quotes"),
        (name = "Swaps", description = "Swaps and swap quotes"),
    )
)]
pub struct ApiDoc;
