//! Pool handlers: create, list, get, delete, share balances and events.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;

use crate::amm::HolderId;
use crate::api::dto::{
    CreatePoolRequest, CreatePoolResponse, EventListResponse, EventQuery, MAX_POOL_NAME_LEN,
    PaginationMeta, PaginationParams, PoolDetailResponse, PoolListResponse, PoolSummaryDto,
    SharesResponse, TokenDto,
};
use crate::app_state::AppState;
use crate::domain::PoolId;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /pools`: Create a new, empty constant-product pool.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] on invalid token metadata or name.
#[utoipa::path(
    post,
    path = "/api/v1/pools",
    tag = "Pools",
    summary = "Create a pool",
    description = "Creates an empty two-token pool. The first deposit sets the price and mints the initial share supply.",
    request_body = CreatePoolRequest,
    responses(
        (status = 201, description = "Pool created successfully", body = CreatePoolResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    )
)]
pub async fn create_pool(
    State(state): State<AppState>,
    Json(req): Json<CreatePoolRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    if req
        .name
        .as_ref()
        .is_some_and(|n| n.chars().count() > MAX_POOL_NAME_LEN)
    {
        return Err(GatewayError::InvalidRequest(format!(
            "name must be at most {MAX_POOL_NAME_LEN} characters"
        )));
    }
    let token1 = req.token1.into_token_info("token1")?;
    let token2 = req.token2.into_token_info("token2")?;

    let pool_id = state
        .pool_service
        .create_pool(token1.clone(), token2.clone(), req.name.clone())
        .await?;

    let response = CreatePoolResponse {
        pool_id,
        name: req.name,
        token1: TokenDto::from(&token1),
        token2: TokenDto::from(&token2),
        created_at: Utc::now(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /pools`: List pools with pagination and optional symbol filter.
///
/// # Errors
///
/// Returns [`GatewayError`] on internal failures.
#[utoipa::path(
    get,
    path = "/api/v1/pools",
    tag = "Pools",
    summary = "List pools",
    description = "Returns a paginated list of pools ordered by creation time, optionally filtered by token symbol.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated pool list", body = PoolListResponse),
    )
)]
pub async fn list_pools(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let params = params.clamped();
    let summaries = state
        .pool_service
        .list_pools(params.symbol.as_deref())
        .await;

    let total = u32::try_from(summaries.len()).unwrap_or(u32::MAX);
    let per_page = params.per_page;
    let page = params.page;
    let total_pages = total.div_ceil(per_page);

    let start = usize::try_from(u64::from(page - 1) * u64::from(per_page)).unwrap_or(usize::MAX);
    let data: Vec<PoolSummaryDto> = summaries
        .into_iter()
        .skip(start)
        .take(per_page as usize)
        .map(PoolSummaryDto::from)
        .collect();

    Ok(Json(PoolListResponse {
        data,
        pagination: PaginationMeta {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

/// `GET /pools/:id`: Get pool details.
///
/// # Errors
///
/// Returns [`GatewayError::PoolNotFound`] if the pool does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/pools/{id}",
    tag = "Pools",
    summary = "Get pool details",
    description = "Returns reserves, invariant, share supply, spot price and metadata for a single pool.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
    ),
    responses(
        (status = 200, description = "Pool details", body = PoolDetailResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
    )
)]
pub async fn get_pool(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_state = state
        .pool_service
        .pool_state(PoolId::from_uuid(id))
        .await?;
    Ok(Json(PoolDetailResponse::from(pool_state)))
}

/// `DELETE /pools/:id`: Remove a pool.
///
/// # Errors
///
/// Returns [`GatewayError::PoolNotFound`] if the pool does not exist.
#[utoipa::path(
    delete,
    path = "/api/v1/pools/{id}",
    tag = "Pools",
    summary = "Delete a pool",
    description = "Removes a pool and emits a PoolRemoved event.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
    ),
    responses(
        (status = 204, description = "Pool deleted"),
        (status = 404, description = "Pool not found", body = ErrorResponse),
    )
)]
pub async fn delete_pool(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    state
        .pool_service
        .remove_pool(PoolId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /pools/:id/shares/:holder`: Share balance of one holder.
///
/// # Errors
///
/// Returns [`GatewayError::PoolNotFound`] if the pool does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/pools/{id}/shares/{holder}",
    tag = "Pools",
    summary = "Get holder shares",
    description = "Returns the holder's share balance (0 for unknown holders) and the total supply.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
        ("holder" = String, Path, description = "Holder identifier"),
    ),
    responses(
        (status = 200, description = "Share balance", body = SharesResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
    )
)]
pub async fn get_shares(
    State(state): State<AppState>,
    Path((id, holder)): Path<(uuid::Uuid, String)>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let holder = HolderId::new(holder);
    let (shares, total_shares) = state.pool_service.shares_of(pool_id, &holder).await?;
    Ok(Json(SharesResponse {
        pool_id,
        holder: holder.to_string(),
        shares: shares.to_string(),
        total_shares: total_shares.to_string(),
    }))
}

/// `GET /pools/:id/events`: Event log in chronological order.
///
/// # Errors
///
/// Returns [`GatewayError::PoolNotFound`] if the pool does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/pools/{id}/events",
    tag = "Pools",
    summary = "List pool events",
    description = "Returns deposit, withdraw and swap records sorted by timestamp, optionally only those after `since`.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
        EventQuery,
    ),
    responses(
        (status = 200, description = "Event log", body = EventListResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Query(query): Query<EventQuery>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let events = state.pool_service.events(pool_id, query.since).await?;
    Ok(Json(EventListResponse { pool_id, events }))
}

/// Pool management routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pools", get(list_pools).post(create_pool))
        .route("/pools/{id}", get(get_pool).delete(delete_pool))
        .route("/pools/{id}/shares/{holder}", get(get_shares))
        .route("/pools/{id}/events", get(list_events))
}
