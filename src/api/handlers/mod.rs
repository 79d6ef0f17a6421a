//! REST endpoint handlers organized by resource.

pub mod liquidity;
pub mod pool;
pub mod swap;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Pool, liquidity and swap routes, nested under `/api/v1` by the caller.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(pool::routes())
        .merge(liquidity::routes())
        .merge(swap::routes())
}
