//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.
//! Pool rule violations arrive wrapped from [`AmmError`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::amm::{AmmError, Amount};
use crate::domain::PoolId;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 4003,
///     "message": "insufficient shares: requested 51, available 50",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see [`GatewayError`] for ranges).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status               |
/// |-----------|-----------------|---------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request           |
/// | 2000–2999 | Not Found       | 404 Not Found             |
/// | 3000–3999 | Server          | 500 Internal Server Error |
/// | 4000–4999 | Pool rules      | 422 Unprocessable Entity  |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Pool with the given ID was not found.
    #[error("pool not found: {0}")]
    PoolNotFound(PoolId),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The pool ledger rejected the operation.
    #[error(transparent)]
    Amm(#[from] AmmError),

    /// The swap output fell below the caller's minimum.
    #[error("slippage exceeded: would receive {amount_out}, minimum {min_amount_out}")]
    SlippageExceeded {
        /// Output the pool would have paid.
        amount_out: Amount,
        /// Minimum the caller accepted.
        min_amount_out: Amount,
    },

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::Amm(AmmError::InvalidAmount) => 1002,
            Self::Amm(AmmError::Overflow) => 1003,
            Self::PoolNotFound(_) => 2001,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::Amm(AmmError::InconsistentState(_)) => 3002,
            Self::Amm(AmmError::EmptyPool) => 4001,
            Self::Amm(AmmError::RatioMismatch { .. }) => 4002,
            Self::Amm(AmmError::InsufficientShares { .. }) => 4003,
            Self::Amm(AmmError::InsufficientLiquidity) => 4004,
            Self::Amm(AmmError::InsufficientReserve) => 4005,
            Self::SlippageExceeded { .. } => 4006,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self.error_code() {
            1000..=1999 => StatusCode::BAD_REQUEST,
            2000..=2999 => StatusCode::NOT_FOUND,
            4000..=4999 => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let details = match &self {
            Self::Amm(AmmError::RatioMismatch { expected, .. }) => {
                Some(format!("expected_amount2={expected}"))
            }
            _ => None,
        };
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details,
            },
        };
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amm::Shares;

    #[test]
    fn pool_rule_errors_are_unprocessable() {
        let err = GatewayError::from(AmmError::InsufficientShares {
            requested: Shares::new(2),
            available: Shares::new(1),
        });
        assert_eq!(err.error_code(), 4003);
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn validation_errors_are_bad_request() {
        assert_eq!(
            GatewayError::from(AmmError::InvalidAmount).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::InvalidRequest("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn not_found_and_server_errors() {
        assert_eq!(
            GatewayError::PoolNotFound(PoolId::new()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GatewayError::from(AmmError::InconsistentState("x".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn amm_message_is_transparent() {
        let err = GatewayError::from(AmmError::EmptyPool);
        assert_eq!(err.to_string(), "pool has no liquidity");
    }

    #[test]
    fn response_carries_status() {
        let response = GatewayError::SlippageExceeded {
            amount_out: Amount::new(1),
            min_amount_out: Amount::new(2),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
