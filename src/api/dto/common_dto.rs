//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::amm::{Amount, DECIMALS, Shares};
use crate::domain::TokenInfo;
use crate::error::GatewayError;

/// Token metadata as provided in pool creation requests.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenDto {
    /// Hex-encoded token address.
    pub address: String,
    /// Human-readable token symbol (e.g. `"DAPP"`).
    pub symbol: String,
    /// Number of decimal places. Only 18 is accepted.
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

impl TokenDto {
    /// Validates the decimals and converts into domain [`TokenInfo`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if `decimals` is not 18.
    pub fn into_token_info(self, field: &str) -> Result<TokenInfo, GatewayError> {
        if u32::from(self.decimals) != DECIMALS {
            return Err(GatewayError::InvalidRequest(format!(
                "{field}: unsupported decimals {}, pools use {DECIMALS}",
                self.decimals
            )));
        }
        Ok(TokenInfo {
            address: self.address,
            symbol: self.symbol,
        })
    }
}

impl From<&TokenInfo> for TokenDto {
    fn from(token: &TokenInfo) -> Self {
        Self {
            address: token.address.clone(),
            symbol: token.symbol.clone(),
            decimals: default_decimals(),
        }
    }
}

/// Pagination query parameters for list endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Only pools holding a token with this symbol (case-insensitive).
    #[serde(default)]
    pub symbol: Option<String>,
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items.
    pub total: u32,
    /// Total number of pages.
    pub total_pages: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

fn default_decimals() -> u8 {
    18
}

impl PaginationParams {
    /// Clamps `page` to at least 1 and `per_page` to `1..=100`.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, 100),
            symbol: self.symbol.clone(),
        }
    }
}

/// Parses a string-encoded raw token amount.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] naming `field` if the value is
/// not a non-negative integer that fits in `u128`.
pub fn parse_amount(field: &str, raw: &str) -> Result<Amount, GatewayError> {
    parse_u128(field, raw).map(Amount::new)
}

/// Parses a string-encoded raw share amount.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] naming `field` if the value is
/// not a non-negative integer that fits in `u128`.
pub fn parse_shares(field: &str, raw: &str) -> Result<Shares, GatewayError> {
    parse_u128(field, raw).map(Shares::new)
}

fn parse_u128(field: &str, raw: &str) -> Result<u128, GatewayError> {
    raw.trim()
        .parse()
        .map_err(|_| GatewayError::InvalidRequest(format!("invalid {field}: {raw:?}")))
}
