//! Data Transfer Objects for REST request/response serialization.
//!
//! All token and share quantities travel as JSON strings holding the raw
//! 18-decimal integer, so `u128` values survive JSON number precision.

pub mod common_dto;
pub mod liquidity_dto;
pub mod pool_dto;
pub mod swap_dto;

pub use common_dto::*;
pub use liquidity_dto::*;
pub use pool_dto::*;
pub use swap_dto::*;
