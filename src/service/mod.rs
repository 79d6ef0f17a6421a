//! Service layer: business logic orchestration.
//!
//! [`PoolService`] coordinates pool operations, delegates computation to
//! the [`crate::amm`] ledger, and emits events through the
//! [`crate::domain::EventBus`].

pub mod pool_service;

pub use pool_service::{DepositQuote, DepositSide, PoolService, PoolState, SwapQuote};
