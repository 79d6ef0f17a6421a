//! Pool ledger error taxonomy.
//!
//! Every variant is a local, synchronous rejection: the operation that
//! returned it left reserves, shares and the event log untouched.

use super::{Amount, Shares};

/// Errors produced by the quote engine and the pool ledger.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmmError {
    /// A caller-supplied quantity was zero.
    #[error("amount must be greater than zero")]
    InvalidAmount,

    /// A quote or swap was requested against a pool with zero reserves.
    #[error("pool has no liquidity")]
    EmptyPool,

    /// Deposit amounts do not match the current reserve ratio.
    #[error("deposit ratio mismatch: expected {expected} of token2, got {provided}")]
    RatioMismatch {
        /// Token2 amount implied by the token1 amount at the current ratio.
        expected: Amount,
        /// Token2 amount the caller supplied.
        provided: Amount,
    },

    /// A withdrawal asked for more shares than the holder owns.
    #[error("insufficient shares: requested {requested}, available {available}")]
    InsufficientShares {
        /// Shares the caller tried to burn.
        requested: Shares,
        /// Shares the holder actually owns.
        available: Shares,
    },

    /// A swap would drain the output reserve or yield nothing.
    #[error("insufficient liquidity for swap")]
    InsufficientLiquidity,

    /// Computed withdrawal amounts exceed the reserves.
    #[error("withdrawal exceeds pool reserves")]
    InsufficientReserve,

    /// An intermediate quantity does not fit in `u128`.
    #[error("arithmetic overflow")]
    Overflow,

    /// Restored ledger state violates a ledger invariant.
    #[error("inconsistent ledger state: {0}")]
    InconsistentState(String),
}
