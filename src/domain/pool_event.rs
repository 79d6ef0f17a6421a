//! Domain events reflecting pool state mutations.
//!
//! Every committed mutation emits a [`PoolEvent`] through the
//! [`super::EventBus`]. Events are broadcast to WebSocket subscribers and
//! optionally persisted to the PostgreSQL event log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PoolId;
use super::pool_entry::TokenInfo;
use crate::amm::{DepositEvent, LedgerEvent, SwapEvent, WithdrawEvent};

/// Domain event emitted after every state mutation.
///
/// Ledger records are flattened into the event body, so a swap serializes
/// as `{"event_type": "swap_executed", "pool_id": …, "holder": …, …}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum PoolEvent {
    /// Emitted when a new pool is created.
    PoolCreated {
        /// Pool identifier.
        pool_id: PoolId,
        /// Token held in `reserve1`.
        token1: TokenInfo,
        /// Token held in `reserve2`.
        token2: TokenInfo,
        /// Creation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a pool is removed.
    PoolRemoved {
        /// Pool identifier.
        pool_id: PoolId,
        /// Removal timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted after a successful deposit.
    LiquidityAdded {
        /// Pool identifier.
        pool_id: PoolId,
        /// Ledger record.
        #[serde(flatten)]
        record: DepositEvent,
    },

    /// Emitted after a successful withdrawal.
    LiquidityRemoved {
        /// Pool identifier.
        pool_id: PoolId,
        /// Ledger record.
        #[serde(flatten)]
        record: WithdrawEvent,
    },

    /// Emitted after a successful swap.
    SwapExecuted {
        /// Pool identifier.
        pool_id: PoolId,
        /// Ledger record.
        #[serde(flatten)]
        record: SwapEvent,
    },
}

impl PoolEvent {
    /// Wraps a ledger record for the given pool.
    #[must_use]
    pub fn from_ledger(pool_id: PoolId, event: LedgerEvent) -> Self {
        match event {
            LedgerEvent::Deposit(record) => Self::LiquidityAdded { pool_id, record },
            LedgerEvent::Withdraw(record) => Self::LiquidityRemoved { pool_id, record },
            LedgerEvent::Swap(record) => Self::SwapExecuted { pool_id, record },
        }
    }

    /// Unwraps the ledger record, if this event carries one.
    #[must_use]
    pub fn into_ledger(self) -> Option<LedgerEvent> {
        match self {
            Self::LiquidityAdded { record, .. } => Some(record.into()),
            Self::LiquidityRemoved { record, .. } => Some(record.into()),
            Self::SwapExecuted { record, .. } => Some(record.into()),
            Self::PoolCreated { .. } | Self::PoolRemoved { .. } => None,
        }
    }

    /// Returns the pool ID associated with this event.
    #[must_use]
    pub fn pool_id(&self) -> PoolId {
        match self {
            Self::PoolCreated { pool_id, .. }
            | Self::PoolRemoved { pool_id, .. }
            | Self::LiquidityAdded { pool_id, .. }
            | Self::LiquidityRemoved { pool_id, .. }
            | Self::SwapExecuted { pool_id, .. } => *pool_id,
        }
    }

    /// Returns the event timestamp.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::PoolCreated { timestamp, .. } | Self::PoolRemoved { timestamp, .. } => {
                *timestamp
            }
            Self::LiquidityAdded { record, .. } => record.timestamp,
            Self::LiquidityRemoved { record, .. } => record.timestamp,
            Self::SwapExecuted { record, .. } => record.timestamp,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::PoolCreated { .. } => "pool_created",
            Self::PoolRemoved { .. } => "pool_removed",
            Self::LiquidityAdded { .. } => "liquidity_added",
            Self::LiquidityRemoved { .. } => "liquidity_removed",
            Self::SwapExecuted { .. } => "swap_executed",
        }
    }
}
