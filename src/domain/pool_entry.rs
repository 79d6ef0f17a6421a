//! Pool entry combining a [`PoolLedger`] with server-side metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PoolId;
use crate::amm::PoolLedger;

/// Identity of one of the pool's two tokens.
///
/// The gateway does not custody tokens; this is display metadata for the
/// external token ledger that does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Token contract address or other external identifier.
    pub address: String,
    /// Ticker symbol (e.g. `"DAPP"`).
    pub symbol: String,
}

/// Aggregate wrapping a [`PoolLedger`] with gateway metadata.
///
/// Each pool in the registry is stored as a `PoolEntry`. The `ledger`
/// field holds the live pool state while the remaining fields track
/// operational metadata.
#[derive(Debug)]
pub struct PoolEntry {
    /// Unique pool identifier (immutable after creation).
    pub pool_id: PoolId,

    /// Reserves, shares and event log. Updated on swap / liquidity operations.
    pub ledger: PoolLedger,

    /// Token held in `reserve1`.
    pub token1: TokenInfo,

    /// Token held in `reserve2`.
    pub token2: TokenInfo,

    /// Optional human-readable name.
    pub name: Option<String>,

    /// Creation timestamp (immutable after creation).
    pub created_at: DateTime<Utc>,

    /// Timestamp of last state mutation.
    pub last_modified_at: DateTime<Utc>,

    /// Number of swaps executed on this pool.
    pub swap_count: u64,
}

impl PoolEntry {
    /// Creates a new `PoolEntry` around an empty ledger.
    #[must_use]
    pub fn new(pool_id: PoolId, token1: TokenInfo, token2: TokenInfo, name: Option<String>) -> Self {
        Self::with_ledger(pool_id, PoolLedger::new(), token1, token2, name)
    }

    /// Creates a `PoolEntry` around an existing ledger (e.g. restored from
    /// a snapshot).
    #[must_use]
    pub fn with_ledger(
        pool_id: PoolId,
        ledger: PoolLedger,
        token1: TokenInfo,
        token2: TokenInfo,
        name: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            pool_id,
            ledger,
            token1,
            token2,
            name,
            created_at: now,
            last_modified_at: now,
            swap_count: 0,
        }
    }

    /// Metadata worth persisting next to a ledger snapshot.
    #[must_use]
    pub fn metadata(&self) -> PoolMetadata {
        PoolMetadata {
            token1: self.token1.clone(),
            token2: self.token2.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
            swap_count: self.swap_count,
        }
    }
}

/// Persistable pool metadata (everything except the ledger).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolMetadata {
    /// Token held in `reserve1`.
    pub token1: TokenInfo,
    /// Token held in `reserve2`.
    pub token2: TokenInfo,
    /// Optional pool name.
    pub name: Option<String>,
    /// Original creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Swaps executed so far.
    pub swap_count: u64,
}

/// Lightweight summary of a pool for list endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct PoolSummary {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Optional pool name.
    pub name: Option<String>,
    /// Token1 symbol.
    pub token1_symbol: String,
    /// Token2 symbol.
    pub token2_symbol: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Number of swaps executed.
    pub swap_count: u64,
}

impl From<&PoolEntry> for PoolSummary {
    fn from(entry: &PoolEntry) -> Self {
        Self {
            pool_id: entry.pool_id,
            name: entry.name.clone(),
            token1_symbol: entry.token1.symbol.clone(),
            token2_symbol: entry.token2.symbol.clone(),
            created_at: entry.created_at,
            swap_count: entry.swap_count,
        }
    }
}
