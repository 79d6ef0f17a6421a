//! Concurrent pool storage with per-pool locking.
//!
//! [`PoolRegistry`] stores all active pools in a `HashMap` where each
//! entry is individually protected by a [`tokio::sync::RwLock`]. Each
//! pool's write lock is the single mutual-exclusion boundary around its
//! reserves, shares and event log: a mutation snapshots, computes and
//! commits while holding it, and quotes read under the shared lock.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::PoolId;
use super::pool_entry::{PoolEntry, PoolSummary};
use crate::error::GatewayError;

/// Shared handle to one pool's lock.
pub type PoolHandle = Arc<RwLock<PoolEntry>>;

/// Central store for all active pools.
///
/// # Concurrency
///
/// - Multiple readers may quote against the same pool concurrently.
/// - Writes to different pools are concurrent.
/// - Writes to the same pool are serialized.
#[derive(Debug, Default)]
pub struct PoolRegistry {
    pools: RwLock<HashMap<PoolId, PoolHandle>>,
}

impl PoolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new pool entry into the registry.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if a pool with the same
    /// ID already exists.
    pub async fn insert(&self, entry: PoolEntry) -> Result<PoolId, GatewayError> {
        let pool_id = entry.pool_id;
        let mut map = self.pools.write().await;
        if map.contains_key(&pool_id) {
            return Err(GatewayError::InvalidRequest(format!(
                "pool {pool_id} already exists"
            )));
        }
        map.insert(pool_id, Arc::new(RwLock::new(entry)));
        Ok(pool_id)
    }

    /// Returns the per-pool lock for `pool_id`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PoolNotFound`] if no pool with the given ID
    /// exists.
    pub async fn get(&self, pool_id: PoolId) -> Result<PoolHandle, GatewayError> {
        let map = self.pools.read().await;
        map.get(&pool_id)
            .cloned()
            .ok_or(GatewayError::PoolNotFound(pool_id))
    }

    /// Removes a pool from the registry.
    ///
    /// Waits for in-flight operations on the pool to release its lock, so
    /// no mutation is cut off half-way.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PoolNotFound`] if no pool with the given ID
    /// exists.
    pub async fn remove(&self, pool_id: PoolId) -> Result<(), GatewayError> {
        let handle = self
            .pools
            .write()
            .await
            .remove(&pool_id)
            .ok_or(GatewayError::PoolNotFound(pool_id))?;
        drop(handle.write().await);
        Ok(())
    }

    /// Returns every pool handle, in no particular order.
    pub async fn handles(&self) -> Vec<(PoolId, PoolHandle)> {
        let map = self.pools.read().await;
        map.iter()
            .map(|(id, handle)| (*id, Arc::clone(handle)))
            .collect()
    }

    /// Returns summaries of all pools sorted by creation time, optionally
    /// filtered to pools holding a token with the given symbol.
    pub async fn list(&self, symbol_filter: Option<&str>) -> Vec<PoolSummary> {
        let mut summaries = Vec::new();
        for (_, handle) in self.handles().await {
            let entry = handle.read().await;
            if let Some(symbol) = symbol_filter
                && !entry.token1.symbol.eq_ignore_ascii_case(symbol)
                && !entry.token2.symbol.eq_ignore_ascii_case(symbol)
            {
                continue;
            }
            summaries.push(PoolSummary::from(&*entry));
        }
        summaries.sort_by_key(|s| (s.created_at, s.pool_id));
        summaries
    }

    /// Returns the number of pools in the registry.
    pub async fn len(&self) -> usize {
        self.pools.read().await.len()
    }

    /// Returns `true` if the registry contains no pools.
    pub async fn is_empty(&self) -> bool {
        self.pools.read().await.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::TokenInfo;

    fn token(symbol: &str) -> TokenInfo {
        TokenInfo {
            address: format!("0x{}", symbol.to_lowercase()),
            symbol: symbol.to_string(),
        }
    }

    fn make_entry(symbol1: &str, symbol2: &str) -> PoolEntry {
        PoolEntry::new(PoolId::new(), token(symbol1), token(symbol2), None)
    }

    #[tokio::test]
    async fn insert_and_get() {
        let registry = PoolRegistry::new();
        let entry = make_entry("DAPP", "USD");
        let id = entry.pool_id;

        let Ok(inserted) = registry.insert(entry).await else {
            panic!("insert failed");
        };
        assert_eq!(inserted, id);
        assert!(registry.get(id).await.is_ok());
    }

    #[tokio::test]
    async fn duplicate_insert_rejected() {
        let registry = PoolRegistry::new();
        let id = PoolId::new();
        let _ = registry
            .insert(PoolEntry::new(id, token("A"), token("B"), None))
            .await;
        let again = registry
            .insert(PoolEntry::new(id, token("A"), token("B"), None))
            .await;
        assert!(matches!(again, Err(GatewayError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn get_nonexistent_returns_error() {
        let registry = PoolRegistry::new();
        let result = registry.get(PoolId::new()).await;
        assert!(matches!(result, Err(GatewayError::PoolNotFound(_))));
    }

    #[tokio::test]
    async fn remove_then_get_fails() {
        let registry = PoolRegistry::new();
        let entry = make_entry("DAPP", "USD");
        let id = entry.pool_id;
        let _ = registry.insert(entry).await;

        assert!(registry.remove(id).await.is_ok());
        assert!(registry.get(id).await.is_err());
        assert!(registry.remove(id).await.is_err());
    }

    #[tokio::test]
    async fn list_filters_by_symbol() {
        let registry = PoolRegistry::new();
        let _ = registry.insert(make_entry("DAPP", "USD")).await;
        let _ = registry.insert(make_entry("ETH", "USD")).await;

        assert_eq!(registry.list(None).await.len(), 2);
        assert_eq!(registry.list(Some("usd")).await.len(), 2);
        assert_eq!(registry.list(Some("DAPP")).await.len(), 1);
        assert!(registry.list(Some("BTC")).await.is_empty());
    }

    #[tokio::test]
    async fn len_and_is_empty() {
        let registry = PoolRegistry::new();
        assert!(registry.is_empty().await);
        let _ = registry.insert(make_entry("A", "B")).await;
        assert!(!registry.is_empty().await);
        assert_eq!(registry.len().await, 1);
        assert_eq!(registry.handles().await.len(), 1);
    }
}
