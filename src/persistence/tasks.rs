//! Background tasks that connect persistence to the running service.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::models::StoredEvent;
use super::postgres::PostgresPersistence;
use crate::amm::{LedgerEvent, LedgerSnapshot};
use crate::domain::{PoolEvent, PoolId, PoolMetadata};
use crate::error::GatewayError;
use crate::service::PoolService;

/// Snapshot writes performed by the periodic snapshot pass.
pub trait SnapshotStore: Send + Sync {
    /// Persists one ledger snapshot.
    fn store_snapshot(
        &self,
        pool_id: PoolId,
        ledger: &LedgerSnapshot,
        metadata: &PoolMetadata,
    ) -> impl Future<Output = Result<i64, GatewayError>> + Send;

    /// Deletes every stored snapshot of a pool.
    fn purge_pool(&self, pool_id: PoolId) -> impl Future<Output = Result<u64, GatewayError>> + Send;
}

impl SnapshotStore for PostgresPersistence {
    fn store_snapshot(
        &self,
        pool_id: PoolId,
        ledger: &LedgerSnapshot,
        metadata: &PoolMetadata,
    ) -> impl Future<Output = Result<i64, GatewayError>> + Send {
        self.save_snapshot(pool_id, ledger, metadata)
    }

    fn purge_pool(&self, pool_id: PoolId) -> impl Future<Output = Result<u64, GatewayError>> + Send {
        self.delete_pool_snapshots(pool_id)
    }
}

/// Rebuilds every pool from its latest snapshot and stored events.
///
/// Rows that fail to decode or restore are logged and skipped, so one
/// corrupt snapshot does not keep the gateway down. A pool whose event
/// history cannot be loaded or does not line up with its snapshot is
/// restored from the snapshot alone.
///
/// # Errors
///
/// Returns [`GatewayError::PersistenceError`] if the snapshots cannot be
/// loaded at all.
pub async fn restore_pools(
    persistence: &PostgresPersistence,
    service: &PoolService,
) -> Result<usize, GatewayError> {
    let rows = persistence.load_latest_snapshots().await?;
    let mut restored = 0usize;
    for row in rows {
        let (pool_id, ledger, metadata) = match row.decode() {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::error!(snapshot_id = row.id, pool_id = %row.pool_id, error = %e, "skipping snapshot");
                continue;
            }
        };
        let history = match persistence.load_events(pool_id).await {
            Ok(stored) => ledger_history(&stored),
            Err(e) => Err(e),
        }
        .unwrap_or_else(|e| {
            tracing::warn!(%pool_id, error = %e, "event history unavailable");
            Vec::new()
        });

        let result = match service
            .restore_pool(pool_id, ledger.clone(), metadata.clone(), history)
            .await
        {
            Err(GatewayError::Amm(e)) => {
                tracing::warn!(%pool_id, error = %e, "event history rejected, restoring snapshot only");
                service.restore_pool(pool_id, ledger, metadata, Vec::new()).await
            }
            other => other,
        };
        match result {
            Ok(()) => restored = restored.saturating_add(1),
            Err(e) => {
                tracing::error!(snapshot_id = row.id, %pool_id, error = %e, "skipping snapshot");
            }
        }
    }
    tracing::info!(restored, "pools restored from snapshots");
    Ok(restored)
}

/// Ledger records carried by a pool's stored events, in append order.
///
/// # Errors
///
/// Returns [`GatewayError::PersistenceError`] if a payload does not decode.
pub fn ledger_history(stored: &[StoredEvent]) -> Result<Vec<LedgerEvent>, GatewayError> {
    let mut history = Vec::with_capacity(stored.len());
    for row in stored {
        if let Some(record) = row.decode()?.into_ledger() {
            history.push(record);
        }
    }
    Ok(history)
}

/// Writes every bus event to the `events` table until the bus closes.
///
/// A `PoolRemoved` event also deletes the pool's snapshots.
pub fn spawn_event_writer(
    persistence: PostgresPersistence,
    mut rx: broadcast::Receiver<PoolEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Err(e) = persistence.save_event(&event).await {
                        tracing::warn!(pool_id = %event.pool_id(), error = %e, "event write failed");
                    }
                    if let PoolEvent::PoolRemoved { pool_id, .. } = event
                        && let Err(e) = persistence.delete_pool_snapshots(pool_id).await
                    {
                        tracing::warn!(%pool_id, error = %e, "snapshot cleanup failed");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "event writer lagged, events dropped from log");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        tracing::debug!("event writer stopped");
    })
}

/// Saves one snapshot per registered pool and returns how many were kept.
///
/// A pool removed while its row was being written is purged again after
/// the write, since its `PoolRemoved` cleanup may already have run.
pub async fn snapshot_pools<S: SnapshotStore>(store: &S, service: &PoolService) -> usize {
    let mut saved = 0usize;
    for (pool_id, ledger, metadata) in service.snapshots().await {
        if let Err(e) = store.store_snapshot(pool_id, &ledger, &metadata).await {
            tracing::warn!(%pool_id, error = %e, "snapshot failed");
            continue;
        }
        if service.registry().get(pool_id).await.is_err() {
            if let Err(e) = store.purge_pool(pool_id).await {
                tracing::warn!(%pool_id, error = %e, "stale snapshot cleanup failed");
            }
            continue;
        }
        saved = saved.saturating_add(1);
    }
    saved
}

/// Snapshots every pool each `interval`.
pub fn spawn_snapshot_task(
    persistence: PostgresPersistence,
    service: Arc<PoolService>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval.max(Duration::from_secs(1)));
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let saved = snapshot_pools(&persistence, &service).await;
            tracing::debug!(saved, "periodic snapshot complete");
        }
    })
}

/// Deletes snapshots older than `after_days` once an hour.
pub fn spawn_cleanup_task(persistence: PostgresPersistence, after_days: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(3600));
        loop {
            ticker.tick().await;
            match persistence.delete_old_snapshots(after_days).await {
                Ok(deleted) => tracing::debug!(deleted, "old snapshots deleted"),
                Err(e) => tracing::warn!(error = %e, "snapshot cleanup failed"),
            }
        }
    })
}
