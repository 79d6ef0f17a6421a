//! PostgreSQL implementation of the persistence layer.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::models::{PoolSnapshotRow, StoredEvent};
use crate::amm::LedgerSnapshot;
use crate::config::GatewayConfig;
use crate::domain::{PoolEvent, PoolId, PoolMetadata};
use crate::error::GatewayError;

/// PostgreSQL-backed persistence layer using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool sized from `config` and applies migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] if the database is
    /// unreachable or a migration fails.
    pub async fn connect(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        tracing::info!(
            max_connections = config.database_max_connections,
            "connected to postgres"
        );
        Ok(Self::new(pool))
    }

    /// Appends a bus event to the event log.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn save_event(&self, event: &PoolEvent) -> Result<i64, GatewayError> {
        let payload = serde_json::to_value(event)
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        let row = sqlx::query_scalar::<_, i64>(
            "INSERT INTO events (pool_id, event_type, payload, created_at) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(*event.pool_id().as_uuid())
        .bind(event.event_type_str())
        .bind(payload)
        .bind(event.timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(row)
    }

    /// Saves a pool ledger snapshot with its metadata.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on serialization or
    /// database failure.
    pub async fn save_snapshot(
        &self,
        pool_id: PoolId,
        ledger: &LedgerSnapshot,
        metadata: &PoolMetadata,
    ) -> Result<i64, GatewayError> {
        let ledger_json = serde_json::to_value(ledger)
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;
        let metadata_json = serde_json::to_value(metadata)
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        let row = sqlx::query_scalar::<_, i64>(
            "INSERT INTO pool_snapshots (pool_id, ledger_json, metadata_json) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(*pool_id.as_uuid())
        .bind(ledger_json)
        .bind(metadata_json)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(row)
    }

    /// Loads the latest snapshot for each pool using `DISTINCT ON`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn load_latest_snapshots(&self) -> Result<Vec<PoolSnapshotRow>, GatewayError> {
        let rows = sqlx::query_as::<
            _,
            (
                i64,
                Uuid,
                serde_json::Value,
                serde_json::Value,
                DateTime<Utc>,
            ),
        >(
            "SELECT DISTINCT ON (pool_id) id, pool_id, ledger_json, metadata_json, snapshot_at \
             FROM pool_snapshots ORDER BY pool_id, snapshot_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(
                |(id, pool_id, ledger_json, metadata_json, snapshot_at)| PoolSnapshotRow {
                    id,
                    pool_id,
                    ledger_json,
                    metadata_json,
                    snapshot_at,
                },
            )
            .collect())
    }

    /// Loads every stored event of one pool in append order.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn load_events(&self, pool_id: PoolId) -> Result<Vec<StoredEvent>, GatewayError> {
        let rows = sqlx::query_as::<_, (i64, Uuid, String, serde_json::Value, DateTime<Utc>)>(
            "SELECT id, pool_id, event_type, payload, created_at FROM events \
             WHERE pool_id = $1 ORDER BY id ASC",
        )
        .bind(*pool_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(
                |(id, pool_id, event_type, payload, created_at)| StoredEvent {
                    id,
                    pool_id,
                    event_type,
                    payload,
                    created_at,
                },
            )
            .collect())
    }

    /// Deletes every snapshot of one pool, so a removed pool is not
    /// restored on the next start.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn delete_pool_snapshots(&self, pool_id: PoolId) -> Result<u64, GatewayError> {
        let result = sqlx::query("DELETE FROM pool_snapshots WHERE pool_id = $1")
            .bind(*pool_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(result.rows_affected())
    }

    /// Deletes snapshots older than the given number of days, keeping the
    /// newest snapshot of every pool.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn delete_old_snapshots(&self, before_days: u64) -> Result<u64, GatewayError> {
        let days = i64::try_from(before_days).unwrap_or(i64::MAX);
        let cutoff = chrono::Duration::try_days(days)
            .and_then(|age| Utc::now().checked_sub_signed(age))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let result = sqlx::query(
            "DELETE FROM pool_snapshots s WHERE s.snapshot_at < $1 \
             AND s.id <> (SELECT MAX(id) FROM pool_snapshots l WHERE l.pool_id = s.pool_id)",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
