//! Database models for events and pool snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::amm::LedgerSnapshot;
use crate::domain::{PoolEvent, PoolId, PoolMetadata};
use crate::error::GatewayError;

/// A stored event row from the `events` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEvent {
    /// Auto-increment row ID; append order.
    pub id: i64,
    /// Pool that generated the event.
    pub pool_id: Uuid,
    /// Event type discriminator (e.g. `"swap_executed"`).
    pub event_type: String,
    /// JSONB payload: the serialized bus event.
    pub payload: serde_json::Value,
    /// Event timestamp as recorded by the ledger.
    pub created_at: DateTime<Utc>,
}

impl StoredEvent {
    /// Decodes the payload back into the bus event that produced it.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] if the payload is not a
    /// valid [`PoolEvent`].
    pub fn decode(&self) -> Result<PoolEvent, GatewayError> {
        serde_json::from_value(self.payload.clone()).map_err(|e| {
            GatewayError::PersistenceError(format!("event {}: bad payload: {e}", self.id))
        })
    }
}

/// A pool snapshot row from the `pool_snapshots` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSnapshotRow {
    /// Auto-increment row ID.
    pub id: i64,
    /// Pool that was snapshotted.
    pub pool_id: Uuid,
    /// Reserves, share supply and balances as JSONB.
    pub ledger_json: serde_json::Value,
    /// Token metadata, name and counters as JSONB.
    pub metadata_json: serde_json::Value,
    /// Snapshot timestamp.
    pub snapshot_at: DateTime<Utc>,
}

impl PoolSnapshotRow {
    /// Decodes the JSONB columns back into domain types.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] if a column does not match
    /// the expected shape.
    pub fn decode(&self) -> Result<(PoolId, LedgerSnapshot, PoolMetadata), GatewayError> {
        let ledger: LedgerSnapshot = serde_json::from_value(self.ledger_json.clone())
            .map_err(|e| {
                GatewayError::PersistenceError(format!("snapshot {}: bad ledger: {e}", self.id))
            })?;
        let metadata: PoolMetadata = serde_json::from_value(self.metadata_json.clone())
            .map_err(|e| {
                GatewayError::PersistenceError(format!("snapshot {}: bad metadata: {e}", self.id))
            })?;
        Ok((PoolId::from_uuid(self.pool_id), ledger, metadata))
    }
}
