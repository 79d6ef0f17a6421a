//! Domain layer: pool identity, registry, and event system.
//!
//! This module contains the server-side domain model wrapped around the
//! [`crate::amm`] core: pool identity, pool entries with token metadata,
//! the event bus for broadcasting committed mutations, and the pool
//! registry that serializes mutations per pool.

pub mod event_bus;
pub mod pool_entry;
pub mod pool_event;
pub mod pool_id;
pub mod pool_registry;

pub use event_bus::EventBus;
pub use pool_entry::{PoolEntry, PoolMetadata, TokenInfo};
pub use pool_event::PoolEvent;
pub use pool_id::PoolId;
pub use pool_registry::PoolRegistry;
