//! Persistence layer: PostgreSQL event log and pool snapshots.
//!
//! [`PostgresPersistence`] stores every bus event in `events` and periodic
//! ledger snapshots in `pool_snapshots`. The [`tasks`] module wires it to
//! the running service: an event writer, a snapshot ticker, a cleanup
//! ticker, and the startup restore.

pub mod models;
pub mod postgres;
pub mod tasks;

pub use postgres::PostgresPersistence;
