//! Type-safe pool identifier.
//!
//! [`PoolId`] wraps a [`uuid::Uuid`] (v4) so that pool identifiers cannot
//! be confused with command or swap IDs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Unique identifier for a pool instance.
///
/// Generated once at pool creation time (or read back from a snapshot)
/// and immutable thereafter. Keys the [`super::PoolRegistry`], tags every
/// [`super::PoolEvent`], and is the WebSocket subscription target.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct PoolId(uuid::Uuid);

impl PoolId {
    /// Creates a new random `PoolId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates a `PoolId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for PoolId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PoolId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl From<uuid::Uuid> for PoolId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}
