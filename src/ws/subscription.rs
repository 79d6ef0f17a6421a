//! Per-connection subscription manager.
//!
//! Tracks which pool IDs a WebSocket client is subscribed to and
//! provides server-side filtering of pool events.

use std::collections::HashSet;

use crate::domain::PoolId;

/// Manages the set of pool subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed pool IDs. If `subscribe_all` is true, this set is ignored.
    pool_ids: HashSet<PoolId>,
    /// Whether the client subscribes to all pools (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds pool IDs to the subscription set. `"*"` enables the wildcard.
    pub fn subscribe(&mut self, ids: &[PoolId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        for id in ids {
            self.pool_ids.insert(*id);
        }
    }

    /// Removes pool IDs from the subscription set. `wildcard` drops `"*"`.
    pub fn unsubscribe(&mut self, ids: &[PoolId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = false;
        }
        for id in ids {
            self.pool_ids.remove(id);
        }
    }

    /// Returns `true` if the given pool ID matches the subscription filter.
    #[must_use]
    pub fn matches(&self, pool_id: PoolId) -> bool {
        self.subscribe_all || self.pool_ids.contains(&pool_id)
    }

    /// Returns the number of explicitly subscribed pool IDs.
    #[must_use]
    pub fn count(&self) -> usize {
        self.pool_ids.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}

/// Pool targets parsed from a `subscribe`/`unsubscribe` command.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Targets {
    /// Well-formed pool IDs.
    pub pool_ids: Vec<PoolId>,
    /// Whether `"*"` was present.
    pub wildcard: bool,
    /// Entries that were neither `"*"` nor a UUID.
    pub rejected: Vec<String>,
}

/// Splits raw command arguments into pool IDs, the wildcard and rejects.
#[must_use]
pub fn parse_targets(raw: &[String]) -> Targets {
    let mut targets = Targets::default();
    for entry in raw {
        if entry == "*" {
            targets.wildcard = true;
        } else if let Ok(id) = entry.parse::<PoolId>() {
            targets.pool_ids.push(id);
        } else {
            targets.rejected.push(entry.clone());
        }
    }
    targets
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn empty_matches_nothing() {
        let mgr = SubscriptionManager::new();
        assert!(!mgr.matches(PoolId::new()));
    }

    #[test]
    fn subscribe_specific_pool() {
        let mut mgr = SubscriptionManager::new();
        let id = PoolId::new();
        mgr.subscribe(&[id], false);
        assert!(mgr.matches(id));
        assert!(!mgr.matches(PoolId::new()));
    }

    #[test]
    fn wildcard_matches_everything() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[], true);
        assert!(mgr.matches(PoolId::new()));
        assert!(mgr.matches(PoolId::new()));
    }

    #[test]
    fn unsubscribe_removes_pool() {
        let mut mgr = SubscriptionManager::new();
        let id = PoolId::new();
        mgr.subscribe(&[id], false);
        assert!(mgr.matches(id));
        mgr.unsubscribe(&[id], false);
        assert!(!mgr.matches(id));
    }

    #[test]
    fn unsubscribe_wildcard_keeps_explicit() {
        let mut mgr = SubscriptionManager::new();
        let id = PoolId::new();
        mgr.subscribe(&[id], true);
        mgr.unsubscribe(&[], true);
        assert!(!mgr.is_subscribed_all());
        assert!(mgr.matches(id));
        assert!(!mgr.matches(PoolId::new()));
    }

    #[test]
    fn count_ignores_duplicates() {
        let mut mgr = SubscriptionManager::new();
        let id = PoolId::new();
        mgr.subscribe(&[id, id, PoolId::new()], false);
        assert_eq!(mgr.count(), 2);
    }

    #[test]
    fn targets_split_wildcard_and_rejects() {
        let id = PoolId::new();
        let targets = parse_targets(&["*".to_string(), id.to_string(), "nope".to_string()]);
        assert!(targets.wildcard);
        assert_eq!(targets.pool_ids, vec![id]);
        assert_eq!(targets.rejected, vec!["nope".to_string()]);
    }
}
