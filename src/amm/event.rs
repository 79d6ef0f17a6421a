//! Ledger event records and the append-only event log.
//!
//! Each committed mutation appends exactly one [`LedgerEvent`] carrying
//! the post-mutation reserve snapshot. Records are never modified once
//! appended. Consumers must treat timestamps, not arrival order, as the
//! authoritative chronology; [`EventLog::chronological`] re-derives it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Amount, HolderId, Reserves, Shares, TokenSide};

/// Liquidity was deposited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositEvent {
    /// Depositor.
    pub holder: HolderId,
    /// Token1 deposited.
    pub amount1: Amount,
    /// Token2 deposited.
    pub amount2: Amount,
    /// Shares minted to the holder.
    pub shares: Shares,
    /// Token1 reserve after the deposit.
    pub reserve1_after: Amount,
    /// Token2 reserve after the deposit.
    pub reserve2_after: Amount,
    /// Commit time.
    pub timestamp: DateTime<Utc>,
}

/// Liquidity was withdrawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawEvent {
    /// Withdrawing holder.
    pub holder: HolderId,
    /// Token1 paid out.
    pub amount1: Amount,
    /// Token2 paid out.
    pub amount2: Amount,
    /// Shares burned.
    pub shares: Shares,
    /// Token1 reserve after the withdrawal.
    pub reserve1_after: Amount,
    /// Token2 reserve after the withdrawal.
    pub reserve2_after: Amount,
    /// Commit time.
    pub timestamp: DateTime<Utc>,
}

/// A swap was executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapEvent {
    /// Trader.
    pub holder: HolderId,
    /// Token sold into the pool.
    pub token_given: TokenSide,
    /// Amount sold into the pool.
    pub amount_given: Amount,
    /// Token bought from the pool.
    pub token_received: TokenSide,
    /// Amount bought from the pool.
    pub amount_received: Amount,
    /// Token1 reserve after the swap.
    pub reserve1_after: Amount,
    /// Token2 reserve after the swap.
    pub reserve2_after: Amount,
    /// Commit time.
    pub timestamp: DateTime<Utc>,
}

/// One entry of the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// See [`DepositEvent`].
    Deposit(DepositEvent),
    /// See [`WithdrawEvent`].
    Withdraw(WithdrawEvent),
    /// See [`SwapEvent`].
    Swap(SwapEvent),
}

impl LedgerEvent {
    /// Commit time of the underlying record.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Deposit(e) => e.timestamp,
            Self::Withdraw(e) => e.timestamp,
            Self::Swap(e) => e.timestamp,
        }
    }

    /// Reserve snapshot recorded after the mutation.
    #[must_use]
    pub const fn reserves_after(&self) -> Reserves {
        match self {
            Self::Deposit(e) => Reserves::new(e.reserve1_after, e.reserve2_after),
            Self::Withdraw(e) => Reserves::new(e.reserve1_after, e.reserve2_after),
            Self::Swap(e) => Reserves::new(e.reserve1_after, e.reserve2_after),
        }
    }

    /// Record kind as a static string slice.
    #[must_use]
    pub const fn kind_str(&self) -> &'static str {
        match self {
            Self::Deposit(_) => "deposit",
            Self::Withdraw(_) => "withdraw",
            Self::Swap(_) => "swap",
        }
    }
}

impl From<DepositEvent> for LedgerEvent {
    fn from(e: DepositEvent) -> Self {
        Self::Deposit(e)
    }
}

impl From<WithdrawEvent> for LedgerEvent {
    fn from(e: WithdrawEvent) -> Self {
        Self::Withdraw(e)
    }
}

impl From<SwapEvent> for LedgerEvent {
    fn from(e: SwapEvent) -> Self {
        Self::Swap(e)
    }
}

/// Append-only sequence of [`LedgerEvent`]s in commit order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    entries: Vec<LedgerEvent>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&mut self, event: LedgerEvent) {
        self.entries.push(event);
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Events in append order.
    pub fn iter(&self) -> impl Iterator<Item = &LedgerEvent> {
        self.entries.iter()
    }

    /// Events ordered by timestamp; ties keep append order.
    #[must_use]
    pub fn chronological(&self) -> Vec<&LedgerEvent> {
        sorted(self.entries.iter())
    }

    /// Events with a timestamp strictly after `after`, in chronological
    /// order.
    #[must_use]
    pub fn since(&self, after: DateTime<Utc>) -> Vec<&LedgerEvent> {
        sorted(self.entries.iter().filter(|e| e.timestamp() > after))
    }
}

impl From<Vec<LedgerEvent>> for EventLog {
    fn from(entries: Vec<LedgerEvent>) -> Self {
        Self { entries }
    }
}

fn sorted<'a>(events: impl Iterator<Item = &'a LedgerEvent>) -> Vec<&'a LedgerEvent> {
    let mut ordered: Vec<&LedgerEvent> = events.collect();
    ordered.sort_by_key(|e| e.timestamp());
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn swap_at(secs: i64, amount: u128) -> LedgerEvent {
        LedgerEvent::Swap(SwapEvent {
            holder: HolderId::new("0xabc"),
            token_given: TokenSide::Token1,
            amount_given: Amount::new(amount),
            token_received: TokenSide::Token2,
            amount_received: Amount::new(1),
            reserve1_after: Amount::new(10),
            reserve2_after: Amount::new(20),
            timestamp: Utc.timestamp_opt(secs, 0).single().unwrap_or_default(),
        })
    }

    #[test]
    fn chronological_sorts_by_timestamp() {
        let mut log = EventLog::new();
        log.append(swap_at(30, 1));
        log.append(swap_at(10, 2));
        log.append(swap_at(20, 3));
        log.append(swap_at(10, 4));

        let amounts: Vec<u128> = log
            .chronological()
            .iter()
            .filter_map(|e| match e {
                LedgerEvent::Swap(s) => Some(s.amount_given.get()),
                _ => None,
            })
            .collect();
        assert_eq!(amounts, vec![2, 4, 3, 1]);
    }

    #[test]
    fn since_filters_strictly_after() {
        let mut log = EventLog::new();
        log.append(swap_at(10, 1));
        log.append(swap_at(20, 2));
        let cutoff = Utc.timestamp_opt(10, 0).single().unwrap_or_default();
        assert_eq!(log.since(cutoff).len(), 1);
    }

    #[test]
    fn since_keeps_timestamp_order() {
        let mut log = EventLog::new();
        log.append(swap_at(40, 1));
        log.append(swap_at(5, 2));
        log.append(swap_at(20, 3));
        let cutoff = Utc.timestamp_opt(10, 0).single().unwrap_or_default();

        let amounts: Vec<u128> = log
            .since(cutoff)
            .iter()
            .filter_map(|e| match e {
                LedgerEvent::Swap(s) => Some(s.amount_given.get()),
                _ => None,
            })
            .collect();
        assert_eq!(amounts, vec![3, 1]);
    }

    #[test]
    fn accessors() {
        let event = swap_at(5, 7);
        assert_eq!(event.kind_str(), "swap");
        assert_eq!(
            event.reserves_after(),
            Reserves::new(Amount::new(10), Amount::new(20))
        );
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_string(&swap_at(5, 7)).unwrap_or_default();
        assert!(json.contains("\"kind\":\"swap\""));
        assert!(json.contains("\"token_given\":\"token1\""));
        assert!(json.contains("\"amount_given\":\"7\""));
    }
}
