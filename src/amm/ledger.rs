//! The pool ledger: reserves, share accounting and the event log.
//!
//! [`PoolLedger`] is the only owner of a pool's mutable state. Each
//! mutating method validates and computes everything against the current
//! state first and only then commits reserves, shares and the event entry
//! together, so a returned error always means nothing changed.
//!
//! The ledger itself is synchronous and not thread-safe; callers serialize
//! mutations by holding it behind a single lock (see
//! [`crate::domain::PoolRegistry`]).

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::event::{DepositEvent, EventLog, LedgerEvent, SwapEvent, WithdrawEvent};
use super::math::U256;
use super::quote::{self, Reserves, TokenSide};
use super::{AmmError, Amount, Shares};

/// Opaque identity of a liquidity provider or trader.
///
/// The ledger never interprets it beyond using it as a share-ledger key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HolderId(String);

impl HolderId {
    /// Wraps an address-like identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HolderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Serializable image of a ledger's reserves and share balances.
///
/// The event log itself is not part of the snapshot; `event_count` records
/// how many entries it held, so later records can be replayed on restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Token1 reserve.
    pub reserve1: Amount,
    /// Token2 reserve.
    pub reserve2: Amount,
    /// Sum of all share balances.
    pub total_shares: Shares,
    /// Non-zero share balances by holder.
    pub shares: BTreeMap<HolderId, Shares>,
    /// Length of the event log at capture time.
    #[serde(default)]
    pub event_count: usize,
}

/// State of a single two-token constant-product pool.
///
/// # Invariants
///
/// - `reserve1 == 0 ⇔ reserve2 == 0 ⇔ total_shares == 0`
/// - `sum(shares_of) == total_shares`
/// - holders with a zero balance have no entry
#[derive(Debug, Clone, Default)]
pub struct PoolLedger {
    reserves: Reserves,
    total_shares: Shares,
    shares: BTreeMap<HolderId, Shares>,
    events: EventLog,
}

impl PoolLedger {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current reserves.
    #[must_use]
    pub const fn reserves(&self) -> Reserves {
        self.reserves
    }

    /// Token1 reserve.
    #[must_use]
    pub const fn reserve1(&self) -> Amount {
        self.reserves.reserve1
    }

    /// Token2 reserve.
    #[must_use]
    pub const fn reserve2(&self) -> Amount {
        self.reserves.reserve2
    }

    /// Total shares outstanding.
    #[must_use]
    pub const fn total_shares(&self) -> Shares {
        self.total_shares
    }

    /// Share balance of `holder`; absent holders own zero.
    #[must_use]
    pub fn shares_of(&self, holder: &HolderId) -> Shares {
        self.shares.get(holder).copied().unwrap_or(Shares::ZERO)
    }

    /// Holders with a non-zero balance, ordered by id.
    pub fn holders(&self) -> impl Iterator<Item = (&HolderId, Shares)> {
        self.shares.iter().map(|(holder, shares)| (holder, *shares))
    }

    /// Returns `true` until the first deposit (and again once every share
    /// has been withdrawn).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total_shares.is_zero()
    }

    /// The constant-product invariant `K`.
    #[must_use]
    pub fn invariant(&self) -> U256 {
        self.reserves.invariant()
    }

    /// Token1 priced in token2, 18 decimals.
    #[must_use]
    pub fn spot_price(&self) -> Option<Amount> {
        quote::spot_price(self.reserves)
    }

    /// The append-only event log.
    #[must_use]
    pub const fn events(&self) -> &EventLog {
        &self.events
    }

    // ── Quotes ──────────────────────────────────────────────────────────

    /// Token2 needed alongside `amount1` of token1.
    ///
    /// # Errors
    ///
    /// See [`quote::token2_deposit`].
    pub fn calculate_token2_deposit(&self, amount1: Amount) -> Result<Amount, AmmError> {
        quote::token2_deposit(self.reserves, amount1)
    }

    /// Token1 needed alongside `amount2` of token2.
    ///
    /// # Errors
    ///
    /// See [`quote::token1_deposit`].
    pub fn calculate_token1_deposit(&self, amount2: Amount) -> Result<Amount, AmmError> {
        quote::token1_deposit(self.reserves, amount2)
    }

    /// Token2 received for selling `amount_in` of token1.
    ///
    /// # Errors
    ///
    /// See [`quote::swap_output`].
    pub fn calculate_token1_swap(&self, amount_in: Amount) -> Result<Amount, AmmError> {
        quote::token1_swap(self.reserves, amount_in)
    }

    /// Token1 received for selling `amount_in` of token2.
    ///
    /// # Errors
    ///
    /// See [`quote::swap_output`].
    pub fn calculate_token2_swap(&self, amount_in: Amount) -> Result<Amount, AmmError> {
        quote::token2_swap(self.reserves, amount_in)
    }

    /// Output for selling `amount_in` of `side`.
    ///
    /// # Errors
    ///
    /// See [`quote::swap_output`].
    pub fn calculate_swap(&self, side: TokenSide, amount_in: Amount) -> Result<Amount, AmmError> {
        quote::swap_output(self.reserves, side, amount_in)
    }

    /// Token amounts paid out for burning `share_amount`.
    ///
    /// # Errors
    ///
    /// See [`quote::withdraw`].
    pub fn calculate_token_withdraw(
        &self,
        share_amount: Shares,
    ) -> Result<(Amount, Amount), AmmError> {
        quote::withdraw(self.reserves, self.total_shares, share_amount)
    }

    // ── Mutations ───────────────────────────────────────────────────────

    /// Deposits `amount1` of token1 and `amount2` of token2 for `holder`.
    ///
    /// The first deposit into an empty pool sets the price ratio and mints
    /// [`Shares::INITIAL`]. Later deposits must match the current ratio:
    /// `amount2` equals [`Self::calculate_token2_deposit`] of `amount1`, or
    /// `amount1` equals [`Self::calculate_token1_deposit`] of `amount2`.
    /// They mint `amount1 * total_shares / reserve1` shares.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidAmount`] if either amount is zero or the deposit
    ///   is too small to mint a share unit.
    /// - [`AmmError::RatioMismatch`] if the amounts break the pool ratio.
    /// - [`AmmError::Overflow`] if a reserve or share count would overflow.
    pub fn add_liquidity(
        &mut self,
        holder: &HolderId,
        amount1: Amount,
        amount2: Amount,
        timestamp: DateTime<Utc>,
    ) -> Result<DepositEvent, AmmError> {
        if amount1.is_zero() || amount2.is_zero() {
            return Err(AmmError::InvalidAmount);
        }

        let minted = if self.total_shares.is_zero() {
            Shares::INITIAL
        } else {
            let expected2 = self.calculate_token2_deposit(amount1)?;
            if amount2 != expected2 && self.calculate_token1_deposit(amount2).ok() != Some(amount1)
            {
                return Err(AmmError::RatioMismatch {
                    expected: expected2,
                    provided: amount2,
                });
            }
            let minted = quote::deposit_shares(self.reserves, self.total_shares, amount1)?;
            if minted.is_zero() {
                return Err(AmmError::InvalidAmount);
            }
            minted
        };

        let reserves = Reserves::new(
            self.reserves
                .reserve1
                .checked_add(amount1)
                .ok_or(AmmError::Overflow)?,
            self.reserves
                .reserve2
                .checked_add(amount2)
                .ok_or(AmmError::Overflow)?,
        );
        let total_shares = self
            .total_shares
            .checked_add(minted)
            .ok_or(AmmError::Overflow)?;
        let balance = self
            .shares_of(holder)
            .checked_add(minted)
            .ok_or(AmmError::Overflow)?;

        let event = DepositEvent {
            holder: holder.clone(),
            amount1,
            amount2,
            shares: minted,
            reserve1_after: reserves.reserve1,
            reserve2_after: reserves.reserve2,
            timestamp,
        };

        self.reserves = reserves;
        self.total_shares = total_shares;
        self.set_balance(holder, balance);
        self.events.append(event.clone().into());
        Ok(event)
    }

    /// Burns `share_amount` of `holder`'s shares and pays out the
    /// proportional reserves.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidAmount`] if `share_amount` is zero.
    /// - [`AmmError::InsufficientShares`] if the holder owns fewer shares.
    /// - [`AmmError::InsufficientReserve`] if the payout exceeds reserves.
    pub fn remove_liquidity(
        &mut self,
        holder: &HolderId,
        share_amount: Shares,
        timestamp: DateTime<Utc>,
    ) -> Result<WithdrawEvent, AmmError> {
        if share_amount.is_zero() {
            return Err(AmmError::InvalidAmount);
        }
        let available = self.shares_of(holder);
        let insufficient = AmmError::InsufficientShares {
            requested: share_amount,
            available,
        };
        let Some(balance) = available.checked_sub(share_amount) else {
            return Err(insufficient);
        };

        let (amount1, amount2) = self.calculate_token_withdraw(share_amount)?;
        let reserves = Reserves::new(
            self.reserves
                .reserve1
                .checked_sub(amount1)
                .ok_or(AmmError::InsufficientReserve)?,
            self.reserves
                .reserve2
                .checked_sub(amount2)
                .ok_or(AmmError::InsufficientReserve)?,
        );
        let total_shares = self
            .total_shares
            .checked_sub(share_amount)
            .ok_or(insufficient)?;

        let event = WithdrawEvent {
            holder: holder.clone(),
            amount1,
            amount2,
            shares: share_amount,
            reserve1_after: reserves.reserve1,
            reserve2_after: reserves.reserve2,
            timestamp,
        };

        self.reserves = reserves;
        self.total_shares = total_shares;
        self.set_balance(holder, balance);
        self.events.append(event.clone().into());
        Ok(event)
    }

    /// Sells `amount_in` of token1 for token2.
    ///
    /// # Errors
    ///
    /// See [`Self::swap`].
    pub fn swap_token1(
        &mut self,
        holder: &HolderId,
        amount_in: Amount,
        timestamp: DateTime<Utc>,
    ) -> Result<SwapEvent, AmmError> {
        self.swap(holder, TokenSide::Token1, amount_in, timestamp)
    }

    /// Sells `amount_in` of token2 for token1.
    ///
    /// # Errors
    ///
    /// See [`Self::swap`].
    pub fn swap_token2(
        &mut self,
        holder: &HolderId,
        amount_in: Amount,
        timestamp: DateTime<Utc>,
    ) -> Result<SwapEvent, AmmError> {
        self.swap(holder, TokenSide::Token2, amount_in, timestamp)
    }

    /// Sells `amount_in` of `side` for the other token along the curve.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidAmount`] if `amount_in` is zero.
    /// - [`AmmError::EmptyPool`] if the pool has no liquidity.
    /// - [`AmmError::InsufficientLiquidity`] if the output would drain the
    ///   opposite reserve.
    /// - [`AmmError::Overflow`] if the input reserve would overflow.
    pub fn swap(
        &mut self,
        holder: &HolderId,
        side: TokenSide,
        amount_in: Amount,
        timestamp: DateTime<Utc>,
    ) -> Result<SwapEvent, AmmError> {
        let amount_out = self.calculate_swap(side, amount_in)?;

        let reserve_in = self
            .reserves
            .of(side)
            .checked_add(amount_in)
            .ok_or(AmmError::Overflow)?;
        let reserve_out = self
            .reserves
            .of(side.other())
            .checked_sub(amount_out)
            .ok_or(AmmError::InsufficientLiquidity)?;
        let reserves = match side {
            TokenSide::Token1 => Reserves::new(reserve_in, reserve_out),
            TokenSide::Token2 => Reserves::new(reserve_out, reserve_in),
        };

        let event = SwapEvent {
            holder: holder.clone(),
            token_given: side,
            amount_given: amount_in,
            token_received: side.other(),
            amount_received: amount_out,
            reserve1_after: reserves.reserve1,
            reserve2_after: reserves.reserve2,
            timestamp,
        };

        self.reserves = reserves;
        self.events.append(event.clone().into());
        Ok(event)
    }

    // ── Snapshots ───────────────────────────────────────────────────────

    /// Captures reserves and share balances.
    #[must_use]
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            reserve1: self.reserves.reserve1,
            reserve2: self.reserves.reserve2,
            total_shares: self.total_shares,
            shares: self.shares.clone(),
            event_count: self.events.len(),
        }
    }

    /// Rebuilds a ledger from a snapshot with an empty event log.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InconsistentState`] if the snapshot violates a
    /// ledger invariant.
    pub fn restore(snapshot: LedgerSnapshot) -> Result<Self, AmmError> {
        let LedgerSnapshot {
            reserve1,
            reserve2,
            total_shares,
            mut shares,
            ..
        } = snapshot;

        shares.retain(|_, balance| !balance.is_zero());
        let sum = shares
            .values()
            .try_fold(Shares::ZERO, |acc, s| acc.checked_add(*s))
            .ok_or_else(|| AmmError::InconsistentState("share sum overflows".to_string()))?;
        if sum != total_shares {
            return Err(AmmError::InconsistentState(format!(
                "share balances sum to {sum}, total is {total_shares}"
            )));
        }
        if reserve1.is_zero() != reserve2.is_zero() || reserve1.is_zero() != total_shares.is_zero()
        {
            return Err(AmmError::InconsistentState(
                "reserves and total shares disagree on emptiness".to_string(),
            ));
        }

        Ok(Self {
            reserves: Reserves::new(reserve1, reserve2),
            total_shares,
            shares,
            events: EventLog::new(),
        })
    }

    /// Rebuilds a ledger from a snapshot plus the pool's persisted event
    /// history, in append order.
    ///
    /// The first `snapshot.event_count` records are already reflected in
    /// the snapshot and only repopulate the log. Later records are replayed
    /// onto the restored state.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InconsistentState`] if the snapshot violates a
    /// ledger invariant or a replayed record does not continue from the
    /// state before it.
    pub fn restore_with_events(
        snapshot: LedgerSnapshot,
        history: Vec<LedgerEvent>,
    ) -> Result<Self, AmmError> {
        let covered = snapshot.event_count.min(history.len());
        let mut ledger = Self::restore(snapshot)?;
        for record in history.iter().skip(covered) {
            ledger.replay(record)?;
        }
        ledger.events = EventLog::from(history);
        Ok(ledger)
    }

    /// Applies a recorded mutation without recomputing it.
    fn replay(&mut self, record: &LedgerEvent) -> Result<(), AmmError> {
        let broken = || {
            AmmError::InconsistentState(format!(
                "{} record at {} does not continue the ledger",
                record.kind_str(),
                record.timestamp()
            ))
        };
        let before = self.reserves;
        let expected = match record {
            LedgerEvent::Deposit(e) => Reserves::new(
                before.reserve1.checked_add(e.amount1).ok_or_else(broken)?,
                before.reserve2.checked_add(e.amount2).ok_or_else(broken)?,
            ),
            LedgerEvent::Withdraw(e) => Reserves::new(
                before.reserve1.checked_sub(e.amount1).ok_or_else(broken)?,
                before.reserve2.checked_sub(e.amount2).ok_or_else(broken)?,
            ),
            LedgerEvent::Swap(e) => match (e.token_given, e.token_received) {
                (TokenSide::Token1, TokenSide::Token2) => Reserves::new(
                    before.reserve1.checked_add(e.amount_given).ok_or_else(broken)?,
                    before.reserve2.checked_sub(e.amount_received).ok_or_else(broken)?,
                ),
                (TokenSide::Token2, TokenSide::Token1) => Reserves::new(
                    before.reserve1.checked_sub(e.amount_received).ok_or_else(broken)?,
                    before.reserve2.checked_add(e.amount_given).ok_or_else(broken)?,
                ),
                _ => return Err(broken()),
            },
        };
        if expected != record.reserves_after() {
            return Err(broken());
        }

        let (total, holder, balance) = match record {
            LedgerEvent::Deposit(e) => (
                self.total_shares.checked_add(e.shares).ok_or_else(broken)?,
                &e.holder,
                self.shares_of(&e.holder).checked_add(e.shares).ok_or_else(broken)?,
            ),
            LedgerEvent::Withdraw(e) => (
                self.total_shares.checked_sub(e.shares).ok_or_else(broken)?,
                &e.holder,
                self.shares_of(&e.holder).checked_sub(e.shares).ok_or_else(broken)?,
            ),
            LedgerEvent::Swap(_) => {
                self.reserves = expected;
                return Ok(());
            }
        };
        if expected.reserve1.is_zero() != total.is_zero() {
            return Err(broken());
        }
        self.reserves = expected;
        self.total_shares = total;
        self.set_balance(holder, balance);
        Ok(())
    }

    fn set_balance(&mut self, holder: &HolderId, balance: Shares) {
        if balance.is_zero() {
            self.shares.remove(holder);
        } else {
            self.shares.insert(holder.clone(), balance);
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn deployer() -> HolderId {
        HolderId::new("0xdeployer")
    }

    fn provider() -> HolderId {
        HolderId::new("0xprovider")
    }

    fn shares(whole: u128) -> Shares {
        let Ok(s) = Shares::from_whole(whole) else {
            panic!("valid shares");
        };
        s
    }

    /// Scenario A: empty pool, deposit (100000, 100000).
    fn scenario_a() -> PoolLedger {
        let mut ledger = PoolLedger::new();
        let result = ledger.add_liquidity(
            &deployer(),
            Amount::new(100_000),
            Amount::new(100_000),
            Utc::now(),
        );
        assert!(result.is_ok());
        ledger
    }

    /// Scenario B: a second holder deposits (50000, quote).
    fn scenario_b() -> PoolLedger {
        let mut ledger = scenario_a();
        let Ok(amount2) = ledger.calculate_token2_deposit(Amount::new(50_000)) else {
            panic!("quote failed");
        };
        assert_eq!(amount2, Amount::new(50_000));
        let result = ledger.add_liquidity(&provider(), Amount::new(50_000), amount2, Utc::now());
        assert!(result.is_ok());
        ledger
    }

    fn assert_invariants(ledger: &PoolLedger) {
        let sum = ledger
            .holders()
            .fold(0u128, |acc, (_, s)| acc + s.get());
        assert_eq!(sum, ledger.total_shares().get());
        assert_eq!(ledger.reserve1().is_zero(), ledger.reserve2().is_zero());
        assert_eq!(ledger.reserve1().is_zero(), ledger.total_shares().is_zero());
    }

    #[test]
    fn new_ledger_is_empty() {
        let ledger = PoolLedger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.reserves(), Reserves::EMPTY);
        assert!(ledger.events().is_empty());
        assert_eq!(ledger.spot_price(), None);
    }

    #[test]
    fn first_deposit_mints_initial_shares() {
        let ledger = scenario_a();
        assert_eq!(ledger.total_shares(), shares(100));
        assert_eq!(ledger.shares_of(&deployer()), shares(100));
        assert_eq!(ledger.reserve1(), Amount::new(100_000));
        assert_eq!(ledger.reserve2(), Amount::new(100_000));
        assert_invariants(&ledger);
    }

    #[test]
    fn second_deposit_mints_proportional_shares() {
        let ledger = scenario_b();
        assert_eq!(ledger.shares_of(&provider()), shares(50));
        assert_eq!(ledger.shares_of(&deployer()), shares(100));
        assert_eq!(ledger.total_shares(), shares(150));
        assert_invariants(&ledger);
    }

    #[test]
    fn first_deposit_sets_arbitrary_ratio() {
        let mut ledger = PoolLedger::new();
        let result = ledger.add_liquidity(
            &deployer(),
            Amount::new(1_000),
            Amount::new(3_000),
            Utc::now(),
        );
        assert!(result.is_ok());
        assert_eq!(
            ledger.calculate_token2_deposit(Amount::new(10)),
            Ok(Amount::new(30))
        );
    }

    #[test]
    fn small_swap_matches_quote_and_event() {
        let mut ledger = scenario_b();
        let Ok(quoted) = ledger.calculate_token1_swap(Amount::new(1)) else {
            panic!("quote failed");
        };
        let k = 150_000u128 * 150_000;
        assert_eq!(quoted, Amount::new(150_000 - k / 150_001));

        let Ok(event) = ledger.swap_token1(&provider(), Amount::new(1), Utc::now()) else {
            panic!("swap failed");
        };
        assert_eq!(event.amount_received, quoted);
        assert_eq!(event.token_given, TokenSide::Token1);
        assert_eq!(event.token_received, TokenSide::Token2);
        assert_eq!(ledger.reserve1(), Amount::new(150_001));
        assert_eq!(ledger.reserve2(), Amount::new(k / 150_001));
        assert_eq!(event.reserve1_after, ledger.reserve1());
        assert_eq!(event.reserve2_after, ledger.reserve2());
        assert_invariants(&ledger);
    }

    #[test]
    fn token2_swap_matches_quote_and_event() {
        let mut ledger = scenario_b();
        let Ok(quoted) = ledger.calculate_token2_swap(Amount::new(2_500)) else {
            panic!("quote failed");
        };
        let k = 150_000u128 * 150_000;
        assert_eq!(quoted, Amount::new(150_000 - k / 152_500));

        let Ok(event) = ledger.swap_token2(&deployer(), Amount::new(2_500), Utc::now()) else {
            panic!("swap failed");
        };
        assert_eq!(event.token_given, TokenSide::Token2);
        assert_eq!(event.amount_given, Amount::new(2_500));
        assert_eq!(event.token_received, TokenSide::Token1);
        assert_eq!(event.amount_received, quoted);
        assert_eq!(ledger.reserve2(), Amount::new(152_500));
        assert_eq!(ledger.reserve1(), Amount::new(k / 152_500));
        assert_invariants(&ledger);
    }

    #[test]
    fn draining_swap_is_rejected_without_state_change() {
        let mut ledger = scenario_b();
        let before = ledger.snapshot();
        let events_before = ledger.events().len();

        // K / (reserve1 + amount_in) truncates to zero.
        let huge = Amount::new(150_000u128 * 150_000);
        let result = ledger.swap_token1(&provider(), huge, Utc::now());
        assert_eq!(result, Err(AmmError::InsufficientLiquidity));
        assert_eq!(ledger.snapshot(), before);
        assert_eq!(ledger.events().len(), events_before);
    }

    #[test]
    fn withdrawing_too_many_shares_is_rejected() {
        let mut ledger = scenario_b();
        let before = ledger.snapshot();
        let result = ledger.remove_liquidity(&provider(), shares(51), Utc::now());
        assert_eq!(
            result,
            Err(AmmError::InsufficientShares {
                requested: shares(51),
                available: shares(50),
            })
        );
        assert_eq!(ledger.snapshot(), before);
        assert_eq!(ledger.events().len(), 2);
    }

    #[test]
    fn unknown_holder_has_no_shares_to_withdraw() {
        let mut ledger = scenario_a();
        let result = ledger.remove_liquidity(&provider(), Shares::new(1), Utc::now());
        assert!(matches!(result, Err(AmmError::InsufficientShares { .. })));
    }

    #[test]
    fn ratio_mismatch_is_rejected() {
        let mut ledger = scenario_a();
        let before = ledger.snapshot();
        let result = ledger.add_liquidity(
            &provider(),
            Amount::new(50_000),
            Amount::new(49_000),
            Utc::now(),
        );
        assert_eq!(
            result,
            Err(AmmError::RatioMismatch {
                expected: Amount::new(50_000),
                provided: Amount::new(49_000),
            })
        );
        assert_eq!(ledger.snapshot(), before);
    }

    #[test]
    fn deposit_quoted_from_token2_side_is_accepted() {
        let mut ledger = PoolLedger::new();
        let _ = ledger.add_liquidity(&deployer(), Amount::new(3), Amount::new(2), Utc::now());
        // token1_deposit(1) = 3 * 1 / 2 = 1, while token2_deposit(1) truncates to 0.
        let Ok(amount1) = ledger.calculate_token1_deposit(Amount::new(1)) else {
            panic!("quote failed");
        };
        assert_eq!(amount1, Amount::new(1));
        assert_eq!(ledger.calculate_token2_deposit(amount1), Ok(Amount::ZERO));
        let result = ledger.add_liquidity(&provider(), amount1, Amount::new(1), Utc::now());
        assert!(result.is_ok());
        assert_invariants(&ledger);
    }

    #[test]
    fn zero_amounts_are_rejected() {
        let mut ledger = PoolLedger::new();
        assert_eq!(
            ledger.add_liquidity(&deployer(), Amount::ZERO, Amount::new(1), Utc::now()),
            Err(AmmError::InvalidAmount)
        );
        assert_eq!(
            ledger.add_liquidity(&deployer(), Amount::new(1), Amount::ZERO, Utc::now()),
            Err(AmmError::InvalidAmount)
        );
        assert!(ledger.events().is_empty());

        let mut ledger = scenario_a();
        assert_eq!(
            ledger.swap_token2(&deployer(), Amount::ZERO, Utc::now()),
            Err(AmmError::InvalidAmount)
        );
        assert_eq!(
            ledger.remove_liquidity(&deployer(), Shares::ZERO, Utc::now()),
            Err(AmmError::InvalidAmount)
        );
    }

    #[test]
    fn swap_on_empty_pool_fails() {
        let mut ledger = PoolLedger::new();
        assert_eq!(
            ledger.swap_token1(&deployer(), Amount::new(10), Utc::now()),
            Err(AmmError::EmptyPool)
        );
    }

    #[test]
    fn deposit_too_small_to_mint_is_rejected() {
        let mut ledger = PoolLedger::new();
        let big = Amount::new(1_000_000_000_000_000_000_000_000);
        let _ = ledger.add_liquidity(&deployer(), big, big, Utc::now());
        // 1 * 100e18 / 1e24 truncates to zero shares.
        assert_eq!(
            ledger.add_liquidity(&provider(), Amount::new(1), Amount::new(1), Utc::now()),
            Err(AmmError::InvalidAmount)
        );
    }

    #[test]
    fn deposit_then_full_withdraw_round_trips() {
        let mut ledger = scenario_b();
        let reserves_before = ledger.reserves();

        let Ok(deposit) = ledger.add_liquidity(
            &HolderId::new("0xthird"),
            Amount::new(30_000),
            Amount::new(30_000),
            Utc::now(),
        ) else {
            panic!("deposit failed");
        };
        let Ok(withdraw) =
            ledger.remove_liquidity(&HolderId::new("0xthird"), deposit.shares, Utc::now())
        else {
            panic!("withdraw failed");
        };
        assert_eq!(withdraw.amount1, Amount::new(30_000));
        assert_eq!(withdraw.amount2, Amount::new(30_000));
        assert_eq!(ledger.reserves(), reserves_before);
        assert_eq!(ledger.shares_of(&HolderId::new("0xthird")), Shares::ZERO);
        assert_eq!(ledger.holders().count(), 2);
    }

    #[test]
    fn withdraw_everything_empties_the_pool() {
        let mut ledger = scenario_b();
        let _ = ledger.swap_token2(&provider(), Amount::new(777), Utc::now());
        let Ok(_) = ledger.remove_liquidity(&deployer(), shares(100), Utc::now()) else {
            panic!("withdraw failed");
        };
        let Ok(_) = ledger.remove_liquidity(&provider(), shares(50), Utc::now()) else {
            panic!("withdraw failed");
        };
        assert!(ledger.is_empty());
        assert_eq!(ledger.reserves(), Reserves::EMPTY);
        assert_invariants(&ledger);
    }

    #[test]
    fn withdraw_quote_matches_execution() {
        let mut ledger = scenario_b();
        let _ = ledger.swap_token1(&deployer(), Amount::new(12_345), Utc::now());
        let Ok(quoted) = ledger.calculate_token_withdraw(shares(50)) else {
            panic!("quote failed");
        };
        let Ok(event) = ledger.remove_liquidity(&provider(), shares(50), Utc::now()) else {
            panic!("withdraw failed");
        };
        assert_eq!((event.amount1, event.amount2), quoted);
    }

    #[test]
    fn repeated_swaps_yield_diminishing_output() {
        let mut ledger = scenario_b();
        let mut previous = None;
        for _ in 0..10 {
            let Ok(event) = ledger.swap_token1(&provider(), Amount::new(10_000), Utc::now()) else {
                panic!("swap failed");
            };
            if let Some(prev) = previous {
                assert!(event.amount_received < prev);
            }
            previous = Some(event.amount_received);
        }
    }

    #[test]
    fn every_mutation_appends_one_event() {
        let mut ledger = scenario_b();
        let _ = ledger.swap_token2(&provider(), Amount::new(100), Utc::now());
        let _ = ledger.remove_liquidity(&provider(), shares(10), Utc::now());
        let kinds: Vec<&str> = ledger.events().iter().map(LedgerEvent::kind_str).collect();
        assert_eq!(kinds, vec!["deposit", "deposit", "swap", "withdraw"]);
    }

    #[test]
    fn snapshot_restore_round_trip() {
        let mut ledger = scenario_b();
        let _ = ledger.swap_token1(&provider(), Amount::new(500), Utc::now());
        let snapshot = ledger.snapshot();
        let Ok(restored) = PoolLedger::restore(snapshot.clone()) else {
            panic!("restore failed");
        };
        assert_eq!(restored.reserves(), ledger.reserves());
        assert_eq!(restored.snapshot().shares, snapshot.shares);
        assert_eq!(restored.snapshot().event_count, 0);
        assert!(restored.events().is_empty());
    }

    fn history(ledger: &PoolLedger) -> Vec<LedgerEvent> {
        ledger.events().iter().cloned().collect()
    }

    #[test]
    fn restore_with_events_rehydrates_the_log() {
        let mut ledger = scenario_b();
        let _ = ledger.swap_token1(&provider(), Amount::new(500), Utc::now());
        let Ok(restored) =
            PoolLedger::restore_with_events(ledger.snapshot(), history(&ledger))
        else {
            panic!("restore failed");
        };
        assert_eq!(restored.snapshot(), ledger.snapshot());
        assert_eq!(restored.events(), ledger.events());
    }

    #[test]
    fn restore_with_events_replays_records_after_the_snapshot() {
        let mut ledger = scenario_b();
        let stale = ledger.snapshot();
        let _ = ledger.swap_token2(&deployer(), Amount::new(4_000), Utc::now());
        let _ = ledger.remove_liquidity(&provider(), shares(20), Utc::now());
        let Ok(amount2) = ledger.calculate_token2_deposit(Amount::new(10_000)) else {
            panic!("quote failed");
        };
        let deposit =
            ledger.add_liquidity(&HolderId::new("0xthird"), Amount::new(10_000), amount2, Utc::now());
        assert!(deposit.is_ok());
        let _ = ledger.swap_token1(&provider(), Amount::new(1_234), Utc::now());
        assert_eq!(ledger.events().len(), 6);

        let Ok(restored) = PoolLedger::restore_with_events(stale, history(&ledger)) else {
            panic!("replay failed");
        };
        assert_eq!(restored.snapshot(), ledger.snapshot());
        assert_eq!(restored.events(), ledger.events());
        assert_invariants(&restored);
    }

    #[test]
    fn restore_with_events_rejects_a_broken_chain() {
        let mut ledger = scenario_b();
        let stale = ledger.snapshot();
        let _ = ledger.swap_token1(&provider(), Amount::new(500), Utc::now());
        let mut records = history(&ledger);
        if let Some(LedgerEvent::Swap(swap)) = records.last_mut() {
            swap.amount_received = Amount::new(1);
        } else {
            panic!("expected a swap record");
        }
        assert!(matches!(
            PoolLedger::restore_with_events(stale, records),
            Err(AmmError::InconsistentState(_))
        ));
    }

    #[test]
    fn restore_rejects_inconsistent_snapshots() {
        let mut snapshot = scenario_b().snapshot();
        snapshot.total_shares = shares(151);
        assert!(matches!(
            PoolLedger::restore(snapshot),
            Err(AmmError::InconsistentState(_))
        ));

        let snapshot = LedgerSnapshot {
            reserve1: Amount::new(10),
            reserve2: Amount::ZERO,
            total_shares: Shares::ZERO,
            shares: BTreeMap::new(),
            event_count: 0,
        };
        assert!(matches!(
            PoolLedger::restore(snapshot),
            Err(AmmError::InconsistentState(_))
        ));
    }
}
