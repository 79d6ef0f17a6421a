//! Pool service: orchestrates pool operations and emits events.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::amm::math::mul_div;
use crate::amm::{
    Amount, DepositEvent, HolderId, LedgerEvent, LedgerSnapshot, PoolLedger, Shares, SwapEvent,
    TokenSide, UNIT, WithdrawEvent,
};
use crate::domain::pool_entry::{PoolEntry, PoolMetadata, PoolSummary, TokenInfo};
use crate::domain::{EventBus, PoolEvent, PoolId, PoolRegistry};
use crate::error::GatewayError;

/// Read-only view of a pool's full state.
#[derive(Debug, Clone, Serialize)]
pub struct PoolState {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Optional pool name.
    pub name: Option<String>,
    /// Token held in `reserve1`.
    pub token1: TokenInfo,
    /// Token held in `reserve2`.
    pub token2: TokenInfo,
    /// Token1 reserve.
    pub reserve1: Amount,
    /// Token2 reserve.
    pub reserve2: Amount,
    /// `reserve1 * reserve2` as a decimal string.
    pub invariant: String,
    /// Shares outstanding.
    pub total_shares: Shares,
    /// Token1 priced in token2 (18 decimals); `None` while empty.
    pub spot_price: Option<Amount>,
    /// Number of holders with a non-zero balance.
    pub holder_count: usize,
    /// Number of entries in the event log.
    pub event_count: usize,
    /// Swaps executed so far.
    pub swap_count: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last committed mutation.
    pub last_modified_at: DateTime<Utc>,
}

impl From<&PoolEntry> for PoolState {
    fn from(entry: &PoolEntry) -> Self {
        Self {
            pool_id: entry.pool_id,
            name: entry.name.clone(),
            token1: entry.token1.clone(),
            token2: entry.token2.clone(),
            reserve1: entry.ledger.reserve1(),
            reserve2: entry.ledger.reserve2(),
            invariant: entry.ledger.invariant().to_string(),
            total_shares: entry.ledger.total_shares(),
            spot_price: entry.ledger.spot_price(),
            holder_count: entry.ledger.holders().count(),
            event_count: entry.ledger.events().len(),
            swap_count: entry.swap_count,
            created_at: entry.created_at,
            last_modified_at: entry.last_modified_at,
        }
    }
}

/// Result of a read-only swap quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapQuote {
    /// Token sold.
    pub token_in: TokenSide,
    /// Amount sold.
    pub amount_in: Amount,
    /// Amount the pool would pay out.
    pub amount_out: Amount,
    /// `amount_out / amount_in`, 18 decimals.
    pub execution_price: Amount,
    /// Token1 price before the swap.
    pub spot_price_before: Option<Amount>,
    /// Token1 price after the swap.
    pub spot_price_after: Option<Amount>,
    /// Signed change of the token1 price in basis points.
    pub price_impact_bps: i64,
}

/// Which side of a deposit the caller fixed when asking for a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepositSide {
    /// Caller supplies token1; the quote fills in token2.
    Amount1(Amount),
    /// Caller supplies token2; the quote fills in token1.
    Amount2(Amount),
}

/// Result of a read-only deposit quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositQuote {
    /// Token1 to deposit.
    pub amount1: Amount,
    /// Token2 to deposit.
    pub amount2: Amount,
    /// Shares the deposit would mint.
    pub shares: Shares,
}

/// Orchestration layer for all pool operations.
///
/// Stateless coordinator: owns references to [`PoolRegistry`] for state
/// and [`EventBus`] for event emission. Every mutation follows the
/// pattern: acquire the pool's write lock → call the ledger → update
/// metadata → publish the event → release.
#[derive(Debug, Clone)]
pub struct PoolService {
    registry: Arc<PoolRegistry>,
    event_bus: EventBus,
}

impl PoolService {
    /// Creates a new `PoolService`.
    #[must_use]
    pub fn new(registry: Arc<PoolRegistry>, event_bus: EventBus) -> Self {
        Self {
            registry,
            event_bus,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the inner [`PoolRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<PoolRegistry> {
        &self.registry
    }

    /// Creates a new empty pool for the given token pair.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if a token is missing its
    /// address or symbol, both tokens share an address or symbol, or a
    /// symbol collides with a side name (`token1`, `token2`).
    pub async fn create_pool(
        &self,
        token1: TokenInfo,
        token2: TokenInfo,
        name: Option<String>,
    ) -> Result<PoolId, GatewayError> {
        validate_token("token1", &token1)?;
        validate_token("token2", &token2)?;
        if token1.address.eq_ignore_ascii_case(&token2.address) {
            return Err(GatewayError::InvalidRequest(
                "token1 and token2 must be different tokens".to_string(),
            ));
        }
        if token1.symbol.eq_ignore_ascii_case(&token2.symbol) {
            return Err(GatewayError::InvalidRequest(
                "token1 and token2 must have different symbols".to_string(),
            ));
        }

        let pool_id = PoolId::new();
        let entry = PoolEntry::new(pool_id, token1.clone(), token2.clone(), name);
        self.registry.insert(entry).await?;

        let _ = self.event_bus.publish(PoolEvent::PoolCreated {
            pool_id,
            token1: token1.clone(),
            token2: token2.clone(),
            timestamp: Utc::now(),
        });

        tracing::info!(%pool_id, token1 = %token1.symbol, token2 = %token2.symbol, "pool created");
        Ok(pool_id)
    }

    /// Re-inserts a pool rebuilt from a persisted snapshot and the pool's
    /// stored event history (append order).
    ///
    /// Records newer than the snapshot are replayed onto it, so the pool
    /// comes back with its latest state and its full event log.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the snapshot or the history is
    /// inconsistent, or the pool ID is already registered.
    pub async fn restore_pool(
        &self,
        pool_id: PoolId,
        snapshot: LedgerSnapshot,
        metadata: PoolMetadata,
        history: Vec<LedgerEvent>,
    ) -> Result<(), GatewayError> {
        let replayed_swaps = history
            .iter()
            .skip(snapshot.event_count.min(history.len()))
            .filter(|e| matches!(e, LedgerEvent::Swap(_)))
            .count();
        let ledger = PoolLedger::restore_with_events(snapshot, history)?;
        let last_event_at = ledger
            .events()
            .chronological()
            .last()
            .map(|e| e.timestamp());
        let mut entry =
            PoolEntry::with_ledger(pool_id, ledger, metadata.token1, metadata.token2, metadata.name);
        entry.created_at = metadata.created_at;
        entry.last_modified_at = last_event_at.unwrap_or(metadata.created_at);
        entry.swap_count = metadata
            .swap_count
            .saturating_add(u64::try_from(replayed_swaps).unwrap_or(u64::MAX));
        self.registry.insert(entry).await?;
        tracing::info!(%pool_id, replayed_swaps, "pool restored from snapshot");
        Ok(())
    }

    /// Removes a pool from the registry.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PoolNotFound`] if the pool does not exist.
    pub async fn remove_pool(&self, pool_id: PoolId) -> Result<(), GatewayError> {
        self.registry.remove(pool_id).await?;

        let _ = self.event_bus.publish(PoolEvent::PoolRemoved {
            pool_id,
            timestamp: Utc::now(),
        });

        tracing::info!(%pool_id, "pool removed");
        Ok(())
    }

    /// Returns summaries of all pools, optionally filtered by token symbol.
    pub async fn list_pools(&self, symbol_filter: Option<&str>) -> Vec<PoolSummary> {
        self.registry.list(symbol_filter).await
    }

    /// Returns the full state of a pool.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PoolNotFound`] if the pool does not exist.
    pub async fn pool_state(&self, pool_id: PoolId) -> Result<PoolState, GatewayError> {
        let handle = self.registry.get(pool_id).await?;
        let entry = handle.read().await;
        Ok(PoolState::from(&*entry))
    }

    /// Returns `(holder balance, total shares)` for a pool.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PoolNotFound`] if the pool does not exist.
    pub async fn shares_of(
        &self,
        pool_id: PoolId,
        holder: &HolderId,
    ) -> Result<(Shares, Shares), GatewayError> {
        let handle = self.registry.get(pool_id).await?;
        let entry = handle.read().await;
        Ok((entry.ledger.shares_of(holder), entry.ledger.total_shares()))
    }

    /// Deposits liquidity on behalf of `holder`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PoolNotFound`], [`GatewayError::InvalidRequest`]
    /// for an empty holder, or the ledger's rejection.
    pub async fn add_liquidity(
        &self,
        pool_id: PoolId,
        holder: &HolderId,
        amount1: Amount,
        amount2: Amount,
    ) -> Result<DepositEvent, GatewayError> {
        validate_holder(holder)?;
        let handle = self.registry.get(pool_id).await?;
        let mut entry = handle.write().await;

        let record = entry
            .ledger
            .add_liquidity(holder, amount1, amount2, Utc::now())?;
        entry.last_modified_at = record.timestamp;

        tracing::debug!(
            %pool_id,
            %holder,
            amount1 = %record.amount1,
            amount2 = %record.amount2,
            shares = %record.shares,
            "liquidity added"
        );
        self.publish(pool_id, record.clone().into());
        Ok(record)
    }

    /// Burns `shares` of `holder` and pays out the proportional reserves.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PoolNotFound`], [`GatewayError::InvalidRequest`]
    /// for an empty holder, or the ledger's rejection.
    pub async fn remove_liquidity(
        &self,
        pool_id: PoolId,
        holder: &HolderId,
        shares: Shares,
    ) -> Result<WithdrawEvent, GatewayError> {
        validate_holder(holder)?;
        let handle = self.registry.get(pool_id).await?;
        let mut entry = handle.write().await;

        let record = entry.ledger.remove_liquidity(holder, shares, Utc::now())?;
        entry.last_modified_at = record.timestamp;

        tracing::debug!(
            %pool_id,
            %holder,
            amount1 = %record.amount1,
            amount2 = %record.amount2,
            shares = %record.shares,
            "liquidity removed"
        );
        self.publish(pool_id, record.clone().into());
        Ok(record)
    }

    /// Sells `amount_in` of `token_in`.
    ///
    /// When `min_amount_out` is set the swap is rejected, without touching
    /// state, if the output would fall below it.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PoolNotFound`], [`GatewayError::InvalidRequest`]
    /// for an empty holder, [`GatewayError::SlippageExceeded`], or the
    /// ledger's rejection.
    pub async fn swap(
        &self,
        pool_id: PoolId,
        holder: &HolderId,
        token_in: TokenSide,
        amount_in: Amount,
        min_amount_out: Option<Amount>,
    ) -> Result<SwapEvent, GatewayError> {
        validate_holder(holder)?;
        let handle = self.registry.get(pool_id).await?;
        let mut entry = handle.write().await;

        if let Some(min_amount_out) = min_amount_out {
            let amount_out = entry.ledger.calculate_swap(token_in, amount_in)?;
            if amount_out < min_amount_out {
                return Err(GatewayError::SlippageExceeded {
                    amount_out,
                    min_amount_out,
                });
            }
        }

        let record = entry
            .ledger
            .swap(holder, token_in, amount_in, Utc::now())?;
        entry.swap_count = entry.swap_count.saturating_add(1);
        entry.last_modified_at = record.timestamp;

        tracing::debug!(
            %pool_id,
            %holder,
            token_in = token_in.as_str(),
            amount_in = %record.amount_given,
            amount_out = %record.amount_received,
            "swap executed"
        );
        self.publish(pool_id, record.clone().into());
        Ok(record)
    }

    /// Quotes a swap without mutating the pool.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PoolNotFound`] or the quote engine's rejection.
    pub async fn quote_swap(
        &self,
        pool_id: PoolId,
        token_in: TokenSide,
        amount_in: Amount,
    ) -> Result<SwapQuote, GatewayError> {
        let handle = self.registry.get(pool_id).await?;
        let entry = handle.read().await;
        let ledger = &entry.ledger;

        let amount_out = ledger.calculate_swap(token_in, amount_in)?;
        let before = ledger.reserves();
        let after = match token_in {
            TokenSide::Token1 => crate::amm::Reserves::new(
                Amount::new(before.reserve1.get().saturating_add(amount_in.get())),
                Amount::new(before.reserve2.get().saturating_sub(amount_out.get())),
            ),
            TokenSide::Token2 => crate::amm::Reserves::new(
                Amount::new(before.reserve1.get().saturating_sub(amount_out.get())),
                Amount::new(before.reserve2.get().saturating_add(amount_in.get())),
            ),
        };
        let spot_price_before = crate::amm::quote::spot_price(before);
        let spot_price_after = crate::amm::quote::spot_price(after);

        Ok(SwapQuote {
            token_in,
            amount_in,
            amount_out,
            execution_price: Amount::new(
                mul_div(amount_out.get(), UNIT, amount_in.get()).unwrap_or(u128::MAX),
            ),
            spot_price_before,
            spot_price_after,
            price_impact_bps: price_change_bps(spot_price_before, spot_price_after),
        })
    }

    /// Quotes the counterpart amount and minted shares for a deposit.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PoolNotFound`] or the quote engine's rejection
    /// (notably [`crate::amm::AmmError::EmptyPool`] before the first deposit).
    pub async fn quote_deposit(
        &self,
        pool_id: PoolId,
        side: DepositSide,
    ) -> Result<DepositQuote, GatewayError> {
        let handle = self.registry.get(pool_id).await?;
        let entry = handle.read().await;
        let ledger = &entry.ledger;

        let (amount1, amount2) = match side {
            DepositSide::Amount1(amount1) => (amount1, ledger.calculate_token2_deposit(amount1)?),
            DepositSide::Amount2(amount2) => (ledger.calculate_token1_deposit(amount2)?, amount2),
        };
        let shares =
            crate::amm::quote::deposit_shares(ledger.reserves(), ledger.total_shares(), amount1)?;
        Ok(DepositQuote {
            amount1,
            amount2,
            shares,
        })
    }

    /// Quotes the payout for burning `shares`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PoolNotFound`] or the quote engine's rejection.
    pub async fn quote_withdraw(
        &self,
        pool_id: PoolId,
        shares: Shares,
    ) -> Result<(Amount, Amount), GatewayError> {
        let handle = self.registry.get(pool_id).await?;
        let entry = handle.read().await;
        Ok(entry.ledger.calculate_token_withdraw(shares)?)
    }

    /// Returns the pool's event log in chronological order, optionally
    /// restricted to events strictly after `since`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PoolNotFound`] if the pool does not exist.
    pub async fn events(
        &self,
        pool_id: PoolId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<LedgerEvent>, GatewayError> {
        let handle = self.registry.get(pool_id).await?;
        let entry = handle.read().await;
        let log = entry.ledger.events();
        let events = match since {
            Some(after) => log.since(after),
            None => log.chronological(),
        };
        Ok(events.into_iter().cloned().collect())
    }

    /// Captures a snapshot of every pool for persistence.
    pub async fn snapshots(&self) -> Vec<(PoolId, LedgerSnapshot, PoolMetadata)> {
        let mut out = Vec::new();
        for (pool_id, handle) in self.registry.handles().await {
            let entry = handle.read().await;
            out.push((pool_id, entry.ledger.snapshot(), entry.metadata()));
        }
        out
    }

    /// Publishes while the caller still holds the pool's write lock, so
    /// subscribers observe each pool's events in commit order.
    fn publish(&self, pool_id: PoolId, event: LedgerEvent) {
        let _ = self
            .event_bus
            .publish(PoolEvent::from_ledger(pool_id, event));
    }
}

fn validate_token(label: &str, token: &TokenInfo) -> Result<(), GatewayError> {
    if token.address.trim().is_empty() {
        return Err(GatewayError::InvalidRequest(format!(
            "{label} address must not be empty"
        )));
    }
    if token.symbol.trim().is_empty() {
        return Err(GatewayError::InvalidRequest(format!(
            "{label} symbol must not be empty"
        )));
    }
    let reserved = [TokenSide::Token1, TokenSide::Token2]
        .iter()
        .any(|side| token.symbol.eq_ignore_ascii_case(side.as_str()));
    if reserved {
        return Err(GatewayError::InvalidRequest(format!(
            "{label} symbol {} is reserved",
            token.symbol
        )));
    }
    Ok(())
}

fn validate_holder(holder: &HolderId) -> Result<(), GatewayError> {
    if holder.as_str().trim().is_empty() {
        return Err(GatewayError::InvalidRequest(
            "holder must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Signed change between two fixed-point prices in basis points.
fn price_change_bps(before: Option<Amount>, after: Option<Amount>) -> i64 {
    let (Some(before), Some(after)) = (before, after) else {
        return 0;
    };
    let (before, after) = (before.get(), after.get());
    if before == 0 {
        return 0;
    }
    let magnitude = mul_div(before.abs_diff(after), 10_000, before)
        .and_then(|bps| i64::try_from(bps).ok())
        .unwrap_or(i64::MAX);
    if after >= before { magnitude } else { -magnitude }
}
