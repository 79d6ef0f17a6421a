//! Quote engine: pure functions of the current reserves.
//!
//! Every function here is a read-only computation over a [`Reserves`]
//! value and one caller-supplied quantity. The pool ledger calls the very
//! same functions when it executes a mutation, so a quote taken against
//! unchanged reserves always equals the executed result bit for bit.
//!
//! Rounding is truncating integer division throughout, which always
//! favors the pool over the trader or depositor.

use serde::{Deserialize, Serialize};

use super::math::{U256, mul_div, narrow};
use super::{AmmError, Amount, Shares, UNIT};

/// Which of the pool's two tokens an operation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenSide {
    /// The first token (`reserve1`).
    Token1,
    /// The second token (`reserve2`).
    Token2,
}

impl TokenSide {
    /// Returns the opposite token.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Token1 => Self::Token2,
            Self::Token2 => Self::Token1,
        }
    }

    /// Returns the side as a static string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Token1 => "token1",
            Self::Token2 => "token2",
        }
    }
}

/// The pool's two reserve balances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reserves {
    /// Balance of token1 held by the pool.
    pub reserve1: Amount,
    /// Balance of token2 held by the pool.
    pub reserve2: Amount,
}

impl Reserves {
    /// Reserves of a pool that has never been funded.
    pub const EMPTY: Self = Self {
        reserve1: Amount::ZERO,
        reserve2: Amount::ZERO,
    };

    /// Creates a reserve pair.
    #[must_use]
    pub const fn new(reserve1: Amount, reserve2: Amount) -> Self {
        Self { reserve1, reserve2 }
    }

    /// Returns `true` when either reserve is zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.reserve1.is_zero() || self.reserve2.is_zero()
    }

    /// Returns the reserve of the given token.
    #[must_use]
    pub const fn of(&self, side: TokenSide) -> Amount {
        match side {
            TokenSide::Token1 => self.reserve1,
            TokenSide::Token2 => self.reserve2,
        }
    }

    /// The constant-product invariant `K = reserve1 * reserve2`.
    #[must_use]
    pub fn invariant(&self) -> U256 {
        U256::from(self.reserve1.get()) * U256::from(self.reserve2.get())
    }
}

/// Token2 required to deposit `amount1` of token1 at the current ratio:
/// `reserve2 * amount1 / reserve1`.
///
/// # Errors
///
/// - [`AmmError::InvalidAmount`] if `amount1` is zero.
/// - [`AmmError::EmptyPool`] if the pool holds no reserves; the first
///   deposit sets the ratio instead.
/// - [`AmmError::Overflow`] if the result exceeds `u128`.
pub fn token2_deposit(reserves: Reserves, amount1: Amount) -> Result<Amount, AmmError> {
    proportional(amount1, reserves.reserve2, reserves.reserve1)
}

/// Token1 required to deposit `amount2` of token2 at the current ratio:
/// `reserve1 * amount2 / reserve2`.
///
/// # Errors
///
/// Same as [`token2_deposit`].
pub fn token1_deposit(reserves: Reserves, amount2: Amount) -> Result<Amount, AmmError> {
    proportional(amount2, reserves.reserve1, reserves.reserve2)
}

fn proportional(amount: Amount, numerator: Amount, denominator: Amount) -> Result<Amount, AmmError> {
    if amount.is_zero() {
        return Err(AmmError::InvalidAmount);
    }
    if numerator.is_zero() || denominator.is_zero() {
        return Err(AmmError::EmptyPool);
    }
    mul_div(numerator.get(), amount.get(), denominator.get())
        .map(Amount::new)
        .ok_or(AmmError::Overflow)
}

/// Output of selling `amount_in` of token1 for token2.
///
/// `newReserve2 = K / (reserve1 + amount_in)`, `out = reserve2 - newReserve2`.
///
/// # Errors
///
/// See [`swap_output`].
pub fn token1_swap(reserves: Reserves, amount_in: Amount) -> Result<Amount, AmmError> {
    swap_output(reserves, TokenSide::Token1, amount_in)
}

/// Output of selling `amount_in` of token2 for token1. Mirror of [`token1_swap`].
///
/// # Errors
///
/// See [`swap_output`].
pub fn token2_swap(reserves: Reserves, amount_in: Amount) -> Result<Amount, AmmError> {
    swap_output(reserves, TokenSide::Token2, amount_in)
}

/// Output of selling `amount_in` of `side` for the other token.
///
/// # Errors
///
/// - [`AmmError::InvalidAmount`] if `amount_in` is zero.
/// - [`AmmError::EmptyPool`] if either reserve is zero.
/// - [`AmmError::Overflow`] if `reserve_in + amount_in` exceeds `u128`.
/// - [`AmmError::InsufficientLiquidity`] if the output would be zero or
///   would drain the output reserve.
pub fn swap_output(reserves: Reserves, side: TokenSide, amount_in: Amount) -> Result<Amount, AmmError> {
    if amount_in.is_zero() {
        return Err(AmmError::InvalidAmount);
    }
    if reserves.is_empty() {
        return Err(AmmError::EmptyPool);
    }
    let reserve_in = reserves.of(side).get();
    let reserve_out = reserves.of(side.other()).get();

    let new_in = reserve_in
        .checked_add(amount_in.get())
        .ok_or(AmmError::Overflow)?;
    let new_out =
        narrow(reserves.invariant() / U256::from(new_in)).ok_or(AmmError::Overflow)?;
    let out = reserve_out
        .checked_sub(new_out)
        .ok_or(AmmError::InsufficientLiquidity)?;

    if out == 0 || out >= reserve_out {
        return Err(AmmError::InsufficientLiquidity);
    }
    Ok(Amount::new(out))
}

/// Token amounts returned for burning `share_amount` out of `total_shares`:
/// `reserve * share_amount / total_shares` for each side.
///
/// # Errors
///
/// - [`AmmError::InvalidAmount`] if `share_amount` is zero.
/// - [`AmmError::EmptyPool`] if no shares exist.
/// - [`AmmError::InsufficientShares`] if `share_amount > total_shares`.
pub fn withdraw(
    reserves: Reserves,
    total_shares: Shares,
    share_amount: Shares,
) -> Result<(Amount, Amount), AmmError> {
    if share_amount.is_zero() {
        return Err(AmmError::InvalidAmount);
    }
    if total_shares.is_zero() {
        return Err(AmmError::EmptyPool);
    }
    if share_amount > total_shares {
        return Err(AmmError::InsufficientShares {
            requested: share_amount,
            available: total_shares,
        });
    }
    let amount1 = mul_div(reserves.reserve1.get(), share_amount.get(), total_shares.get())
        .ok_or(AmmError::Overflow)?;
    let amount2 = mul_div(reserves.reserve2.get(), share_amount.get(), total_shares.get())
        .ok_or(AmmError::Overflow)?;
    Ok((Amount::new(amount1), Amount::new(amount2)))
}

/// Shares minted for depositing `amount1` into a funded pool:
/// `amount1 * total_shares / reserve1`.
///
/// # Errors
///
/// - [`AmmError::EmptyPool`] if `reserve1` is zero.
/// - [`AmmError::Overflow`] if the result exceeds `u128`.
pub fn deposit_shares(
    reserves: Reserves,
    total_shares: Shares,
    amount1: Amount,
) -> Result<Shares, AmmError> {
    if reserves.reserve1.is_zero() {
        return Err(AmmError::EmptyPool);
    }
    mul_div(amount1.get(), total_shares.get(), reserves.reserve1.get())
        .map(Shares::new)
        .ok_or(AmmError::Overflow)
}

/// Price of one token1 in token2 (`reserve2 / reserve1`), 18 decimals.
///
/// Returns `None` for an empty pool or a price above `u128`.
#[must_use]
pub fn spot_price(reserves: Reserves) -> Option<Amount> {
    if reserves.is_empty() {
        return None;
    }
    mul_div(reserves.reserve2.get(), UNIT, reserves.reserve1.get()).map(Amount::new)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn reserves(r1: u128, r2: u128) -> Reserves {
        Reserves::new(Amount::new(r1), Amount::new(r2))
    }

    #[test]
    fn token2_deposit_follows_ratio() {
        assert_eq!(
            token2_deposit(reserves(100_000, 100_000), Amount::new(50_000)),
            Ok(Amount::new(50_000))
        );
        assert_eq!(
            token2_deposit(reserves(3, 2), Amount::new(2)),
            Ok(Amount::new(1))
        );
    }

    #[test]
    fn token1_deposit_is_the_mirror() {
        assert_eq!(
            token1_deposit(reserves(200, 100), Amount::new(10)),
            Ok(Amount::new(20))
        );
    }

    #[test]
    fn deposit_quote_on_empty_pool_fails() {
        assert_eq!(
            token2_deposit(Reserves::EMPTY, Amount::new(1)),
            Err(AmmError::EmptyPool)
        );
        assert_eq!(
            token1_deposit(Reserves::EMPTY, Amount::new(1)),
            Err(AmmError::EmptyPool)
        );
    }

    #[test]
    fn zero_inputs_rejected() {
        let r = reserves(10, 10);
        assert_eq!(token2_deposit(r, Amount::ZERO), Err(AmmError::InvalidAmount));
        assert_eq!(token1_swap(r, Amount::ZERO), Err(AmmError::InvalidAmount));
        assert_eq!(
            withdraw(r, Shares::new(10), Shares::ZERO),
            Err(AmmError::InvalidAmount)
        );
    }

    #[test]
    fn token1_swap_matches_constant_product() {
        let r = reserves(150_000, 150_000);
        let k = 150_000u128 * 150_000;
        let expected = 150_000 - k / 150_001;
        assert_eq!(token1_swap(r, Amount::new(1)), Ok(Amount::new(expected)));
    }

    #[test]
    fn token2_swap_is_symmetric() {
        let r = reserves(1_000, 4_000);
        let Ok(out) = token2_swap(r, Amount::new(1_000)) else {
            panic!("expected Ok");
        };
        // K = 4_000_000, new reserve2 = 5_000, new reserve1 = 800
        assert_eq!(out, Amount::new(200));
    }

    #[test]
    fn swap_moves_along_the_curve() {
        let r = reserves(1_000_003, 777_777);
        for amount_in in [1u128, 7, 999, 123_456, 9_999_999] {
            let Ok(out) = token1_swap(r, Amount::new(amount_in)) else {
                panic!("expected Ok for {amount_in}");
            };
            let new_in = 1_000_003 + amount_in;
            let after = reserves(new_in, 777_777 - out.get());
            // Truncating K / new_in can only shave less than one unit of
            // reserve2, so K drifts down by less than new_in.
            assert!(after.invariant() <= r.invariant());
            assert!(r.invariant() - after.invariant() < U256::from(new_in));
        }
    }

    #[test]
    fn tiny_swap_still_pays_out() {
        let r = reserves(1_000_000, 10);
        assert_eq!(token1_swap(r, Amount::new(1)), Ok(Amount::new(1)));
    }

    #[test]
    fn swap_draining_the_pool_is_rejected() {
        let r = reserves(10, 10);
        // K = 100; any input above 90 leaves K / (10 + in) == 0.
        assert_eq!(
            token1_swap(r, Amount::new(1_000)),
            Err(AmmError::InsufficientLiquidity)
        );
    }

    #[test]
    fn swap_on_empty_pool_fails() {
        assert_eq!(
            token2_swap(Reserves::EMPTY, Amount::new(5)),
            Err(AmmError::EmptyPool)
        );
    }

    #[test]
    fn swap_input_overflow() {
        let r = reserves(u128::MAX, 10);
        assert_eq!(token1_swap(r, Amount::new(1)), Err(AmmError::Overflow));
    }

    #[test]
    fn withdraw_is_proportional() {
        let r = reserves(150_000, 300_000);
        assert_eq!(
            withdraw(r, Shares::new(150), Shares::new(50)),
            Ok((Amount::new(50_000), Amount::new(100_000)))
        );
    }

    #[test]
    fn withdraw_more_than_total_fails() {
        let r = reserves(10, 10);
        assert!(matches!(
            withdraw(r, Shares::new(5), Shares::new(6)),
            Err(AmmError::InsufficientShares { .. })
        ));
    }

    #[test]
    fn deposit_shares_truncate() {
        let r = reserves(3, 2);
        assert_eq!(
            deposit_shares(r, Shares::new(100), Amount::new(2)),
            Ok(Shares::new(66))
        );
    }

    #[test]
    fn spot_price_is_reserve_ratio() {
        assert_eq!(
            spot_price(reserves(2 * UNIT, 5 * UNIT)),
            Some(Amount::new(2_500_000_000_000_000_000))
        );
        assert_eq!(spot_price(Reserves::EMPTY), None);
    }

    #[test]
    fn token_side_other() {
        assert_eq!(TokenSide::Token1.other(), TokenSide::Token2);
        assert_eq!(TokenSide::Token2.other(), TokenSide::Token1);
        assert_eq!(TokenSide::Token2.as_str(), "token2");
    }
}
