//! Fixed-point token quantities and pool shares.
//!
//! Both [`Amount`] and [`Shares`] are `u128` counts of the smallest unit,
//! with [`DECIMALS`] fractional decimal places. All pool arithmetic is
//! integer arithmetic over these raw values; nothing here ever touches
//! floating point.
//!
//! On the wire both types serialize as decimal strings so that JSON
//! consumers do not lose precision above 2^53.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::AmmError;

/// Number of fractional decimal places in every quantity.
pub const DECIMALS: u32 = 18;

/// Raw value of one whole token (or one whole share): `10^DECIMALS`.
pub const UNIT: u128 = 1_000_000_000_000_000_000;

/// A token quantity in the smallest unit (18 decimals).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Amount(#[serde(with = "string_u128")] u128);

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Wraps a raw smallest-unit value.
    #[must_use]
    pub const fn new(raw: u128) -> Self {
        Self(raw)
    }

    /// Returns the raw smallest-unit value.
    #[must_use]
    pub const fn get(self) -> u128 {
        self.0
    }

    /// Returns `true` if the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Builds an amount from a whole number of tokens (`whole * 10^18`).
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the scaled value exceeds `u128`.
    pub fn from_whole(whole: u128) -> Result<Self, AmmError> {
        whole.checked_mul(UNIT).map(Self).ok_or(AmmError::Overflow)
    }

    /// Checked addition.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Checked subtraction.
    #[must_use]
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    /// Renders the amount as a decimal number of whole tokens, e.g.
    /// `1500000000000000000` becomes `"1.5"`.
    #[must_use]
    pub fn format_units(self) -> String {
        format_units(self.0)
    }

    /// Parses a decimal number of whole tokens, e.g. `"1.5"`, into raw units.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidAmount`] if the text is not a plain decimal
    ///   number or has more than 18 fractional digits.
    /// - [`AmmError::Overflow`] if the scaled value exceeds `u128`.
    pub fn parse_units(text: &str) -> Result<Self, AmmError> {
        parse_units(text).map(Self)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u128> for Amount {
    fn from(raw: u128) -> Self {
        Self(raw)
    }
}

/// A quantity of pool ownership shares (18 decimals).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Shares(#[serde(with = "string_u128")] u128);

impl Shares {
    /// The zero share balance.
    pub const ZERO: Self = Self(0);

    /// Shares minted by the first deposit into an empty pool: 100 whole shares.
    pub const INITIAL: Self = Self(100 * UNIT);

    /// Wraps a raw smallest-unit value.
    #[must_use]
    pub const fn new(raw: u128) -> Self {
        Self(raw)
    }

    /// Returns the raw smallest-unit value.
    #[must_use]
    pub const fn get(self) -> u128 {
        self.0
    }

    /// Returns `true` if the balance is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Builds a share count from a whole number of shares.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the scaled value exceeds `u128`.
    pub fn from_whole(whole: u128) -> Result<Self, AmmError> {
        whole.checked_mul(UNIT).map(Self).ok_or(AmmError::Overflow)
    }

    /// Checked addition.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Checked subtraction.
    #[must_use]
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    /// Renders the balance as a decimal number of whole shares.
    #[must_use]
    pub fn format_units(self) -> String {
        format_units(self.0)
    }
}

impl fmt::Display for Shares {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u128> for Shares {
    fn from(raw: u128) -> Self {
        Self(raw)
    }
}

fn parse_units(text: &str) -> Result<u128, AmmError> {
    let text = text.trim();
    let (whole, frac) = text.split_once('.').unwrap_or((text, ""));
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty())
        || !all_digits(whole)
        || !all_digits(frac)
        || frac.len() > DECIMALS as usize
    {
        return Err(AmmError::InvalidAmount);
    }

    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| AmmError::Overflow)?
    };
    let frac: u128 = if frac.is_empty() {
        0
    } else {
        let padded = format!("{frac:0<18}");
        padded.parse().map_err(|_| AmmError::InvalidAmount)?
    };
    whole
        .checked_mul(UNIT)
        .and_then(|w| w.checked_add(frac))
        .ok_or(AmmError::Overflow)
}

fn format_units(raw: u128) -> String {
    let whole = raw / UNIT;
    let frac = raw % UNIT;
    if frac == 0 {
        return whole.to_string();
    }
    let digits = format!("{frac:018}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

/// Serde adapter encoding a `u128` as a decimal string.
pub(crate) mod string_u128 {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|_| D::Error::custom(format!("invalid u128 string: {raw}")))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn from_whole_scales_by_unit() {
        let Ok(a) = Amount::from_whole(3) else {
            panic!("expected Ok");
        };
        assert_eq!(a.get(), 3 * UNIT);
    }

    #[test]
    fn from_whole_overflow_rejected() {
        assert_eq!(Amount::from_whole(u128::MAX), Err(AmmError::Overflow));
        assert_eq!(Shares::from_whole(u128::MAX / 10), Err(AmmError::Overflow));
    }

    #[test]
    fn initial_shares_are_one_hundred_whole() {
        assert_eq!(Shares::from_whole(100), Ok(Shares::INITIAL));
    }

    #[test]
    fn format_units_trims_trailing_zeros() {
        assert_eq!(Amount::new(1_500_000_000_000_000_000).format_units(), "1.5");
        assert_eq!(Amount::new(2 * UNIT).format_units(), "2");
        assert_eq!(Amount::new(1).format_units(), "0.000000000000000001");
        assert_eq!(Shares::ZERO.format_units(), "0");
    }

    #[test]
    fn parse_units_scales_decimals() {
        assert_eq!(Amount::parse_units("1.5"), Ok(Amount::new(1_500_000_000_000_000_000)));
        assert_eq!(Amount::parse_units("2"), Ok(Amount::new(2 * UNIT)));
        assert_eq!(Amount::parse_units(".000000000000000001"), Ok(Amount::new(1)));
        assert_eq!(Amount::parse_units("1.0000000000000000001"), Err(AmmError::InvalidAmount));
        assert_eq!(Amount::parse_units("1e3"), Err(AmmError::InvalidAmount));
        assert_eq!(Amount::parse_units(""), Err(AmmError::InvalidAmount));
        assert_eq!(
            Amount::parse_units("340282366920938463463374607431768211455"),
            Err(AmmError::Overflow)
        );
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&Amount::new(u128::MAX)).unwrap_or_default();
        assert_eq!(json, format!("\"{}\"", u128::MAX));
    }

    #[test]
    fn deserializes_from_string() {
        let parsed: Result<Shares, _> = serde_json::from_str("\"12345\"");
        let Ok(parsed) = parsed else {
            panic!("expected Ok");
        };
        assert_eq!(parsed, Shares::new(12_345));

        let bad: Result<Amount, _> = serde_json::from_str("\"-1\"");
        assert!(bad.is_err());
    }

    #[test]
    fn checked_ops() {
        assert_eq!(Amount::new(u128::MAX).checked_add(Amount::new(1)), None);
        assert_eq!(Amount::ZERO.checked_sub(Amount::new(1)), None);
        assert_eq!(
            Shares::new(5).checked_sub(Shares::new(2)),
            Some(Shares::new(3))
        );
    }
}
