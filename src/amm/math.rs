//! Wide-integer helpers for products of two `u128` quantities.

#[allow(missing_docs)]
mod wide {
    use uint::construct_uint;

    construct_uint! {
        /// 256-bit unsigned integer for intermediate products.
        pub struct U256(4);
    }
}

pub use wide::U256;

/// Computes `a * b / denominator` with a 256-bit intermediate, truncating.
///
/// Returns `None` when `denominator` is zero or the quotient does not fit
/// in `u128`.
pub(crate) fn mul_div(a: u128, b: u128, denominator: u128) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    let quotient = U256::from(a) * U256::from(b) / U256::from(denominator);
    narrow(quotient)
}

/// Narrows a 256-bit value back to `u128`, or `None` if it does not fit.
pub(crate) fn narrow(value: U256) -> Option<u128> {
    if value > U256::from(u128::MAX) {
        None
    } else {
        Some(value.low_u128())
    }
}
