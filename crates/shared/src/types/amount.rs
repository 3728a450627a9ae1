//! Hygiene helpers for decimal money amounts.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All amounts in the system are `rust_decimal::Decimal`, stored as
//! `NUMERIC(14, 2)`. Comparisons are exact: there is no rounding epsilon
//! anywhere in the reconciliation paths.

use rust_decimal::Decimal;

/// Maximum number of decimal places an amount may carry.
pub const MAX_SCALE: u32 = 2;

/// Returns true if the amount has at most [`MAX_SCALE`] decimal places.
///
/// Amounts arriving over the API are rejected rather than silently
/// rounded when they carry sub-cent precision.
#[must_use]
pub fn has_valid_scale(amount: Decimal) -> bool {
    amount.normalize().scale() <= MAX_SCALE
}

/// Returns true if the amount is strictly positive.
#[must_use]
pub fn is_positive(amount: Decimal) -> bool {
    amount > Decimal::ZERO
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(100), true)]
    #[case(dec!(100.5), true)]
    #[case(dec!(100.55), true)]
    #[case(dec!(100.550), true)] // trailing zeros normalize away
    #[case(dec!(100.555), false)]
    #[case(dec!(0.001), false)]
    #[case(dec!(-3.141), false)]
    fn test_scale_validation(#[case] amount: Decimal, #[case] valid: bool) {
        assert_eq!(has_valid_scale(amount), valid);
    }

    #[rstest]
    #[case(dec!(0.01), true)]
    #[case(dec!(1500), true)]
    #[case(dec!(0), false)]
    #[case(dec!(-0.01), false)]
    fn test_positivity(#[case] amount: Decimal, #[case] positive: bool) {
        assert_eq!(is_positive(amount), positive);
    }
}
