//! Common utility functions for tax calculations.
//!
//! This module provides shared functionality used across the calculators,
//! including rounding, flooring and the linear phase-out primitive.

use rust_decimal::Decimal;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// This follows standard financial rounding conventions where values at exactly
/// 0.005 are rounded up to 0.01 (away from zero).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the maximum of two decimal values.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::max;
///
/// assert_eq!(max(dec!(100.00), dec!(200.00)), dec!(200.00));
/// assert_eq!(max(dec!(-100.00), dec!(-200.00)), dec!(-100.00));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Floors a value at zero.
pub fn non_negative(value: Decimal) -> Decimal {
    max(value, Decimal::ZERO)
}

/// Linearly reduces `amount` as `income_measure` rises from `start` to `end`.
///
/// - At or below `start` the full amount is returned.
/// - At or above `end` the benefit is fully eliminated.
/// - In between, `amount × (1 − (income_measure − start) / (end − start))`.
///
/// The result is not rounded. Callers guarantee `end > start`; parameter
/// sets are validated for this before any computation runs. An empty range
/// never reaches the division: every income is then either at or below
/// `start` or at or above `end`.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::{phase_out, round_half_up};
///
/// let deduction = phase_out(dec!(2500), dec!(90000), dec!(85000), dec!(100000));
///
/// assert_eq!(round_half_up(deduction), dec!(1666.67));
/// ```
pub fn phase_out(
    amount: Decimal,
    income_measure: Decimal,
    start: Decimal,
    end: Decimal,
) -> Decimal {
    if income_measure <= start {
        return amount;
    }
    if income_measure >= end {
        return Decimal::ZERO;
    }

    let reduction = (income_measure - start) / (end - start);
    amount * (Decimal::ONE - reduction)
}
