//! Common utility functions for tax calculations.
//!
//! Every calculator rounds through these helpers so the whole engine shares
//! one rounding rule: midpoint away from zero, to cents for money lines and
//! to whole dollars where a worksheet calls for it.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
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
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds to the nearest whole dollar, halves away from zero.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_to_whole_dollars;
///
/// assert_eq!(round_to_whole_dollars(dec!(2499.50)), dec!(2500));
/// assert_eq!(round_to_whole_dollars(dec!(2499.49)), dec!(2499));
/// ```
pub fn round_to_whole_dollars(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a ratio (effective tax rate and similar) to four places.
pub fn round_rate(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the maximum of two decimal values.
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

/// Credit reduction for income over a phase-out threshold.
///
/// Each started `step` of excess costs `reduction_per_step`, so $1 over a
/// $1,000-step threshold already costs one full step. Income at or below
/// the threshold costs nothing. `step` must be positive.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::phase_out_reduction;
///
/// assert_eq!(phase_out_reduction(dec!(200001), dec!(200000), dec!(1000), dec!(50)), dec!(50));
/// assert_eq!(phase_out_reduction(dec!(202000), dec!(200000), dec!(1000), dec!(50)), dec!(100));
/// ```
pub fn phase_out_reduction(
    income: Decimal,
    threshold: Decimal,
    step: Decimal,
    reduction_per_step: Decimal,
) -> Decimal {
    if income <= threshold || step <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let steps = ((income - threshold) / step).ceil();
    steps * reduction_per_step
}
