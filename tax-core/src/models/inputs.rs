//! Caller-supplied figures for one computation.
//!
//! Nothing here is ever rejected. Negative, non-finite or otherwise unusable
//! values are clamped to zero at the boundary and a warning is logged, so the
//! engine always produces a complete result. Amounts above [`MAX_AMOUNT`] are
//! saturated to it, which keeps every later sum and product far inside the
//! range of [`Decimal`].

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calculations::common::round_half_up;

/// Largest accepted amount: one quadrillion dollars.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000000);

/// Clamps a currency amount into `0..=MAX_AMOUNT`, in cents.
pub fn clamp_amount(
    field: &'static str,
    value: Decimal,
) -> Decimal {
    if value < Decimal::ZERO {
        warn!(field, value = %value, "negative amount clamped to zero");
        return Decimal::ZERO;
    }
    if value > MAX_AMOUNT {
        warn!(field, value = %value, ceiling = %MAX_AMOUNT, "amount saturated at ceiling");
        return MAX_AMOUNT;
    }
    round_half_up(value)
}

/// Converts a raw floating-point amount. NaN, infinities and negatives map
/// to zero; finite values too large for [`Decimal`] saturate at
/// [`MAX_AMOUNT`].
pub fn amount_from_f64(
    field: &'static str,
    value: f64,
) -> Decimal {
    match Decimal::from_f64(value) {
        Some(amount) => clamp_amount(field, amount),
        None if value.is_finite() && value > 0.0 => {
            warn!(
                field,
                value,
                ceiling = %MAX_AMOUNT,
                "out-of-range amount saturated at ceiling"
            );
            MAX_AMOUNT
        }
        None if value.is_finite() => {
            warn!(field, value, "negative amount clamped to zero");
            Decimal::ZERO
        }
        None => {
            warn!(field, value, "non-finite amount clamped to zero");
            Decimal::ZERO
        }
    }
}

/// Converts a raw count, truncating any fractional part.
pub fn count_from_f64(
    field: &'static str,
    value: f64,
) -> u32 {
    if !value.is_finite() || value < 0.0 {
        warn!(field, value, "invalid count clamped to zero");
        return 0;
    }
    if value.fract() != 0.0 {
        warn!(field, value, "fractional count truncated");
    }
    // Saturating float-to-int conversion.
    value.trunc() as u32
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeInputs {
    pub wages: Decimal,
    /// Schedule C net profit. Losses are clamped to zero.
    pub self_employment_profit: Decimal,
    /// Federal income tax withheld.
    pub withholding: Decimal,
    /// Only consulted for the EITC investment-income test.
    pub investment_income: Decimal,
}

impl IncomeInputs {
    pub fn new(
        wages: Decimal,
        self_employment_profit: Decimal,
        withholding: Decimal,
        investment_income: Decimal,
    ) -> Self {
        Self {
            wages,
            self_employment_profit,
            withholding,
            investment_income,
        }
        .normalized()
    }

    pub fn from_f64(
        wages: f64,
        self_employment_profit: f64,
        withholding: f64,
        investment_income: f64,
    ) -> Self {
        Self {
            wages: amount_from_f64("wages", wages),
            self_employment_profit: amount_from_f64(
                "self_employment_profit",
                self_employment_profit,
            ),
            withholding: amount_from_f64("withholding", withholding),
            investment_income: amount_from_f64("investment_income", investment_income),
        }
    }

    /// Returns a copy with every amount clamped. Idempotent.
    pub fn normalized(&self) -> Self {
        Self {
            wages: clamp_amount("wages", self.wages),
            self_employment_profit: clamp_amount(
                "self_employment_profit",
                self.self_employment_profit,
            ),
            withholding: clamp_amount("withholding", self.withholding),
            investment_income: clamp_amount("investment_income", self.investment_income),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependentCounts {
    pub qualifying_children_under_17: u32,
    pub other_dependents: u32,
}

impl DependentCounts {
    pub fn new(
        qualifying_children_under_17: u32,
        other_dependents: u32,
    ) -> Self {
        Self {
            qualifying_children_under_17,
            other_dependents,
        }
    }

    pub fn from_f64(
        qualifying_children_under_17: f64,
        other_dependents: f64,
    ) -> Self {
        Self {
            qualifying_children_under_17: count_from_f64(
                "qualifying_children_under_17",
                qualifying_children_under_17,
            ),
            other_dependents: count_from_f64("other_dependents", other_dependents),
        }
    }
}

/// Caller attestations used only by the EITC gate.
///
/// Defaults are permissive; final eligibility is re-verified at filing time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityFlags {
    pub taxpayer_has_valid_ssn: bool,
    pub children_have_valid_ssn: bool,
    pub is_separated_spouse_for_eitc: bool,
    /// Lets a married-filing-separately return through the EITC gate even
    /// without the separated-spouse exception.
    pub married_separately_override: bool,
}

impl Default for EligibilityFlags {
    fn default() -> Self {
        Self {
            taxpayer_has_valid_ssn: true,
            children_have_valid_ssn: true,
            is_separated_spouse_for_eitc: true,
            married_separately_override: false,
        }
    }
}
