//! Progressive income tax from the rate schedules.
//!
//! Each bracket taxes only the slice of taxable income that falls inside it:
//!
//! ```text
//! tax = Σ (min(income, upper) − lower) × rate   for every bracket with income > lower
//! ```
//!
//! Schedules are contiguous and the top bracket is unbounded, which
//! [`TaxYearConstants::validate`] guarantees for registered tables.

use rust_decimal::Decimal;

use crate::calculations::common::round_half_up;
use crate::constants::ConfigurationError;
use crate::models::{FilingStatusCode, TaxBracket, TaxYearConstants};

/// Applies a marginal-rate schedule to taxable income.
#[derive(Debug, Clone)]
pub struct BracketTaxCalculator<'a> {
    brackets: &'a [TaxBracket],
}

impl<'a> BracketTaxCalculator<'a> {
    /// Brackets must be sorted by `min_income` and contiguous.
    pub fn new(brackets: &'a [TaxBracket]) -> Self {
        Self { brackets }
    }

    pub fn from_constants(
        constants: &'a TaxYearConstants,
        status: FilingStatusCode,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self::new(constants.brackets.get(status)?))
    }

    /// Gross income tax before any credit, rounded to cents.
    pub fn calculate(
        &self,
        taxable_income: Decimal,
    ) -> Decimal {
        if taxable_income <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let tax: Decimal = self
            .brackets
            .iter()
            .take_while(|bracket| taxable_income > bracket.min_income)
            .map(|bracket| {
                let top = bracket
                    .max_income
                    .map_or(taxable_income, |max| taxable_income.min(max));
                (top - bracket.min_income) * bracket.tax_rate
            })
            .sum();

        round_half_up(tax)
    }

    /// Rate applied to the next dollar of income.
    pub fn marginal_rate(
        &self,
        taxable_income: Decimal,
    ) -> Decimal {
        self.brackets
            .iter()
            .rev()
            .find(|bracket| taxable_income >= bracket.min_income)
            .map_or(Decimal::ZERO, |bracket| bracket.tax_rate)
    }
}
