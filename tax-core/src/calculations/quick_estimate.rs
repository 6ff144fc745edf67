//! Ballpark refund preview for incomplete intake data.
//!
//! The estimator runs the full computation once to get AGI, income tax and
//! self-employment tax, then swaps the child and earned income credits for
//! flat heuristics:
//!
//! - child credit: the full per-child amount for every child while AGI is at
//!   or under the phase-out threshold, nothing above it
//! - earned income credit: the table maximum while AGI is at or under the
//!   phase-out start, half of it until the phase-out completes, nothing after
//!
//! There is no phase-in or phase-out arithmetic and no eligibility gate
//! beyond "has earned income". A [`QuickEstimate`] is a preview only. It
//! cannot be converted into a [`ComputationResult`](crate::ComputationResult)
//! and must not be persisted or shown as a final figure.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::federal_tax::{FederalTaxCalculator, FederalTaxRequest};
use crate::constants::{ConfigurationError, ConstantsRegistry, DEFAULT_TAX_YEAR, default_registry};
use crate::models::{DependentCounts, FilingStatusCode, IncomeInputs, TaxYearConstants};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickEstimateRequest {
    pub tax_year: i32,
    pub filing_status: FilingStatusCode,
    pub wages: Decimal,
    pub self_employment_profit: Decimal,
    pub withholding: Decimal,
    pub qualifying_children_under_17: u32,
}

impl QuickEstimateRequest {
    pub fn new(
        filing_status: FilingStatusCode,
        wages: Decimal,
        self_employment_profit: Decimal,
        withholding: Decimal,
        qualifying_children_under_17: u32,
    ) -> Self {
        Self {
            tax_year: DEFAULT_TAX_YEAR,
            filing_status,
            wages,
            self_employment_profit,
            withholding,
            qualifying_children_under_17,
        }
    }

    pub fn with_tax_year(
        mut self,
        tax_year: i32,
    ) -> Self {
        self.tax_year = tax_year;
        self
    }
}

/// A non-authoritative preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickEstimate {
    pub adjusted_gross_income: Decimal,
    pub estimated_credits: Decimal,
    /// Positive for a refund, negative for an amount owed.
    pub estimated_refund_or_owed: Decimal,
}

#[derive(Debug, Clone)]
pub struct QuickEstimator<'a> {
    constants: &'a TaxYearConstants,
}

impl<'a> QuickEstimator<'a> {
    pub fn new(constants: &'a TaxYearConstants) -> Self {
        Self { constants }
    }

    pub fn estimate(
        &self,
        request: &QuickEstimateRequest,
    ) -> Result<QuickEstimate, ConfigurationError> {
        let full_request = FederalTaxRequest::new(request.filing_status)
            .with_tax_year(request.tax_year)
            .with_income(IncomeInputs::new(
                request.wages,
                request.self_employment_profit,
                request.withholding,
                Decimal::ZERO,
            ))
            .with_dependents(DependentCounts::new(request.qualifying_children_under_17, 0));
        let full = FederalTaxCalculator::new(self.constants).calculate(&full_request)?;

        let status = request.filing_status;
        let children = request.qualifying_children_under_17;
        let agi = full.adjusted_gross_income;

        let child_credit = self.flat_child_credit(children, agi, status);
        let earned_income_credit =
            self.flat_earned_income_credit(children, agi, full.earned_income, status);
        let estimated_credits = child_credit + earned_income_credit;

        let estimated_tax =
            full.income_tax_before_credits + full.self_employment.self_employment_tax;
        let estimated_refund_or_owed = full.income.withholding + estimated_credits - estimated_tax;

        debug!(
            agi = %agi,
            estimated_credits = %estimated_credits,
            estimated_refund_or_owed = %estimated_refund_or_owed,
            "computed quick estimate"
        );

        Ok(QuickEstimate {
            adjusted_gross_income: agi,
            estimated_credits,
            estimated_refund_or_owed,
        })
    }

    fn flat_child_credit(
        &self,
        children: u32,
        agi: Decimal,
        status: FilingStatusCode,
    ) -> Decimal {
        let ctc = &self.constants.child_credit;
        if agi > ctc.phase_out.threshold(status) {
            return Decimal::ZERO;
        }
        Decimal::from(children) * ctc.credit_per_child
    }

    fn flat_earned_income_credit(
        &self,
        children: u32,
        agi: Decimal,
        earned_income: Decimal,
        status: FilingStatusCode,
    ) -> Decimal {
        if earned_income <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let row = self.constants.earned_income_credit.parameters(children);
        let (start, completion) = row.phase_out_range(status);
        if agi <= start {
            row.max_credit
        } else if agi < completion {
            row.max_credit / Decimal::TWO
        } else {
            Decimal::ZERO
        }
    }
}

/// Quick estimate with constants from `registry`.
pub fn compute_quick_estimate_with(
    registry: &ConstantsRegistry,
    request: &QuickEstimateRequest,
) -> Result<QuickEstimate, ConfigurationError> {
    let constants = registry.resolve(request.tax_year)?;
    QuickEstimator::new(constants).estimate(request)
}

/// Quick estimate with the built-in constants.
pub fn compute_quick_estimate(
    request: &QuickEstimateRequest,
) -> Result<QuickEstimate, ConfigurationError> {
    compute_quick_estimate_with(default_registry()?, request)
}
