//! Federal tax computation for one return.
//!
//! Composes the worksheets in filing order:
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Self-employment tax and its deductible half |
//! | 2    | AGI: wages + SE profit − deductible half (not below zero) |
//! | 3    | Taxable income: AGI − standard deduction (not below zero) |
//! | 4    | Gross income tax from the rate schedule |
//! | 5    | Other dependent credit, limited to gross income tax |
//! | 6    | Earned income: wages + SE net earnings |
//! | 7    | Child tax credit against the income tax left after step 5 |
//! | 8    | Income tax after all nonrefundable credits |
//! | 9    | Total tax: step 8 + SE tax |
//! | 10   | Earned income credit |
//! | 11   | Refundable credits, payments and refund or amount owed |
//!
//! Nonrefundable credits only ever reduce income tax; self-employment tax is
//! added after them and is never offset.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::{FederalTaxRequest, FilingStatusCode, IncomeInputs, compute_federal_tax};
//!
//! let request = FederalTaxRequest::new(FilingStatusCode::Single)
//!     .with_income(IncomeInputs::new(dec!(40000), dec!(0), dec!(3000), dec!(0)));
//!
//! let result = compute_federal_tax(&request).unwrap();
//!
//! assert_eq!(result.taxable_income, dec!(24250));
//! assert_eq!(result.income_tax_before_credits, dec!(2671.50));
//! assert_eq!(result.refund_or_owed, dec!(328.50));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{non_negative, round_rate};
use crate::calculations::worksheets::{
    BracketTaxCalculator, ChildCreditCalculator, ChildCreditResult, EarnedIncomeCreditCalculator,
    EarnedIncomeCreditInput, EarnedIncomeCreditResult, OtherDependentCreditCalculator,
    OtherDependentCreditResult, SelfEmploymentTaxCalculator, SelfEmploymentTaxConfig,
    SelfEmploymentTaxResult,
};
use crate::constants::{ConfigurationError, ConstantsRegistry, DEFAULT_TAX_YEAR, default_registry};
use crate::models::{
    DependentCounts, EligibilityFlags, FilingStatusCode, IncomeInputs, TaxYearConstants,
};

/// Everything a caller reports for one return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederalTaxRequest {
    pub tax_year: i32,
    pub filing_status: FilingStatusCode,
    pub income: IncomeInputs,
    pub dependents: DependentCounts,
    pub eligibility: EligibilityFlags,
}

impl FederalTaxRequest {
    /// A request for the default year with no income, no dependents and
    /// permissive eligibility flags.
    pub fn new(filing_status: FilingStatusCode) -> Self {
        Self {
            tax_year: DEFAULT_TAX_YEAR,
            filing_status,
            income: IncomeInputs::default(),
            dependents: DependentCounts::default(),
            eligibility: EligibilityFlags::default(),
        }
    }

    pub fn with_tax_year(
        mut self,
        tax_year: i32,
    ) -> Self {
        self.tax_year = tax_year;
        self
    }

    pub fn with_income(
        mut self,
        income: IncomeInputs,
    ) -> Self {
        self.income = income;
        self
    }

    pub fn with_dependents(
        mut self,
        dependents: DependentCounts,
    ) -> Self {
        self.dependents = dependents;
        self
    }

    pub fn with_eligibility(
        mut self,
        eligibility: EligibilityFlags,
    ) -> Self {
        self.eligibility = eligibility;
        self
    }
}

/// The authoritative outcome of a return.
///
/// Produced once per call; every amount is in dollars and cents except the
/// earned income credit, which is whole dollars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputationResult {
    pub tax_year: i32,
    pub filing_status: FilingStatusCode,
    /// Inputs after boundary clamping.
    pub income: IncomeInputs,
    pub self_employment: SelfEmploymentTaxResult,
    pub adjusted_gross_income: Decimal,
    pub standard_deduction: Decimal,
    pub taxable_income: Decimal,
    pub income_tax_before_credits: Decimal,
    pub marginal_rate: Decimal,
    pub other_dependent_credit: OtherDependentCreditResult,
    pub income_tax_after_other_dependent_credit: Decimal,
    /// Wages plus SE net earnings; drives the child and earned income credits.
    pub earned_income: Decimal,
    pub child_tax_credit: ChildCreditResult,
    pub income_tax_after_credits: Decimal,
    pub total_tax: Decimal,
    pub earned_income_credit: EarnedIncomeCreditResult,
    /// Additional child tax credit plus earned income credit.
    pub refundable_credits: Decimal,
    /// Withholding plus refundable credits.
    pub total_payments: Decimal,
    /// Positive for a refund, negative for an amount owed.
    pub refund_or_owed: Decimal,
    /// Total tax as a share of AGI, four decimal places.
    pub effective_tax_rate: Decimal,
}

impl ComputationResult {
    pub fn is_refund(&self) -> bool {
        self.refund_or_owed > Decimal::ZERO
    }

    /// Other dependent credit plus child tax credit actually applied.
    pub fn nonrefundable_credits_used(&self) -> Decimal {
        self.other_dependent_credit.used + self.child_tax_credit.nonrefundable_used
    }
}

/// Runs the full computation against one year's constants.
#[derive(Debug, Clone)]
pub struct FederalTaxCalculator<'a> {
    constants: &'a TaxYearConstants,
}

impl<'a> FederalTaxCalculator<'a> {
    pub fn new(constants: &'a TaxYearConstants) -> Self {
        Self { constants }
    }

    /// Computes the return.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when the request's year does not match
    /// the constants, the constants fail validation, or the filing status
    /// has no tables. Bad numeric input is never an error.
    pub fn calculate(
        &self,
        request: &FederalTaxRequest,
    ) -> Result<ComputationResult, ConfigurationError> {
        let constants = self.constants;
        if request.tax_year != constants.tax_year {
            return Err(ConfigurationError::UnsupportedTaxYear(request.tax_year));
        }
        constants.validate()?;

        let status = request.filing_status;
        let income = request.income.normalized();
        let dependents = request.dependents;

        // Resolve every status-dependent table up front so a missing one
        // fails before any arithmetic.
        let se_config = SelfEmploymentTaxConfig::from_constants(constants, status)?;
        let standard_deduction = constants.standard_deduction.get(status)?;
        let bracket_tax = BracketTaxCalculator::from_constants(constants, status)?;

        // Step 1
        let self_employment = SelfEmploymentTaxCalculator::new(se_config)
            .calculate(income.self_employment_profit, income.wages);

        // Step 2
        let adjusted_gross_income = non_negative(
            income.wages + income.self_employment_profit - self_employment.deductible_half,
        );

        // Step 3
        let taxable_income = non_negative(adjusted_gross_income - standard_deduction);

        // Step 4
        let income_tax_before_credits = bracket_tax.calculate(taxable_income);
        let marginal_rate = bracket_tax.marginal_rate(taxable_income);

        debug!(
            agi = %adjusted_gross_income,
            taxable_income = %taxable_income,
            income_tax = %income_tax_before_credits,
            "computed income tax before credits"
        );

        // Step 5
        let other_dependent_credit =
            OtherDependentCreditCalculator::new(&constants.other_dependent_credit).calculate(
                dependents.other_dependents,
                adjusted_gross_income,
                status,
                income_tax_before_credits,
            );
        let income_tax_after_other_dependent_credit =
            income_tax_before_credits - other_dependent_credit.used;

        // Step 6
        let earned_income = income.wages + non_negative(self_employment.net_earnings);

        // Step 7
        let child_tax_credit = ChildCreditCalculator::new(&constants.child_credit).calculate(
            dependents.qualifying_children_under_17,
            adjusted_gross_income,
            status,
            earned_income,
            income_tax_after_other_dependent_credit,
        );

        // Step 8
        let income_tax_after_credits =
            income_tax_after_other_dependent_credit - child_tax_credit.nonrefundable_used;

        // Step 9
        let total_tax = income_tax_after_credits + self_employment.self_employment_tax;

        // Step 10
        let earned_income_credit =
            EarnedIncomeCreditCalculator::new(&constants.earned_income_credit).calculate(
                &EarnedIncomeCreditInput {
                    filing_status: status,
                    earned_income,
                    adjusted_gross_income,
                    investment_income: income.investment_income,
                    qualifying_children: dependents.qualifying_children_under_17,
                    eligibility: request.eligibility,
                },
            );

        // Step 11
        let refundable_credits = child_tax_credit.refundable + earned_income_credit.credit;
        let total_payments = income.withholding + refundable_credits;
        let refund_or_owed = total_payments - total_tax;
        let effective_tax_rate = if adjusted_gross_income > Decimal::ZERO {
            round_rate(total_tax / adjusted_gross_income)
        } else {
            Decimal::ZERO
        };

        debug!(
            total_tax = %total_tax,
            refundable_credits = %refundable_credits,
            refund_or_owed = %refund_or_owed,
            "computed federal tax"
        );

        Ok(ComputationResult {
            tax_year: constants.tax_year,
            filing_status: status,
            income,
            self_employment,
            adjusted_gross_income,
            standard_deduction,
            taxable_income,
            income_tax_before_credits,
            marginal_rate,
            other_dependent_credit,
            income_tax_after_other_dependent_credit,
            earned_income,
            child_tax_credit,
            income_tax_after_credits,
            total_tax,
            earned_income_credit,
            refundable_credits,
            total_payments,
            refund_or_owed,
            effective_tax_rate,
        })
    }
}

/// Computes a return with constants from `registry`.
pub fn compute_federal_tax_with(
    registry: &ConstantsRegistry,
    request: &FederalTaxRequest,
) -> Result<ComputationResult, ConfigurationError> {
    let constants = registry.resolve(request.tax_year)?;
    FederalTaxCalculator::new(constants).calculate(request)
}

/// Computes a return with the built-in constants.
pub fn compute_federal_tax(
    request: &FederalTaxRequest,
) -> Result<ComputationResult, ConfigurationError> {
    compute_federal_tax_with(default_registry()?, request)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::MAX_AMOUNT;

    fn constants() -> TaxYearConstants {
        TaxYearConstants::tax_year_2025()
    }

    fn request(
        status: FilingStatusCode,
        wages: Decimal,
        profit: Decimal,
        withholding: Decimal,
        children: u32,
        other: u32,
    ) -> FederalTaxRequest {
        FederalTaxRequest::new(status)
            .with_income(IncomeInputs::new(wages, profit, withholding, dec!(0)))
            .with_dependents(DependentCounts::new(children, other))
    }

    // =========================================================================
    // configuration errors
    // =========================================================================

    #[test]
    fn surviving_spouse_is_configuration_error() {
        let constants = constants();
        let request = request(
            FilingStatusCode::QualifyingSurvivingSpouse,
            dec!(50000),
            dec!(0),
            dec!(0),
            0,
            0,
        );

        let result = FederalTaxCalculator::new(&constants).calculate(&request);

        assert_eq!(
            result,
            Err(ConfigurationError::UnsupportedFilingStatus(
                FilingStatusCode::QualifyingSurvivingSpouse
            ))
        );
    }

    #[test]
    fn year_mismatch_is_configuration_error() {
        let constants = constants();
        let request = FederalTaxRequest::new(FilingStatusCode::Single).with_tax_year(2024);

        let result = FederalTaxCalculator::new(&constants).calculate(&request);

        assert_eq!(result, Err(ConfigurationError::UnsupportedTaxYear(2024)));
    }

    #[test]
    fn unregistered_year_is_configuration_error() {
        let request = FederalTaxRequest::new(FilingStatusCode::Single).with_tax_year(1999);

        let result = compute_federal_tax(&request);

        assert_eq!(result, Err(ConfigurationError::UnsupportedTaxYear(1999)));
    }

    #[test]
    fn invalid_injected_constants_are_configuration_error() {
        let mut constants = constants();
        constants.brackets.single.clear();
        let request = FederalTaxRequest::new(FilingStatusCode::Single);

        let result = FederalTaxCalculator::new(&constants).calculate(&request);

        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidConstants { tax_year: 2025, .. })
        ));
    }

    // =========================================================================
    // sequencing
    // =========================================================================

    #[test]
    fn zero_income_produces_zero_result() {
        let request = FederalTaxRequest::new(FilingStatusCode::Single);

        let result = compute_federal_tax(&request).unwrap();

        assert_eq!(result.adjusted_gross_income, dec!(0));
        assert_eq!(result.total_tax, dec!(0));
        assert_eq!(result.refund_or_owed, dec!(0));
        assert_eq!(result.effective_tax_rate, dec!(0));
        assert!(!result.is_refund());
    }

    #[test]
    fn other_dependent_credit_is_applied_before_child_credit() {
        let constants = constants();
        // Taxable income 24,250 → income tax 2,671.50
        let request = request(FilingStatusCode::Single, dec!(40000), dec!(0), dec!(0), 1, 2);

        let result = FederalTaxCalculator::new(&constants).calculate(&request).unwrap();

        assert_eq!(result.other_dependent_credit.used, dec!(1000));
        assert_eq!(result.income_tax_after_other_dependent_credit, dec!(1671.50));
        assert_eq!(result.child_tax_credit.nonrefundable_used, dec!(1671.50));
        assert_eq!(result.income_tax_after_credits, dec!(0));
        // Remaining 528.50 is refundable (below the 1,700 cap and the 5,625 formula)
        assert_eq!(result.child_tax_credit.refundable, dec!(528.50));
        assert_eq!(result.nonrefundable_credits_used(), dec!(2671.50));
    }

    #[test]
    fn credits_never_reduce_self_employment_tax() {
        let constants = constants();
        let request = request(FilingStatusCode::Single, dec!(0), dec!(20000), dec!(0), 3, 2);

        let result = FederalTaxCalculator::new(&constants).calculate(&request).unwrap();

        assert_eq!(result.income_tax_after_credits, dec!(0));
        assert_eq!(result.total_tax, result.self_employment.self_employment_tax);
        assert!(result.total_tax > dec!(0));
    }

    #[test]
    fn deductible_half_reduces_agi_not_tax() {
        let constants = constants();
        let request = request(FilingStatusCode::Single, dec!(0), dec!(100000), dec!(0), 0, 0);

        let result = FederalTaxCalculator::new(&constants).calculate(&request).unwrap();

        assert_eq!(result.self_employment.deductible_half, dec!(7064.78));
        assert_eq!(result.adjusted_gross_income, dec!(92935.22));
        assert_eq!(
            result.total_tax,
            result.income_tax_before_credits + result.self_employment.self_employment_tax
        );
    }

    #[test]
    fn earned_income_uses_net_earnings_not_profit() {
        let constants = constants();
        let request = request(FilingStatusCode::Single, dec!(10000), dec!(10000), dec!(0), 0, 0);

        let result = FederalTaxCalculator::new(&constants).calculate(&request).unwrap();

        assert_eq!(result.earned_income, dec!(19235.00));
    }

    #[test]
    fn negative_inputs_are_clamped_not_rejected() {
        let constants = constants();
        let request = request(FilingStatusCode::Single, dec!(-5000), dec!(-100), dec!(-1), 0, 0);

        let result = FederalTaxCalculator::new(&constants).calculate(&request).unwrap();

        assert_eq!(result.income, IncomeInputs::default());
        assert_eq!(result.total_tax, dec!(0));
    }

    #[test]
    fn amounts_beyond_decimal_range_still_compute() {
        let constants = constants();
        let request = FederalTaxRequest::new(FilingStatusCode::MarriedFilingJointly)
            .with_income(IncomeInputs::from_f64(4.0e28, 4.0e28, 1.0e29, f64::MAX))
            .with_dependents(DependentCounts::new(u32::MAX, u32::MAX));

        let result = FederalTaxCalculator::new(&constants).calculate(&request).unwrap();

        assert_eq!(result.income.wages, MAX_AMOUNT);
        assert_eq!(result.income.self_employment_profit, MAX_AMOUNT);
        assert_eq!(result.income.withholding, MAX_AMOUNT);
        assert!(result.adjusted_gross_income > MAX_AMOUNT);
        assert!(result.total_tax > dec!(0));
        assert_eq!(result.child_tax_credit.credit, dec!(0));
    }

    #[test]
    fn unnormalized_decimal_max_inputs_are_saturated() {
        let constants = constants();
        let mut request = FederalTaxRequest::new(FilingStatusCode::Single);
        request.income = IncomeInputs {
            wages: Decimal::MAX,
            self_employment_profit: Decimal::MAX,
            withholding: Decimal::MAX,
            investment_income: Decimal::MAX,
        };

        let result = FederalTaxCalculator::new(&constants).calculate(&request);

        assert!(result.is_ok());
    }

    #[test]
    fn amount_owed_is_negative() {
        let constants = constants();
        let request = request(FilingStatusCode::Single, dec!(80000), dec!(0), dec!(1000), 0, 0);

        let result = FederalTaxCalculator::new(&constants).calculate(&request).unwrap();

        // Taxable 64,250: 5,578.50 + 15,775 × 0.22 = 9,049.00
        assert_eq!(result.income_tax_before_credits, dec!(9049.00));
        assert_eq!(result.refund_or_owed, dec!(-8049.00));
        assert_eq!(result.effective_tax_rate, dec!(0.1131));
    }

    #[test]
    fn registry_override_is_used() {
        let mut registry = ConstantsRegistry::with_defaults().unwrap();
        let mut custom = constants();
        custom.standard_deduction.single = dec!(40000);
        registry.register(custom).unwrap();
        let request = request(FilingStatusCode::Single, dec!(40000), dec!(0), dec!(0), 0, 0);

        let result = compute_federal_tax_with(&registry, &request).unwrap();

        assert_eq!(result.taxable_income, dec!(0));
        assert_eq!(result.total_tax, dec!(0));
    }

    // =========================================================================
    // properties
    // =========================================================================

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_credits_are_non_negative_and_within_headroom(
            status_index in 0usize..4,
            wages in 0i64..500_000,
            profit in 0i64..300_000,
            children in 0u32..5,
            other in 0u32..4
        ) {
            let constants = constants();
            let status = FilingStatusCode::SUPPORTED[status_index];
            let request = request(
                status,
                Decimal::from(wages),
                Decimal::from(profit),
                dec!(0),
                children,
                other,
            );

            let result = FederalTaxCalculator::new(&constants).calculate(&request).unwrap();

            prop_assert!(result.other_dependent_credit.used >= Decimal::ZERO);
            prop_assert!(result.other_dependent_credit.used <= result.income_tax_before_credits);
            prop_assert!(result.child_tax_credit.nonrefundable_used >= Decimal::ZERO);
            prop_assert!(
                result.child_tax_credit.nonrefundable_used
                    <= result.income_tax_after_other_dependent_credit
            );
            prop_assert!(result.child_tax_credit.refundable >= Decimal::ZERO);
            prop_assert!(result.earned_income_credit.credit >= Decimal::ZERO);
            prop_assert!(result.income_tax_after_credits >= Decimal::ZERO);
            prop_assert!(result.total_tax >= result.self_employment.self_employment_tax);
        }

        #[test]
        fn prop_computation_is_idempotent(
            wages in 0i64..300_000,
            profit in 0i64..200_000,
            children in 0u32..4
        ) {
            let constants = constants();
            let request = request(
                FilingStatusCode::HeadOfHousehold,
                Decimal::from(wages),
                Decimal::from(profit),
                dec!(2500),
                children,
                1,
            );
            let calculator = FederalTaxCalculator::new(&constants);

            let first = calculator.calculate(&request).unwrap();
            let second = calculator.calculate(&request).unwrap();

            prop_assert_eq!(first, second);
        }
    }
}
