//! Earned income tax credit.
//!
//! Fully refundable and never limited by income tax. Eligibility is decided
//! first by a fixed sequence of gates; the first gate that fails ends the
//! computation with a zero credit and the matching
//! [`EitcIneligibility`] reason.
//!
//! # Gates (in order)
//!
//! 1. Married filing separately without the separated-spouse exception or an
//!    explicit override
//! 2. Taxpayer lacks a valid SSN
//! 3. Qualifying children are claimed but lack valid SSNs
//! 4. Investment income over the annual limit
//! 5. No earned income
//!
//! # Amount
//!
//! ```text
//! phase_in  = min(max_credit, earned × max_credit / earned_income_amount)
//! base      = max(earned, AGI)
//! reduction = (base − start) × max_credit / (completion − start)   when base > start
//! credit    = round(max(0, phase_in − reduction))                  to whole dollars
//! ```
//!
//! The table row is chosen by the child count clamped to {0, 1, 2, 3+}.
//! Married-filing-jointly returns use the higher phase-out pair.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{max, non_negative, round_half_up, round_to_whole_dollars};
use crate::models::{EarnedIncomeCreditConstants, EligibilityFlags, FilingStatusCode};

/// Why a return was denied the credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EitcIneligibility {
    MarriedFilingSeparately,
    TaxpayerMissingSsn,
    ChildrenMissingSsn,
    ExcessInvestmentIncome,
    NoEarnedIncome,
}

impl EitcIneligibility {
    /// Stable machine-readable reason code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MarriedFilingSeparately => "MFS_NOT_SEPARATED",
            Self::TaxpayerMissingSsn => "TAXPAYER_SSN_INVALID",
            Self::ChildrenMissingSsn => "CHILDREN_SSN_INVALID",
            Self::ExcessInvestmentIncome => "INVESTMENT_INCOME_OVER_LIMIT",
            Self::NoEarnedIncome => "NO_EARNED_INCOME",
        }
    }
}

impl fmt::Display for EitcIneligibility {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Everything the credit depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarnedIncomeCreditInput {
    pub filing_status: FilingStatusCode,
    pub earned_income: Decimal,
    pub adjusted_gross_income: Decimal,
    pub investment_income: Decimal,
    /// Raw count; clamped onto the table rows during the calculation.
    pub qualifying_children: u32,
    pub eligibility: EligibilityFlags,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarnedIncomeCreditResult {
    pub eligible: bool,
    pub ineligibility: Option<EitcIneligibility>,
    /// Child count after clamping to the table's {0, 1, 2, 3+} rows.
    pub qualifying_children: u32,
    pub phase_in_credit: Decimal,
    /// Greater of earned income and AGI.
    pub phase_out_base: Decimal,
    pub phase_out_start: Decimal,
    pub phase_out_reduction: Decimal,
    /// Final credit in whole dollars.
    pub credit: Decimal,
}

impl EarnedIncomeCreditResult {
    fn ineligible(
        reason: EitcIneligibility,
        qualifying_children: u32,
    ) -> Self {
        Self {
            eligible: false,
            ineligibility: Some(reason),
            qualifying_children,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct EarnedIncomeCreditCalculator<'a> {
    constants: &'a EarnedIncomeCreditConstants,
}

impl<'a> EarnedIncomeCreditCalculator<'a> {
    pub fn new(constants: &'a EarnedIncomeCreditConstants) -> Self {
        Self { constants }
    }

    pub fn calculate(
        &self,
        input: &EarnedIncomeCreditInput,
    ) -> EarnedIncomeCreditResult {
        let children = EarnedIncomeCreditConstants::clamp_children(input.qualifying_children);

        if let Some(reason) = self.ineligibility(input) {
            debug!(reason = %reason, "EITC gate failed");
            return EarnedIncomeCreditResult::ineligible(reason, children);
        }

        let row = self.constants.parameters(children);
        let (phase_out_start, phase_out_completion) = row.phase_out_range(input.filing_status);

        let phase_in_rate = row.max_credit / row.earned_income_amount;
        let phase_in_credit = row.max_credit.min(input.earned_income * phase_in_rate);

        let phase_out_base = max(input.earned_income, input.adjusted_gross_income);
        let phase_out_reduction = if phase_out_base > phase_out_start {
            let phase_out_rate = row.max_credit / (phase_out_completion - phase_out_start);
            (phase_out_base - phase_out_start) * phase_out_rate
        } else {
            Decimal::ZERO
        };

        let credit = round_to_whole_dollars(non_negative(phase_in_credit - phase_out_reduction));

        debug!(
            children,
            phase_in_credit = %phase_in_credit,
            phase_out_base = %phase_out_base,
            phase_out_reduction = %phase_out_reduction,
            credit = %credit,
            "computed earned income credit"
        );

        EarnedIncomeCreditResult {
            eligible: true,
            ineligibility: None,
            qualifying_children: children,
            phase_in_credit: round_half_up(phase_in_credit),
            phase_out_base,
            phase_out_start,
            phase_out_reduction: round_half_up(phase_out_reduction),
            credit,
        }
    }

    /// First failing gate, if any.
    fn ineligibility(
        &self,
        input: &EarnedIncomeCreditInput,
    ) -> Option<EitcIneligibility> {
        let flags = &input.eligibility;

        if input.filing_status == FilingStatusCode::MarriedFilingSeparately
            && !flags.is_separated_spouse_for_eitc
            && !flags.married_separately_override
        {
            return Some(EitcIneligibility::MarriedFilingSeparately);
        }
        if !flags.taxpayer_has_valid_ssn {
            return Some(EitcIneligibility::TaxpayerMissingSsn);
        }
        if input.qualifying_children > 0 && !flags.children_have_valid_ssn {
            return Some(EitcIneligibility::ChildrenMissingSsn);
        }
        if input.investment_income > self.constants.investment_income_limit {
            return Some(EitcIneligibility::ExcessInvestmentIncome);
        }
        if input.earned_income <= Decimal::ZERO {
            return Some(EitcIneligibility::NoEarnedIncome);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::{prop_assert, proptest};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::TaxYearConstants;

    fn input(
        status: FilingStatusCode,
        children: u32,
        earned: Decimal,
        agi: Decimal,
    ) -> EarnedIncomeCreditInput {
        EarnedIncomeCreditInput {
            filing_status: status,
            earned_income: earned,
            adjusted_gross_income: agi,
            investment_income: Decimal::ZERO,
            qualifying_children: children,
            eligibility: EligibilityFlags::default(),
        }
    }

    fn calculate(input: &EarnedIncomeCreditInput) -> EarnedIncomeCreditResult {
        let constants = TaxYearConstants::tax_year_2025();
        EarnedIncomeCreditCalculator::new(&constants.earned_income_credit).calculate(input)
    }

    // =========================================================================
    // eligibility gates
    // =========================================================================

    #[test]
    fn mfs_without_exception_is_ineligible() {
        let mut input = input(
            FilingStatusCode::MarriedFilingSeparately,
            1,
            dec!(15000),
            dec!(15000),
        );
        input.eligibility.is_separated_spouse_for_eitc = false;

        let result = calculate(&input);

        assert!(!result.eligible);
        assert_eq!(result.ineligibility, Some(EitcIneligibility::MarriedFilingSeparately));
        assert_eq!(result.credit, dec!(0));
    }

    #[test]
    fn mfs_with_separated_spouse_exception_is_eligible() {
        let input = input(
            FilingStatusCode::MarriedFilingSeparately,
            1,
            dec!(15000),
            dec!(15000),
        );

        let result = calculate(&input);

        assert!(result.eligible);
        assert_eq!(result.credit, dec!(4328));
    }

    #[test]
    fn mfs_with_explicit_override_is_eligible() {
        let mut input = input(
            FilingStatusCode::MarriedFilingSeparately,
            1,
            dec!(15000),
            dec!(15000),
        );
        input.eligibility.is_separated_spouse_for_eitc = false;
        input.eligibility.married_separately_override = true;

        let result = calculate(&input);

        assert!(result.eligible);
    }

    #[test]
    fn mfs_gate_is_checked_before_ssn_gate() {
        let mut input = input(
            FilingStatusCode::MarriedFilingSeparately,
            1,
            dec!(15000),
            dec!(15000),
        );
        input.eligibility.is_separated_spouse_for_eitc = false;
        input.eligibility.taxpayer_has_valid_ssn = false;

        let result = calculate(&input);

        assert_eq!(result.ineligibility, Some(EitcIneligibility::MarriedFilingSeparately));
    }

    #[test]
    fn missing_taxpayer_ssn_is_ineligible() {
        let mut input = input(FilingStatusCode::Single, 0, dec!(8000), dec!(8000));
        input.eligibility.taxpayer_has_valid_ssn = false;

        let result = calculate(&input);

        assert_eq!(result.ineligibility, Some(EitcIneligibility::TaxpayerMissingSsn));
    }

    #[test]
    fn missing_child_ssn_blocks_only_when_children_claimed() {
        let mut with_children = input(FilingStatusCode::Single, 2, dec!(20000), dec!(20000));
        with_children.eligibility.children_have_valid_ssn = false;
        let mut without_children = input(FilingStatusCode::Single, 0, dec!(8000), dec!(8000));
        without_children.eligibility.children_have_valid_ssn = false;

        assert_eq!(
            calculate(&with_children).ineligibility,
            Some(EitcIneligibility::ChildrenMissingSsn)
        );
        assert!(calculate(&without_children).eligible);
    }

    #[test]
    fn investment_income_over_limit_is_ineligible() {
        let mut at_limit = input(FilingStatusCode::Single, 1, dec!(15000), dec!(15000));
        at_limit.investment_income = dec!(11950);
        let mut over_limit = at_limit.clone();
        over_limit.investment_income = dec!(11950.01);

        assert!(calculate(&at_limit).eligible);
        assert_eq!(
            calculate(&over_limit).ineligibility,
            Some(EitcIneligibility::ExcessInvestmentIncome)
        );
    }

    #[test]
    fn zero_earned_income_is_ineligible() {
        let input = input(FilingStatusCode::Single, 2, dec!(0), dec!(5000));

        let result = calculate(&input);

        assert_eq!(result.ineligibility, Some(EitcIneligibility::NoEarnedIncome));
        assert_eq!(result.qualifying_children, 2);
    }

    #[test]
    fn reason_codes_are_stable() {
        assert_eq!(EitcIneligibility::NoEarnedIncome.to_string(), "NO_EARNED_INCOME");
        assert_eq!(
            EitcIneligibility::MarriedFilingSeparately.code(),
            "MFS_NOT_SEPARATED"
        );
    }

    // =========================================================================
    // amount
    // =========================================================================

    #[test]
    fn phase_in_region_is_proportional() {
        let result = calculate(&input(FilingStatusCode::Single, 0, dec!(5000), dec!(5000)));

        // 5,000 × 649 / 8,490 = 382.21
        assert_eq!(result.phase_in_credit, dec!(382.21));
        assert_eq!(result.credit, dec!(382));
    }

    #[test]
    fn plateau_pays_maximum_credit() {
        let result = calculate(&input(FilingStatusCode::Single, 1, dec!(15000), dec!(15000)));

        assert_eq!(result.phase_out_reduction, dec!(0));
        assert_eq!(result.credit, dec!(4328));
    }

    #[test]
    fn phase_out_reduces_credit() {
        let result = calculate(&input(FilingStatusCode::Single, 2, dec!(30000), dec!(30000)));

        // 7,152 - (30,000 - 23,350) × 7,152 / 33,960 = 5,751.51
        assert_eq!(result.phase_out_reduction, dec!(1400.49));
        assert_eq!(result.credit, dec!(5752));
    }

    #[test]
    fn phase_out_base_uses_agi_when_greater_than_earned_income() {
        let earned_only = calculate(&input(FilingStatusCode::Single, 2, dec!(20000), dec!(20000)));
        let agi_higher = calculate(&input(FilingStatusCode::Single, 2, dec!(20000), dec!(40000)));

        assert_eq!(earned_only.credit, dec!(7152));
        assert_eq!(agi_higher.phase_out_base, dec!(40000));
        // 7,152 - (40,000 - 23,350) × 7,152 / 33,960 = 3,645.50
        assert_eq!(agi_higher.credit, dec!(3645));
    }

    #[test]
    fn joint_returns_use_higher_phase_out_start() {
        let single = calculate(&input(FilingStatusCode::Single, 2, dec!(30000), dec!(30000)));
        let joint = calculate(&input(
            FilingStatusCode::MarriedFilingJointly,
            2,
            dec!(30000),
            dec!(30000),
        ));

        assert_eq!(joint.phase_out_start, dec!(30470));
        assert_eq!(joint.credit, dec!(7152));
        assert!(single.credit < joint.credit);
    }

    #[test]
    fn fully_phased_out_credit_is_zero() {
        let result = calculate(&input(FilingStatusCode::Single, 1, dec!(60000), dec!(60000)));

        assert!(result.eligible);
        assert_eq!(result.credit, dec!(0));
    }

    #[test]
    fn child_count_is_clamped_to_three() {
        let result = calculate(&input(
            FilingStatusCode::HeadOfHousehold,
            5,
            dec!(20000),
            dec!(20000),
        ));

        assert_eq!(result.qualifying_children, 3);
        assert_eq!(result.credit, dec!(8046));
    }

    // =========================================================================
    // properties
    // =========================================================================

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(128))]

        #[test]
        fn prop_credit_is_bounded_by_row_maximum(
            children in 0u32..6,
            earned in 0i64..90_000,
            extra_agi in 0i64..30_000,
            joint in proptest::bool::ANY
        ) {
            let status = if joint {
                FilingStatusCode::MarriedFilingJointly
            } else {
                FilingStatusCode::HeadOfHousehold
            };
            let earned = Decimal::from(earned);
            let agi = earned + Decimal::from(extra_agi);
            let result = calculate(&input(status, children, earned, agi));
            let constants = TaxYearConstants::tax_year_2025();
            let row_max = constants.earned_income_credit.parameters(children).max_credit;

            prop_assert!(result.credit >= Decimal::ZERO);
            prop_assert!(result.credit <= row_max);
            prop_assert!(result.credit.fract().is_zero());
        }
    }
}
