//! Tax year 2025 figures.
//!
//! Brackets and standard deductions reflect the 2025 amounts as amended in
//! July 2025; EITC parameters come from Rev. Proc. 2024-40.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::{
    BracketSchedules, ChildCreditConstants, CreditPhaseOut, EarnedIncomeCreditConstants,
    EitcParameters, FilingStatusAmounts, OtherDependentCreditConstants, SelfEmploymentConstants,
    TaxBracket, TaxYearConstants,
};

const RATES: [Decimal; 7] = [
    dec!(0.10),
    dec!(0.12),
    dec!(0.22),
    dec!(0.24),
    dec!(0.32),
    dec!(0.35),
    dec!(0.37),
];

/// Builds a contiguous schedule from the six upper bounds of the 2025 rates.
fn schedule(upper_bounds: [Decimal; 6]) -> Vec<TaxBracket> {
    let mut lower = Decimal::ZERO;
    let mut brackets = Vec::with_capacity(RATES.len());
    for (index, rate) in RATES.into_iter().enumerate() {
        let upper = upper_bounds.get(index).copied();
        brackets.push(TaxBracket::new(lower, upper, rate));
        if let Some(upper) = upper {
            lower = upper;
        }
    }
    brackets
}

fn credit_phase_out() -> CreditPhaseOut {
    CreditPhaseOut {
        joint_threshold: dec!(400000),
        other_threshold: dec!(200000),
        step: dec!(1000),
        reduction_per_step: dec!(50),
    }
}

impl TaxYearConstants {
    pub fn tax_year_2025() -> Self {
        Self {
            tax_year: 2025,
            standard_deduction: FilingStatusAmounts {
                single: dec!(15750),
                married_filing_jointly: dec!(31500),
                married_filing_separately: dec!(15750),
                head_of_household: dec!(23625),
            },
            brackets: BracketSchedules {
                single: schedule([
                    dec!(11925),
                    dec!(48475),
                    dec!(103350),
                    dec!(197300),
                    dec!(250525),
                    dec!(626350),
                ]),
                married_filing_jointly: schedule([
                    dec!(23850),
                    dec!(96950),
                    dec!(206700),
                    dec!(394600),
                    dec!(501050),
                    dec!(751600),
                ]),
                married_filing_separately: schedule([
                    dec!(11925),
                    dec!(48475),
                    dec!(103350),
                    dec!(197300),
                    dec!(250525),
                    dec!(375800),
                ]),
                head_of_household: schedule([
                    dec!(17000),
                    dec!(64850),
                    dec!(103350),
                    dec!(197300),
                    dec!(250500),
                    dec!(626350),
                ]),
            },
            self_employment: SelfEmploymentConstants {
                ss_wage_base: dec!(176100),
                ss_tax_rate: dec!(0.124),
                medicare_tax_rate: dec!(0.029),
                additional_medicare_rate: dec!(0.009),
                additional_medicare_threshold: FilingStatusAmounts {
                    single: dec!(200000),
                    married_filing_jointly: dec!(250000),
                    married_filing_separately: dec!(125000),
                    head_of_household: dec!(200000),
                },
                net_earnings_factor: dec!(0.9235),
                deduction_factor: dec!(0.50),
                min_se_threshold: dec!(400),
            },
            child_credit: ChildCreditConstants {
                credit_per_child: dec!(2200),
                refundable_per_child: dec!(1700),
                earned_income_floor: dec!(2500),
                refundable_rate: dec!(0.15),
                phase_out: credit_phase_out(),
            },
            other_dependent_credit: OtherDependentCreditConstants {
                credit_per_dependent: dec!(500),
                phase_out: credit_phase_out(),
            },
            earned_income_credit: EarnedIncomeCreditConstants {
                investment_income_limit: dec!(11950),
                no_children: EitcParameters {
                    max_credit: dec!(649),
                    earned_income_amount: dec!(8490),
                    phase_out_start: dec!(10620),
                    phase_out_completion: dec!(19104),
                    joint_phase_out_start: dec!(17730),
                    joint_phase_out_completion: dec!(26214),
                },
                one_child: EitcParameters {
                    max_credit: dec!(4328),
                    earned_income_amount: dec!(12730),
                    phase_out_start: dec!(23350),
                    phase_out_completion: dec!(50434),
                    joint_phase_out_start: dec!(30470),
                    joint_phase_out_completion: dec!(57554),
                },
                two_children: EitcParameters {
                    max_credit: dec!(7152),
                    earned_income_amount: dec!(17880),
                    phase_out_start: dec!(23350),
                    phase_out_completion: dec!(57310),
                    joint_phase_out_start: dec!(30470),
                    joint_phase_out_completion: dec!(64430),
                },
                three_or_more_children: EitcParameters {
                    max_credit: dec!(8046),
                    earned_income_amount: dec!(17880),
                    phase_out_start: dec!(23350),
                    phase_out_completion: dec!(61555),
                    joint_phase_out_start: dec!(30470),
                    joint_phase_out_completion: dec!(68675),
                },
            },
        }
    }
}
