use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::phase_out_reduction;
use crate::constants::ConfigurationError;
use crate::models::{FilingStatusCode, TaxBracket};

/// A currency amount that varies by filing status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingStatusAmounts {
    pub single: Decimal,
    pub married_filing_jointly: Decimal,
    pub married_filing_separately: Decimal,
    pub head_of_household: Decimal,
}

impl FilingStatusAmounts {
    pub fn get(
        &self,
        status: FilingStatusCode,
    ) -> Result<Decimal, ConfigurationError> {
        match status {
            FilingStatusCode::Single => Ok(self.single),
            FilingStatusCode::MarriedFilingJointly => Ok(self.married_filing_jointly),
            FilingStatusCode::MarriedFilingSeparately => Ok(self.married_filing_separately),
            FilingStatusCode::HeadOfHousehold => Ok(self.head_of_household),
            FilingStatusCode::QualifyingSurvivingSpouse => {
                Err(ConfigurationError::UnsupportedFilingStatus(status))
            }
        }
    }

    fn iter(&self) -> impl Iterator<Item = Decimal> {
        [
            self.single,
            self.married_filing_jointly,
            self.married_filing_separately,
            self.head_of_household,
        ]
        .into_iter()
    }
}

/// Progressive rate schedules, one per supported filing status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketSchedules {
    pub single: Vec<TaxBracket>,
    pub married_filing_jointly: Vec<TaxBracket>,
    pub married_filing_separately: Vec<TaxBracket>,
    pub head_of_household: Vec<TaxBracket>,
}

impl BracketSchedules {
    pub fn get(
        &self,
        status: FilingStatusCode,
    ) -> Result<&[TaxBracket], ConfigurationError> {
        match status {
            FilingStatusCode::Single => Ok(&self.single),
            FilingStatusCode::MarriedFilingJointly => Ok(&self.married_filing_jointly),
            FilingStatusCode::MarriedFilingSeparately => Ok(&self.married_filing_separately),
            FilingStatusCode::HeadOfHousehold => Ok(&self.head_of_household),
            FilingStatusCode::QualifyingSurvivingSpouse => {
                Err(ConfigurationError::UnsupportedFilingStatus(status))
            }
        }
    }

    /// Replaces the schedule for one status.
    pub fn set(
        &mut self,
        status: FilingStatusCode,
        brackets: Vec<TaxBracket>,
    ) -> Result<(), ConfigurationError> {
        let slot = match status {
            FilingStatusCode::Single => &mut self.single,
            FilingStatusCode::MarriedFilingJointly => &mut self.married_filing_jointly,
            FilingStatusCode::MarriedFilingSeparately => &mut self.married_filing_separately,
            FilingStatusCode::HeadOfHousehold => &mut self.head_of_household,
            FilingStatusCode::QualifyingSurvivingSpouse => {
                return Err(ConfigurationError::UnsupportedFilingStatus(status));
            }
        };
        *slot = brackets;
        Ok(())
    }
}

/// Schedule SE rates and limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfEmploymentConstants {
    /// Maximum combined wages and SE earnings subject to social security tax.
    pub ss_wage_base: Decimal,
    /// Employer plus employee social security rate (12.4%).
    pub ss_tax_rate: Decimal,
    /// Employer plus employee Medicare rate (2.9%).
    pub medicare_tax_rate: Decimal,
    /// Additional Medicare tax rate (0.9%).
    pub additional_medicare_rate: Decimal,
    pub additional_medicare_threshold: FilingStatusAmounts,
    /// Share of net profit treated as net earnings (92.35%).
    pub net_earnings_factor: Decimal,
    /// Share of SE tax deductible from income (50%).
    pub deduction_factor: Decimal,
    /// Net profit below this amount owes no SE tax.
    pub min_se_threshold: Decimal,
}

/// The "$50 for every $1,000 over the threshold" rule shared by the child
/// and other-dependent credits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditPhaseOut {
    pub joint_threshold: Decimal,
    pub other_threshold: Decimal,
    pub step: Decimal,
    pub reduction_per_step: Decimal,
}

impl CreditPhaseOut {
    pub fn threshold(
        &self,
        status: FilingStatusCode,
    ) -> Decimal {
        if status.is_joint() {
            self.joint_threshold
        } else {
            self.other_threshold
        }
    }

    /// Reduction owed at `magi`; a partial step costs a full step.
    pub fn reduction(
        &self,
        magi: Decimal,
        status: FilingStatusCode,
    ) -> Decimal {
        phase_out_reduction(
            magi,
            self.threshold(status),
            self.step,
            self.reduction_per_step,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildCreditConstants {
    pub credit_per_child: Decimal,
    /// Per-child ceiling on the refundable (additional child tax credit) part.
    pub refundable_per_child: Decimal,
    /// Earned income below this floor earns no refundable credit.
    pub earned_income_floor: Decimal,
    /// Share of earned income above the floor that becomes refundable.
    pub refundable_rate: Decimal,
    pub phase_out: CreditPhaseOut,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherDependentCreditConstants {
    pub credit_per_dependent: Decimal,
    pub phase_out: CreditPhaseOut,
}

/// One row of the EITC table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EitcParameters {
    pub max_credit: Decimal,
    /// Earned income at which the phase-in reaches `max_credit`.
    pub earned_income_amount: Decimal,
    pub phase_out_start: Decimal,
    pub phase_out_completion: Decimal,
    pub joint_phase_out_start: Decimal,
    pub joint_phase_out_completion: Decimal,
}

impl EitcParameters {
    /// Phase-out `(start, completion)` pair for the filing status.
    pub fn phase_out_range(
        &self,
        status: FilingStatusCode,
    ) -> (Decimal, Decimal) {
        if status.is_joint() {
            (self.joint_phase_out_start, self.joint_phase_out_completion)
        } else {
            (self.phase_out_start, self.phase_out_completion)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarnedIncomeCreditConstants {
    pub investment_income_limit: Decimal,
    pub no_children: EitcParameters,
    pub one_child: EitcParameters,
    pub two_children: EitcParameters,
    pub three_or_more_children: EitcParameters,
}

impl EarnedIncomeCreditConstants {
    /// Largest child count with its own table row.
    pub const MAX_QUALIFYING_CHILDREN: u32 = 3;

    /// Clamps a child count onto the table's {0, 1, 2, 3+} rows.
    pub fn clamp_children(children: u32) -> u32 {
        children.min(Self::MAX_QUALIFYING_CHILDREN)
    }

    pub fn parameters(
        &self,
        children: u32,
    ) -> &EitcParameters {
        match Self::clamp_children(children) {
            0 => &self.no_children,
            1 => &self.one_child,
            2 => &self.two_children,
            _ => &self.three_or_more_children,
        }
    }

    fn rows(&self) -> [&EitcParameters; 4] {
        [
            &self.no_children,
            &self.one_child,
            &self.two_children,
            &self.three_or_more_children,
        ]
    }
}

/// Every figure the engine needs for one tax year.
///
/// Values are read-only once registered; see
/// [`ConstantsRegistry`](crate::constants::ConstantsRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxYearConstants {
    pub tax_year: i32,
    pub standard_deduction: FilingStatusAmounts,
    pub brackets: BracketSchedules,
    pub self_employment: SelfEmploymentConstants,
    pub child_credit: ChildCreditConstants,
    pub other_dependent_credit: OtherDependentCreditConstants,
    pub earned_income_credit: EarnedIncomeCreditConstants,
}

impl TaxYearConstants {
    /// Checks the table for values the calculators cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidConstants`] naming the first
    /// offending value.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let invalid = |reason: String| ConfigurationError::InvalidConstants {
            tax_year: self.tax_year,
            reason,
        };

        for status in FilingStatusCode::SUPPORTED {
            validate_schedule(self.brackets.get(status)?)
                .map_err(|reason| invalid(format!("{status} brackets: {reason}")))?;
        }

        if self.standard_deduction.iter().any(|d| d < Decimal::ZERO) {
            return Err(invalid("standard deduction must be non-negative".into()));
        }

        let se = &self.self_employment;
        for (name, rate) in [
            ("ss_tax_rate", se.ss_tax_rate),
            ("medicare_tax_rate", se.medicare_tax_rate),
            ("additional_medicare_rate", se.additional_medicare_rate),
            ("deduction_factor", se.deduction_factor),
        ] {
            if !is_rate(rate) {
                return Err(invalid(format!("{name} must be between 0 and 1, got {rate}")));
            }
        }
        if se.net_earnings_factor <= Decimal::ZERO || se.net_earnings_factor > Decimal::ONE {
            return Err(invalid(format!(
                "net_earnings_factor must be in (0, 1], got {}",
                se.net_earnings_factor
            )));
        }
        if se.ss_wage_base <= Decimal::ZERO {
            return Err(invalid(format!(
                "ss_wage_base must be positive, got {}",
                se.ss_wage_base
            )));
        }
        if se.min_se_threshold < Decimal::ZERO {
            return Err(invalid(format!(
                "min_se_threshold must be non-negative, got {}",
                se.min_se_threshold
            )));
        }
        if se.additional_medicare_threshold.iter().any(|t| t < Decimal::ZERO) {
            return Err(invalid("additional Medicare thresholds must be non-negative".into()));
        }

        let ctc = &self.child_credit;
        if ctc.credit_per_child < Decimal::ZERO || ctc.refundable_per_child < Decimal::ZERO {
            return Err(invalid("child credit amounts must be non-negative".into()));
        }
        if !is_rate(ctc.refundable_rate) {
            return Err(invalid(format!(
                "refundable_rate must be between 0 and 1, got {}",
                ctc.refundable_rate
            )));
        }
        validate_phase_out(&ctc.phase_out)
            .map_err(|reason| invalid(format!("child credit phase-out: {reason}")))?;

        let odc = &self.other_dependent_credit;
        if odc.credit_per_dependent < Decimal::ZERO {
            return Err(invalid("credit_per_dependent must be non-negative".into()));
        }
        validate_phase_out(&odc.phase_out)
            .map_err(|reason| invalid(format!("other dependent phase-out: {reason}")))?;

        let eitc = &self.earned_income_credit;
        if eitc.investment_income_limit < Decimal::ZERO {
            return Err(invalid("investment_income_limit must be non-negative".into()));
        }
        for (children, row) in eitc.rows().into_iter().enumerate() {
            validate_eitc_row(row)
                .map_err(|reason| invalid(format!("EITC row for {children} children: {reason}")))?;
        }

        Ok(())
    }
}

fn is_rate(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= Decimal::ONE
}

fn validate_schedule(brackets: &[TaxBracket]) -> Result<(), String> {
    let Some(first) = brackets.first() else {
        return Err("schedule is empty".into());
    };
    if first.min_income != Decimal::ZERO {
        return Err(format!("first bracket starts at {}, not 0", first.min_income));
    }

    let mut expected_min = Decimal::ZERO;
    let last = brackets.len() - 1;
    for (index, bracket) in brackets.iter().enumerate() {
        if !is_rate(bracket.tax_rate) {
            return Err(format!("rate {} is not between 0 and 1", bracket.tax_rate));
        }
        if bracket.min_income != expected_min {
            return Err(format!(
                "bracket {index} starts at {}, expected {expected_min}",
                bracket.min_income
            ));
        }
        match (bracket.max_income, index == last) {
            (None, true) => {}
            (None, false) => return Err(format!("bracket {index} is unbounded but not last")),
            (Some(_), true) => return Err("top bracket must be unbounded".into()),
            (Some(max), false) => {
                if max <= bracket.min_income {
                    return Err(format!("bracket {index} upper bound {max} is not increasing"));
                }
                expected_min = max;
            }
        }
    }
    Ok(())
}

fn validate_phase_out(phase_out: &CreditPhaseOut) -> Result<(), String> {
    if phase_out.step <= Decimal::ZERO {
        return Err(format!("step must be positive, got {}", phase_out.step));
    }
    if phase_out.reduction_per_step < Decimal::ZERO {
        return Err(format!(
            "reduction_per_step must be non-negative, got {}",
            phase_out.reduction_per_step
        ));
    }
    if phase_out.joint_threshold < Decimal::ZERO || phase_out.other_threshold < Decimal::ZERO {
        return Err("thresholds must be non-negative".into());
    }
    Ok(())
}

fn validate_eitc_row(row: &EitcParameters) -> Result<(), String> {
    if row.max_credit < Decimal::ZERO {
        return Err(format!("max_credit must be non-negative, got {}", row.max_credit));
    }
    if row.earned_income_amount <= Decimal::ZERO {
        return Err(format!(
            "earned_income_amount must be positive, got {}",
            row.earned_income_amount
        ));
    }
    if row.phase_out_completion <= row.phase_out_start {
        return Err("phase-out completion must exceed start".into());
    }
    if row.joint_phase_out_completion <= row.joint_phase_out_start {
        return Err("joint phase-out completion must exceed start".into());
    }
    Ok(())
}
