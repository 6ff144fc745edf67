//! Credit for other dependents.
//!
//! $500 per non-CTC dependent, reduced by $50 for each started $1,000 of
//! MAGI over the threshold. Nonrefundable: only the part that fits under the
//! gross income tax is used, and the rest is forfeited rather than passed on
//! to any other credit.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{non_negative, round_half_up};
use crate::models::{FilingStatusCode, OtherDependentCreditConstants};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherDependentCreditResult {
    pub dependents: u32,
    pub base_credit: Decimal,
    pub phase_out_reduction: Decimal,
    /// Credit after phase-out, before the income tax limit.
    pub credit: Decimal,
    /// Portion applied against income tax.
    pub used: Decimal,
    /// Portion lost for lack of income tax.
    pub forfeited: Decimal,
}

#[derive(Debug, Clone)]
pub struct OtherDependentCreditCalculator<'a> {
    constants: &'a OtherDependentCreditConstants,
}

impl<'a> OtherDependentCreditCalculator<'a> {
    pub fn new(constants: &'a OtherDependentCreditConstants) -> Self {
        Self { constants }
    }

    /// # Arguments
    ///
    /// * `dependents` - Dependents who are not CTC-qualifying children
    /// * `magi` - Modified AGI (AGI in this engine)
    /// * `status` - Selects the phase-out threshold
    /// * `income_tax_available` - Gross income tax the credit may offset
    pub fn calculate(
        &self,
        dependents: u32,
        magi: Decimal,
        status: FilingStatusCode,
        income_tax_available: Decimal,
    ) -> OtherDependentCreditResult {
        if dependents == 0 {
            return OtherDependentCreditResult::default();
        }

        let base_credit = Decimal::from(dependents) * self.constants.credit_per_dependent;
        let phase_out_reduction = self.constants.phase_out.reduction(magi, status);
        let credit = round_half_up(non_negative(base_credit - phase_out_reduction));
        let used = credit.min(non_negative(income_tax_available));
        let forfeited = credit - used;

        debug!(
            dependents,
            credit = %credit,
            used = %used,
            forfeited = %forfeited,
            "computed other dependent credit"
        );

        OtherDependentCreditResult {
            dependents,
            base_credit,
            phase_out_reduction,
            credit,
            used,
            forfeited,
        }
    }
}
