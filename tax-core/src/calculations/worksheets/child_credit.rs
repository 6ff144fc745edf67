//! Child tax credit and additional child tax credit.
//!
//! # Worksheet Structure
//!
//! | Line | Description |
//! |------|-------------|
//! | 1    | Qualifying children under 17 × per-child credit |
//! | 2    | Phase-out: $50 per started $1,000 of MAGI over the threshold |
//! | 3    | Credit after phase-out: Line 1 − Line 2 (not below zero) |
//! | 4    | Income tax left after the other dependent credit |
//! | 5    | Nonrefundable child tax credit: smaller of Line 3 or Line 4 |
//! | 6    | Earned income limit: (earned income − $2,500) × 15% |
//! | 7    | Per-child refundable cap: children × refundable limit |
//! | 8    | Credit left after Line 5: Line 3 − Line 5 |
//! | 9    | Additional child tax credit: smallest of Lines 6, 7 and 8 |
//!
//! All three bounds of Line 9 apply together; dropping any one of them
//! overstates the refund.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{non_negative, round_half_up};
use crate::models::{ChildCreditConstants, FilingStatusCode};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildCreditResult {
    pub qualifying_children: u32,

    /// Line 1.
    pub base_credit: Decimal,

    /// Line 2.
    pub phase_out_reduction: Decimal,

    /// Line 3.
    pub credit: Decimal,

    /// Line 5. Never more than the income tax available to it.
    pub nonrefundable_used: Decimal,

    /// Line 6.
    pub earned_income_limit: Decimal,

    /// Line 7.
    pub refundable_cap: Decimal,

    /// Line 8.
    pub remaining_credit: Decimal,

    /// Line 9, the additional child tax credit.
    pub refundable: Decimal,

    /// Credit neither used against tax nor refunded.
    pub forfeited: Decimal,
}

#[derive(Debug, Clone)]
pub struct ChildCreditCalculator<'a> {
    constants: &'a ChildCreditConstants,
}

impl<'a> ChildCreditCalculator<'a> {
    pub fn new(constants: &'a ChildCreditConstants) -> Self {
        Self { constants }
    }

    /// # Arguments
    ///
    /// * `children` - Qualifying children under 17
    /// * `magi` - Modified AGI (AGI in this engine)
    /// * `status` - Selects the phase-out threshold
    /// * `earned_income` - Wages plus net self-employment earnings
    /// * `income_tax_available` - Income tax left after the other dependent
    ///   credit has been applied
    pub fn calculate(
        &self,
        children: u32,
        magi: Decimal,
        status: FilingStatusCode,
        earned_income: Decimal,
        income_tax_available: Decimal,
    ) -> ChildCreditResult {
        if children == 0 {
            return ChildCreditResult::default();
        }
        let children_count = Decimal::from(children);

        // Lines 1-3
        let base_credit = children_count * self.constants.credit_per_child;
        let phase_out_reduction = self.constants.phase_out.reduction(magi, status);
        let credit = round_half_up(non_negative(base_credit - phase_out_reduction));

        // Lines 4-5
        let nonrefundable_used = credit.min(non_negative(income_tax_available));

        // Lines 6-9
        let earned_income_limit = self.earned_income_limit(earned_income);
        let refundable_cap = children_count * self.constants.refundable_per_child;
        let remaining_credit = credit - nonrefundable_used;
        let refundable = earned_income_limit
            .min(refundable_cap)
            .min(remaining_credit);

        let forfeited = remaining_credit - refundable;

        debug!(
            children,
            credit = %credit,
            nonrefundable_used = %nonrefundable_used,
            refundable = %refundable,
            "computed child tax credit"
        );

        ChildCreditResult {
            qualifying_children: children,
            base_credit,
            phase_out_reduction,
            credit,
            nonrefundable_used,
            earned_income_limit,
            refundable_cap,
            remaining_credit,
            refundable,
            forfeited,
        }
    }

    fn earned_income_limit(
        &self,
        earned_income: Decimal,
    ) -> Decimal {
        let over_floor = non_negative(earned_income - self.constants.earned_income_floor);
        round_half_up(over_floor * self.constants.refundable_rate)
    }
}
