//! Line-by-line worksheets, one per tax or credit.
//!
//! Each worksheet is a small calculator over borrowed constants that returns
//! a result struct exposing its intermediate lines. They are composed in
//! filing order by [`FederalTaxCalculator`](crate::calculations::FederalTaxCalculator).

pub mod bracket_tax;
pub mod child_credit;
pub mod earned_income_credit;
pub mod other_dependent_credit;
pub mod self_emp;

pub use bracket_tax::BracketTaxCalculator;
pub use child_credit::{ChildCreditCalculator, ChildCreditResult};
pub use earned_income_credit::{
    EarnedIncomeCreditCalculator, EarnedIncomeCreditInput, EarnedIncomeCreditResult,
    EitcIneligibility,
};
pub use other_dependent_credit::{OtherDependentCreditCalculator, OtherDependentCreditResult};
pub use self_emp::{SelfEmploymentTaxCalculator, SelfEmploymentTaxConfig, SelfEmploymentTaxResult};
