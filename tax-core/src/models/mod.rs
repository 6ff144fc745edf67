mod filing_status;
mod inputs;
mod tax_bracket;
mod tax_year_constants;

pub use filing_status::FilingStatusCode;
pub use inputs::{
    DependentCounts, EligibilityFlags, IncomeInputs, MAX_AMOUNT, amount_from_f64, clamp_amount,
    count_from_f64,
};
pub use tax_bracket::TaxBracket;
pub use tax_year_constants::{
    BracketSchedules, ChildCreditConstants, CreditPhaseOut, EarnedIncomeCreditConstants,
    EitcParameters, FilingStatusAmounts, OtherDependentCreditConstants, SelfEmploymentConstants,
    TaxYearConstants,
};
