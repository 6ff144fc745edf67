//! Federal individual income tax engine.
//!
//! Given filing status, income, withholding and dependents, computes
//! self-employment tax, AGI, taxable income, bracket tax, the other dependent
//! credit, the child tax credit (with its refundable portion) and the earned
//! income credit, then reports the refund or amount owed.
//!
//! The engine does no I/O. Tax-year figures live in [`TaxYearConstants`] and
//! are looked up through a [`ConstantsRegistry`].

pub mod calculations;
pub mod constants;
pub mod models;

pub use calculations::federal_tax::{compute_federal_tax, compute_federal_tax_with};
pub use calculations::quick_estimate::{compute_quick_estimate, compute_quick_estimate_with};
pub use calculations::{
    ComputationResult, FederalTaxCalculator, FederalTaxRequest, QuickEstimate,
    QuickEstimateRequest, QuickEstimator,
};
pub use constants::{ConfigurationError, ConstantsRegistry, DEFAULT_TAX_YEAR, default_registry};
pub use models::*;
