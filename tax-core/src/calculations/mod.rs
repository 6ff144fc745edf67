//! Federal income tax calculations.
//!
//! The worksheets compute one tax or credit each; [`federal_tax`] composes
//! them in filing order into the authoritative result, and
//! [`quick_estimate`] offers a rough preview for incomplete intake data.

pub mod common;
pub mod federal_tax;
pub mod quick_estimate;
pub mod worksheets;

pub use federal_tax::{ComputationResult, FederalTaxCalculator, FederalTaxRequest};
pub use quick_estimate::{QuickEstimate, QuickEstimateRequest, QuickEstimator};
pub use worksheets::*;
