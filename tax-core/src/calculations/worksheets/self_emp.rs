//! Self-employment tax (Schedule SE) calculations.
//!
//! # Worksheet Structure
//!
//! | Line | Description |
//! |------|-------------|
//! | 1    | Net profit from self-employment |
//! | 2    | Net earnings: Line 1 × 92.35% |
//! | 3    | Social security wage base |
//! | 4    | W-2 wages subject to social security tax |
//! | 5    | Remaining base: Line 3 − Line 4 (not below zero) |
//! | 6    | Smaller of Line 2 or Line 5 |
//! | 7    | Social security tax: Line 6 × 12.4% |
//! | 8    | Medicare tax: Line 2 × 2.9% (no wage cap) |
//! | 9    | Additional Medicare tax: 0.9% of (Line 4 + Line 2) over the filing-status threshold |
//! | 10   | Self-employment tax: Lines 7 + 8 + 9 |
//! | 11   | Deductible half: Line 10 × 50% |
//!
//! # Minimum Threshold
//!
//! Net profit below $400 owes no self-employment tax and every line is zero.
//! The floor comes from [`SelfEmploymentConstants::min_se_threshold`].
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::{SelfEmploymentTaxCalculator, SelfEmploymentTaxConfig};
//! use tax_core::{FilingStatusCode, TaxYearConstants};
//!
//! let constants = TaxYearConstants::tax_year_2025();
//! let config =
//!     SelfEmploymentTaxConfig::from_constants(&constants, FilingStatusCode::Single).unwrap();
//!
//! let result = SelfEmploymentTaxCalculator::new(config).calculate(
//!     dec!(100000.00), // net profit
//!     dec!(50000.00),  // W-2 wages
//! );
//!
//! assert_eq!(result.self_employment_tax, dec!(14129.55));
//! assert_eq!(result.deductible_half, dec!(7064.78));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::common::{non_negative, round_half_up};
use crate::constants::ConfigurationError;
use crate::models::{FilingStatusCode, SelfEmploymentConstants, TaxYearConstants};

/// Rates and limits for one filing status.
///
/// Built from [`SelfEmploymentConstants`] with the Additional Medicare
/// threshold already resolved for the filing status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfEmploymentTaxConfig {
    pub ss_wage_base: Decimal,
    pub ss_tax_rate: Decimal,
    pub medicare_tax_rate: Decimal,
    pub additional_medicare_rate: Decimal,
    pub additional_medicare_threshold: Decimal,
    pub net_earnings_factor: Decimal,
    pub deduction_factor: Decimal,
    pub min_se_threshold: Decimal,
}

impl SelfEmploymentTaxConfig {
    /// Resolves the configuration for `status`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnsupportedFilingStatus`] for a status
    /// without an Additional Medicare threshold.
    pub fn from_constants(
        constants: &TaxYearConstants,
        status: FilingStatusCode,
    ) -> Result<Self, ConfigurationError> {
        let SelfEmploymentConstants {
            ss_wage_base,
            ss_tax_rate,
            medicare_tax_rate,
            additional_medicare_rate,
            additional_medicare_threshold,
            net_earnings_factor,
            deduction_factor,
            min_se_threshold,
        } = &constants.self_employment;

        Ok(Self {
            ss_wage_base: *ss_wage_base,
            ss_tax_rate: *ss_tax_rate,
            medicare_tax_rate: *medicare_tax_rate,
            additional_medicare_rate: *additional_medicare_rate,
            additional_medicare_threshold: additional_medicare_threshold.get(status)?,
            net_earnings_factor: *net_earnings_factor,
            deduction_factor: *deduction_factor,
            min_se_threshold: *min_se_threshold,
        })
    }
}

/// Every line of the self-employment worksheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfEmploymentTaxResult {
    /// Net profit as supplied (Line 1).
    pub net_profit: Decimal,

    /// Net earnings after the 92.35% factor (Line 2).
    pub net_earnings: Decimal,

    /// Earnings still under the shared social security wage base (Line 6).
    pub ss_taxable_earnings: Decimal,

    /// Social security portion (Line 7).
    pub social_security_tax: Decimal,

    /// Uncapped Medicare portion (Line 8).
    pub medicare_tax: Decimal,

    /// Additional Medicare portion (Line 9).
    pub additional_medicare_tax: Decimal,

    /// Total self-employment tax (Line 10).
    pub self_employment_tax: Decimal,

    /// Half of the total rounded half-up to cents, deducted in arriving at
    /// AGI (Line 11). An odd-cent total leaves this a half cent above the
    /// exact half.
    ///
    /// This is an adjustment to income, never a credit.
    pub deductible_half: Decimal,

    /// `true` when net profit was under the filing floor and every other
    /// line is zero.
    pub below_threshold: bool,
}

impl SelfEmploymentTaxResult {
    fn below_threshold(net_profit: Decimal) -> Self {
        Self {
            net_profit,
            below_threshold: true,
            ..Self::default()
        }
    }
}

/// Calculator for Schedule SE.
#[derive(Debug, Clone)]
pub struct SelfEmploymentTaxCalculator {
    config: SelfEmploymentTaxConfig,
}

impl SelfEmploymentTaxCalculator {
    pub fn new(config: SelfEmploymentTaxConfig) -> Self {
        Self { config }
    }

    /// Runs every line of the worksheet.
    ///
    /// # Arguments
    ///
    /// * `net_profit` - Net self-employment profit (non-negative)
    /// * `w2_wages` - Wages already subject to social security tax
    pub fn calculate(
        &self,
        net_profit: Decimal,
        w2_wages: Decimal,
    ) -> SelfEmploymentTaxResult {
        if net_profit < self.config.min_se_threshold {
            if net_profit > Decimal::ZERO {
                warn!(
                    net_profit = %net_profit,
                    threshold = %self.config.min_se_threshold,
                    "SE income below minimum threshold; no SE tax due"
                );
            }
            return SelfEmploymentTaxResult::below_threshold(net_profit);
        }

        // Line 2
        let net_earnings = self.net_earnings(net_profit);

        // Lines 3-6
        let ss_taxable_earnings = self.ss_taxable_earnings(net_earnings, w2_wages);

        // Line 7
        let social_security_tax = round_half_up(ss_taxable_earnings * self.config.ss_tax_rate);

        // Line 8
        let medicare_tax = round_half_up(net_earnings * self.config.medicare_tax_rate);

        // Line 9
        let additional_medicare_tax = self.additional_medicare_tax(net_earnings, w2_wages);

        // Line 10
        let self_employment_tax = social_security_tax + medicare_tax + additional_medicare_tax;

        // Line 11
        let deductible_half = round_half_up(self_employment_tax * self.config.deduction_factor);

        debug!(
            net_earnings = %net_earnings,
            social_security_tax = %social_security_tax,
            medicare_tax = %medicare_tax,
            additional_medicare_tax = %additional_medicare_tax,
            self_employment_tax = %self_employment_tax,
            "computed self-employment tax"
        );

        SelfEmploymentTaxResult {
            net_profit,
            net_earnings,
            ss_taxable_earnings,
            social_security_tax,
            medicare_tax,
            additional_medicare_tax,
            self_employment_tax,
            deductible_half,
            below_threshold: false,
        }
    }

    fn net_earnings(
        &self,
        net_profit: Decimal,
    ) -> Decimal {
        round_half_up(net_profit * self.config.net_earnings_factor)
    }

    /// The wage base is shared: W-2 wages use it up first.
    fn ss_taxable_earnings(
        &self,
        net_earnings: Decimal,
        w2_wages: Decimal,
    ) -> Decimal {
        let remaining = non_negative(self.config.ss_wage_base - w2_wages);
        if remaining.is_zero() {
            debug!(
                ss_wage_base = %self.config.ss_wage_base,
                w2_wages = %w2_wages,
                "wages exhaust the social security wage base"
            );
        }
        net_earnings.min(remaining)
    }

    fn additional_medicare_tax(
        &self,
        net_earnings: Decimal,
        w2_wages: Decimal,
    ) -> Decimal {
        let excess =
            non_negative(w2_wages + net_earnings - self.config.additional_medicare_threshold);
        round_half_up(excess * self.config.additional_medicare_rate)
    }
}
