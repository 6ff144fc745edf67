use std::collections::BTreeMap;
use std::sync::OnceLock;

use thiserror::Error;
use tracing::debug;

use crate::models::{FilingStatusCode, TaxYearConstants};

/// Year used when a caller does not name one.
pub const DEFAULT_TAX_YEAR: i32 = 2025;

/// The only failure the engine reports: there is no safe numeric default
/// for a missing or broken schedule.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("no tax constants registered for tax year {0}")]
    UnsupportedTaxYear(i32),

    #[error("filing status {0} has no deduction or bracket tables")]
    UnsupportedFilingStatus(FilingStatusCode),

    #[error("invalid constants for tax year {tax_year}: {reason}")]
    InvalidConstants { tax_year: i32, reason: String },
}

/// Immutable constants keyed by tax year.
///
/// Typical lifetime:
/// 1. Create with [`ConstantsRegistry::with_defaults`] (or `new` for tests
///    that want synthetic tables only).
/// 2. Call `register` for any additional or overriding years.
/// 3. Call `resolve` once per computation.
#[derive(Debug, Clone, Default)]
pub struct ConstantsRegistry {
    years: BTreeMap<i32, TaxYearConstants>,
}

impl ConstantsRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in year.
    pub fn with_defaults() -> Result<Self, ConfigurationError> {
        let mut registry = Self::new();
        registry.register(TaxYearConstants::tax_year_2025())?;
        Ok(registry)
    }

    /// Validate and register a year's constants.
    ///
    /// A table already registered for the same year is replaced.
    pub fn register(
        &mut self,
        constants: TaxYearConstants,
    ) -> Result<(), ConfigurationError> {
        constants.validate()?;
        debug!(tax_year = constants.tax_year, "registered tax year constants");
        self.years.insert(constants.tax_year, constants);
        Ok(())
    }

    /// Registered years in ascending order.
    pub fn available_years(&self) -> Vec<i32> {
        self.years.keys().copied().collect()
    }

    /// Look up the constants for `tax_year`.
    pub fn resolve(
        &self,
        tax_year: i32,
    ) -> Result<&TaxYearConstants, ConfigurationError> {
        self.years
            .get(&tax_year)
            .ok_or(ConfigurationError::UnsupportedTaxYear(tax_year))
    }
}

/// Process-wide registry of the built-in years, built on first use.
pub fn default_registry() -> Result<&'static ConstantsRegistry, ConfigurationError> {
    static DEFAULT: OnceLock<Result<ConstantsRegistry, ConfigurationError>> = OnceLock::new();
    DEFAULT
        .get_or_init(ConstantsRegistry::with_defaults)
        .as_ref()
        .map_err(Clone::clone)
}
