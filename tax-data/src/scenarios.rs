//! CSV loader for batches of return scenarios.
//!
//! ## CSV Format
//!
//! Column order does **not** matter (headers are matched by name). Only
//! `filing_status` is required; every other column may be left out or left
//! empty.
//!
//! | Column                         | Type    | Notes                                   |
//! |--------------------------------|---------|-----------------------------------------|
//! | `label`                        | string  | Defaults to `row N`                     |
//! | `tax_year`                     | integer | Defaults to the loader's year           |
//! | `filing_status`                | string  | `S`, `MFJ`, `MFS`, `HOH`, `QSS`         |
//! | `wages`                        | amount  | `$` and `,` allowed, `(x)` is negative  |
//! | `self_employment_profit`       | amount  |                                         |
//! | `withholding`                  | amount  |                                         |
//! | `investment_income`            | amount  |                                         |
//! | `qualifying_children`          | count   | Under 17 with a valid SSN               |
//! | `other_dependents`             | count   |                                         |
//! | `taxpayer_has_valid_ssn`       | flag    | `true`/`false`, `yes`/`no`, `1`/`0`     |
//! | `children_have_valid_ssn`      | flag    |                                         |
//! | `is_separated_spouse_for_eitc` | flag    |                                         |
//! | `married_separately_override`  | flag    |                                         |
//!
//! Cell contents never fail a load: unreadable amounts and counts become
//! zero, unknown filing statuses become single and unknown flags keep their
//! default, each with a warning.
//!
//! ### Example
//!
//! ```csv
//! label,filing_status,wages,self_employment_profit,withholding,qualifying_children
//! wage earner,S,"$40,000",,3000,
//! freelancer,S,,30000,,2
//! ```

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use tax_core::{
    DependentCounts, EligibilityFlags, FederalTaxRequest, FilingStatusCode, IncomeInputs,
    QuickEstimateRequest, count_from_f64,
};
use tracing::warn;

use crate::amount::parse_amount;

// ---------------------------------------------------------------------------
// Serde-compatible row that mirrors the CSV layout
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    tax_year: Option<i32>,
    filing_status: String,
    #[serde(default)]
    wages: Option<String>,
    #[serde(default)]
    self_employment_profit: Option<String>,
    #[serde(default)]
    withholding: Option<String>,
    #[serde(default)]
    investment_income: Option<String>,
    #[serde(default)]
    qualifying_children: Option<String>,
    #[serde(default)]
    other_dependents: Option<String>,
    #[serde(default)]
    taxpayer_has_valid_ssn: Option<String>,
    #[serde(default)]
    children_have_valid_ssn: Option<String>,
    #[serde(default)]
    is_separated_spouse_for_eitc: Option<String>,
    #[serde(default)]
    married_separately_override: Option<String>,
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Errors that can occur while loading scenario files.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioLoadError {
    /// The CSV structure is broken (bad quoting, ragged rows, missing
    /// `filing_status` header, non-integer `tax_year`).
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("cannot read scenario file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One labelled return from a scenario file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub label: String,
    pub request: FederalTaxRequest,
}

impl Scenario {
    /// The subset of the scenario the quick estimator reads.
    pub fn quick_request(&self) -> QuickEstimateRequest {
        let request = &self.request;
        QuickEstimateRequest::new(
            request.filing_status,
            request.income.wages,
            request.income.self_employment_profit,
            request.income.withholding,
            request.dependents.qualifying_children_under_17,
        )
        .with_tax_year(request.tax_year)
    }
}

// ---------------------------------------------------------------------------
// Cell conversion
// ---------------------------------------------------------------------------

fn amount_cell(cell: Option<&str>) -> Decimal {
    cell.map(parse_amount).unwrap_or(Decimal::ZERO)
}

fn count_cell(
    field: &'static str,
    cell: Option<&str>,
) -> u32 {
    let amount = amount_cell(cell);
    count_from_f64(field, amount.to_f64().unwrap_or(0.0))
}

fn flag_cell(
    field: &'static str,
    cell: Option<&str>,
    default: bool,
) -> bool {
    let Some(text) = cell.map(str::trim).filter(|t| !t.is_empty()) else {
        return default;
    };
    match text.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => true,
        "false" | "no" | "n" | "0" => false,
        _ => {
            warn!(field, input = %text, default, "unrecognised flag, using default");
            default
        }
    }
}

/// Convert a single CSV row. `row_number` is 1-based.
fn convert_row(
    row: CsvRow,
    row_number: usize,
    default_tax_year: i32,
) -> Scenario {
    let defaults = EligibilityFlags::default();
    let eligibility = EligibilityFlags {
        taxpayer_has_valid_ssn: flag_cell(
            "taxpayer_has_valid_ssn",
            row.taxpayer_has_valid_ssn.as_deref(),
            defaults.taxpayer_has_valid_ssn,
        ),
        children_have_valid_ssn: flag_cell(
            "children_have_valid_ssn",
            row.children_have_valid_ssn.as_deref(),
            defaults.children_have_valid_ssn,
        ),
        is_separated_spouse_for_eitc: flag_cell(
            "is_separated_spouse_for_eitc",
            row.is_separated_spouse_for_eitc.as_deref(),
            defaults.is_separated_spouse_for_eitc,
        ),
        married_separately_override: flag_cell(
            "married_separately_override",
            row.married_separately_override.as_deref(),
            defaults.married_separately_override,
        ),
    };

    let income = IncomeInputs::new(
        amount_cell(row.wages.as_deref()),
        amount_cell(row.self_employment_profit.as_deref()),
        amount_cell(row.withholding.as_deref()),
        amount_cell(row.investment_income.as_deref()),
    );
    let dependents = DependentCounts::new(
        count_cell("qualifying_children", row.qualifying_children.as_deref()),
        count_cell("other_dependents", row.other_dependents.as_deref()),
    );

    let request = FederalTaxRequest::new(FilingStatusCode::parse_or_default(&row.filing_status))
        .with_tax_year(row.tax_year.unwrap_or(default_tax_year))
        .with_income(income)
        .with_dependents(dependents)
        .with_eligibility(eligibility);

    let label = row
        .label
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| format!("row {row_number}"));

    Scenario { label, request }
}

// ---------------------------------------------------------------------------
// Core loader
// ---------------------------------------------------------------------------

/// Parse CSV text into scenarios, in file order.
///
/// Rows without a `tax_year` use `default_tax_year`.
///
/// # Errors
///
/// [`ScenarioLoadError::Parse`] when the CSV itself is malformed.
pub fn load_from_str(
    input: &str,
    default_tax_year: i32,
) -> Result<Vec<Scenario>, ScenarioLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| {
            let row = result?;
            Ok(convert_row(row, idx + 1, default_tax_year))
        })
        .collect()
}

/// Read a file from disk and delegate to [`load_from_str`].
pub fn load_from_file(
    path: &Path,
    default_tax_year: i32,
) -> Result<Vec<Scenario>, ScenarioLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ScenarioLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents, default_tax_year)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
