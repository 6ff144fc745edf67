use std::collections::BTreeMap;
use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{ConfigurationError, FilingStatusCode, TaxBracket, TaxYearConstants};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur when loading tax bracket data.
#[derive(Debug, Error)]
pub enum TaxBracketLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("No brackets for tax year {0} in the file")]
    TaxYearNotFound(i32),

    #[error("Rejected bracket override: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl From<csv::Error> for TaxBracketLoaderError {
    fn from(err: csv::Error) -> Self {
        TaxBracketLoaderError::CsvParse(err.to_string())
    }
}

/// Maps IRS schedule codes to filing statuses.
///
/// - Schedule X → Single
/// - Schedule Y-1 → Married Filing Jointly and Qualifying Surviving Spouse
/// - Schedule Y-2 → Married Filing Separately
/// - Schedule Z → Head of Household
fn schedule_to_filing_statuses(
    schedule: &str
) -> Result<&'static [FilingStatusCode], TaxBracketLoaderError> {
    match schedule.trim() {
        "X" => Ok(&[FilingStatusCode::Single]),
        "Y-1" => Ok(&[
            FilingStatusCode::MarriedFilingJointly,
            FilingStatusCode::QualifyingSurvivingSpouse,
        ]),
        "Y-2" => Ok(&[FilingStatusCode::MarriedFilingSeparately]),
        "Z" => Ok(&[FilingStatusCode::HeadOfHousehold]),
        _ => Err(TaxBracketLoaderError::InvalidSchedule(schedule.to_string())),
    }
}

/// A single record from the tax brackets CSV file.
///
/// - `tax_year`: The tax year (e.g., 2025)
/// - `schedule`: The IRS schedule code (X, Y-1, Y-2, Z)
/// - `min_income`: The minimum income for this bracket
/// - `max_income`: The maximum income for this bracket (empty for unlimited)
/// - `rate`: The marginal tax rate as a decimal (e.g., 0.10 for 10%)
///
/// Extra columns such as a published `base_tax` are ignored; the engine
/// derives it from the bands.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaxBracketRecord {
    pub tax_year: i32,
    pub schedule: String,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for bracket schedules from CSV files.
///
/// The CSV uses IRS schedule codes (X, Y-1, Y-2, Z) which are mapped to the
/// engine's filing statuses. Loaded schedules replace the ones in a year's
/// [`TaxYearConstants`].
pub struct TaxBracketLoader;

impl TaxBracketLoader {
    /// Parse tax bracket records from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or
    /// a string slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<TaxBracketRecord>, TaxBracketLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: TaxBracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Replace the bracket schedules of `constants` with the records for its
    /// tax year.
    ///
    /// Records for other years are ignored. Each schedule's rows are sorted
    /// by `min_income` before use. Schedule Y-1 also names the qualifying
    /// surviving spouse status, which has no tables in the engine and is
    /// skipped with a warning. Statuses without rows in the file keep their
    /// current schedule.
    ///
    /// The updated table must pass validation; on any error `constants` is
    /// left untouched. Returns the number of brackets applied.
    pub fn apply(
        constants: &mut TaxYearConstants,
        records: &[TaxBracketRecord],
    ) -> Result<usize, TaxBracketLoaderError> {
        let tax_year = constants.tax_year;

        let mut groups: BTreeMap<&str, Vec<&TaxBracketRecord>> = BTreeMap::new();
        for record in records.iter().filter(|r| r.tax_year == tax_year) {
            groups
                .entry(record.schedule.trim())
                .or_default()
                .push(record);
        }
        if groups.is_empty() {
            return Err(TaxBracketLoaderError::TaxYearNotFound(tax_year));
        }

        let mut updated = constants.clone();
        let mut applied = 0;

        for (schedule, mut group_records) in groups {
            let statuses = schedule_to_filing_statuses(schedule)?;
            group_records.sort_by(|a, b| a.min_income.cmp(&b.min_income));
            let brackets: Vec<TaxBracket> = group_records
                .iter()
                .map(|r| TaxBracket::new(r.min_income, r.max_income, r.rate))
                .collect();

            for &status in statuses {
                if !FilingStatusCode::SUPPORTED.contains(&status) {
                    warn!(schedule, status = %status, "no engine tables for status, skipping");
                    continue;
                }
                debug!(schedule, status = %status, count = brackets.len(), "replacing brackets");
                applied += brackets.len();
                updated.brackets.set(status, brackets.clone())?;
            }
        }

        updated.validate()?;
        *constants = updated;
        Ok(applied)
    }
}
