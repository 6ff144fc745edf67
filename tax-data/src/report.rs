//! Plain-text and JSON rendering of batch results.

use std::fmt::Write;

use serde::Serialize;
use tax_core::{ComputationResult, ConfigurationError, QuickEstimate};

/// The outcome of one scenario, either a full result or a quick estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Computed(Box<ComputationResult>),
    Estimated(QuickEstimate),
    Failed { error: String },
}

impl<T> From<Result<T, ConfigurationError>> for Outcome
where
    T: Into<Outcome>,
{
    fn from(result: Result<T, ConfigurationError>) -> Self {
        match result {
            Ok(value) => value.into(),
            Err(error) => Outcome::Failed {
                error: error.to_string(),
            },
        }
    }
}

impl From<ComputationResult> for Outcome {
    fn from(result: ComputationResult) -> Self {
        Outcome::Computed(Box::new(result))
    }
}

impl From<QuickEstimate> for Outcome {
    fn from(estimate: QuickEstimate) -> Self {
        Outcome::Estimated(estimate)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    pub label: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl ScenarioReport {
    pub fn new(
        label: impl Into<String>,
        outcome: impl Into<Outcome>,
    ) -> Self {
        Self {
            label: label.into(),
            outcome: outcome.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failed { .. })
    }
}

const LABEL_WIDTH: usize = 20;
const AMOUNT_WIDTH: usize = 12;

/// Renders reports as an aligned table. Full results and quick estimates
/// get their own column sets; a batch normally holds only one kind.
pub fn render_table(reports: &[ScenarioReport]) -> String {
    let mut out = String::new();
    let full = reports
        .iter()
        .any(|r| matches!(r.outcome, Outcome::Computed(_)));

    if full {
        let _ = writeln!(
            out,
            "{:<LABEL_WIDTH$} {:>6} {:>AMOUNT_WIDTH$} {:>AMOUNT_WIDTH$} {:>AMOUNT_WIDTH$} {:>AMOUNT_WIDTH$} {:>AMOUNT_WIDTH$} {:>8}",
            "scenario", "status", "agi", "taxable", "total_tax", "credits", "refund", "eff_rate"
        );
    } else {
        let _ = writeln!(
            out,
            "{:<LABEL_WIDTH$} {:>AMOUNT_WIDTH$} {:>AMOUNT_WIDTH$} {:>AMOUNT_WIDTH$}",
            "scenario", "agi", "est_credits", "est_refund"
        );
    }

    for report in reports {
        let label = &report.label;
        let _ = match &report.outcome {
            Outcome::Computed(result) => writeln!(
                out,
                "{:<LABEL_WIDTH$} {:>6} {:>AMOUNT_WIDTH$} {:>AMOUNT_WIDTH$} {:>AMOUNT_WIDTH$} {:>AMOUNT_WIDTH$} {:>AMOUNT_WIDTH$} {:>8}",
                label,
                result.filing_status.as_str(),
                result.adjusted_gross_income.to_string(),
                result.taxable_income.to_string(),
                result.total_tax.to_string(),
                (result.nonrefundable_credits_used() + result.refundable_credits).to_string(),
                result.refund_or_owed.to_string(),
                result.effective_tax_rate.to_string(),
            ),
            Outcome::Estimated(estimate) => writeln!(
                out,
                "{:<LABEL_WIDTH$} {:>AMOUNT_WIDTH$} {:>AMOUNT_WIDTH$} {:>AMOUNT_WIDTH$}",
                label,
                estimate.adjusted_gross_income.to_string(),
                estimate.estimated_credits.to_string(),
                estimate.estimated_refund_or_owed.to_string(),
            ),
            Outcome::Failed { error } => writeln!(out, "{label:<LABEL_WIDTH$} error: {error}"),
        };
    }
    out
}

/// Renders reports as a pretty-printed JSON array.
pub fn render_json(reports: &[ScenarioReport]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(reports)
}
