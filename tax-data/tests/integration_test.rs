//! Integration tests running CSV fixtures through the engine.

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use tax_core::{
    ConstantsRegistry, FilingStatusCode, TaxYearConstants, compute_federal_tax_with,
    compute_quick_estimate_with,
};
use tax_data::{
    Outcome, ScenarioReport, TaxBracketLoader, TaxBracketLoaderError, load_from_str, render_table,
};

const TEST_CSV_2025: &str = include_str!("../test-data/tax_brackets_2025.csv");
const FLAT_SINGLE_2025: &str = include_str!("../test-data/flat_single_2025.csv");
const SCENARIOS: &str = include_str!("../test-data/scenarios.csv");

fn registry_with(csv: &str) -> Result<ConstantsRegistry, TaxBracketLoaderError> {
    let records = TaxBracketLoader::parse(csv.as_bytes())?;
    let mut constants = TaxYearConstants::tax_year_2025();
    TaxBracketLoader::apply(&mut constants, &records)?;
    let mut registry = ConstantsRegistry::new();
    registry.register(constants)?;
    Ok(registry)
}

fn run_all(
    registry: &ConstantsRegistry,
    quick: bool,
) -> Vec<ScenarioReport> {
    load_from_str(SCENARIOS, 2025)
        .expect("scenario fixture parses")
        .iter()
        .map(|s| {
            if quick {
                ScenarioReport::new(
                    s.label.clone(),
                    compute_quick_estimate_with(registry, &s.quick_request()),
                )
            } else {
                ScenarioReport::new(
                    s.label.clone(),
                    compute_federal_tax_with(registry, &s.request),
                )
            }
        })
        .collect()
}

fn computed(report: &ScenarioReport) -> &tax_core::ComputationResult {
    match &report.outcome {
        Outcome::Computed(result) => result,
        other => panic!("expected a computed result for {}, got {other:?}", report.label),
    }
}

#[test]
fn test_published_schedules_reproduce_builtin_results() {
    let loaded = registry_with(TEST_CSV_2025).expect("fixture applies");
    let builtin = ConstantsRegistry::with_defaults().unwrap();

    let from_file = run_all(&loaded, false);
    let from_builtin = run_all(&builtin, false);

    assert_eq!(from_file, from_builtin);
}

#[test]
fn test_scenario_fixture_results() {
    let registry = ConstantsRegistry::with_defaults().unwrap();

    let reports = run_all(&registry, false);

    assert_eq!(reports.len(), 4);
    assert_eq!(computed(&reports[0]).refund_or_owed, dec!(328.50));
    assert_eq!(computed(&reports[1]).refund_or_owed, dec!(5141.96));
    assert_eq!(computed(&reports[2]).child_tax_credit.credit, dec!(4350));
    assert!(reports[3].is_failure());
}

#[test]
fn test_flat_override_changes_only_single() {
    let registry = registry_with(FLAT_SINGLE_2025).expect("fixture applies");

    let reports = run_all(&registry, false);

    // 24,250 × 15%
    let wage_earner = computed(&reports[0]);
    assert_eq!(wage_earner.filing_status, FilingStatusCode::Single);
    assert_eq!(wage_earner.income_tax_before_credits, dec!(3637.50));
    assert_eq!(wage_earner.refund_or_owed, dec!(-637.50));

    let joint = computed(&reports[2]);
    assert_eq!(joint.income_tax_before_credits, dec!(74134.24));
}

#[test]
fn test_quick_mode_over_fixture() {
    let registry = ConstantsRegistry::with_defaults().unwrap();

    let reports = run_all(&registry, true);

    let Outcome::Estimated(estimate) = &reports[0].outcome else {
        panic!("expected an estimate, got {:?}", reports[0].outcome);
    };
    assert_eq!(estimate.estimated_refund_or_owed, dec!(328.50));
    assert!(reports[3].is_failure());

    let table = render_table(&reports);
    assert_eq!(table.lines().count(), 5);
}

#[test]
fn test_bracket_file_for_other_year_is_rejected() {
    let csv = "tax_year,schedule,min_income,max_income,rate\n2024,X,0,,0.10\n";

    let result = registry_with(csv);

    assert!(matches!(result, Err(TaxBracketLoaderError::TaxYearNotFound(2025))));
}
