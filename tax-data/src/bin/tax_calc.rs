use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tax_core::{
    ConstantsRegistry, DEFAULT_TAX_YEAR, DependentCounts, FederalTaxRequest, FilingStatusCode,
    IncomeInputs, compute_federal_tax_with, compute_quick_estimate_with,
};
use tax_data::{
    Scenario, ScenarioReport, TaxBracketLoader, load_from_file, logging, parse_amount,
    render_json, render_table,
};
use tracing::{debug, info, warn};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Federal income tax calculator.
///
/// Computes one return from the command line, or a batch of returns from a
/// scenario CSV file, and prints the results to stdout.
#[derive(Debug, Parser)]
#[command(name = "tax-calc")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Scenario CSV file; when omitted the single-return flags are used.
    #[arg(short, long)]
    scenarios: Option<PathBuf>,

    /// Bracket CSV file overriding the built-in schedules for --tax-year.
    #[arg(short, long)]
    brackets: Option<PathBuf>,

    /// Tax year for returns that do not name one.
    #[arg(long, default_value_t = DEFAULT_TAX_YEAR)]
    tax_year: i32,

    /// Print quick estimates instead of full computations.
    #[arg(long, default_value_t = false)]
    quick: bool,

    /// Print JSON instead of a table.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Log filter (e.g. `debug` or `tax_core=trace`); overrides RUST_LOG.
    #[arg(long)]
    log_level: Option<String>,

    /// Filing status code: S, MFJ, MFS, HOH or QSS.
    #[arg(long, default_value = "S")]
    filing_status: String,

    /// W-2 wages.
    #[arg(long, default_value = "0")]
    wages: String,

    /// Schedule C net profit.
    #[arg(long, default_value = "0")]
    self_employment_profit: String,

    /// Federal income tax withheld.
    #[arg(long, default_value = "0")]
    withholding: String,

    /// Investment income (EITC test only).
    #[arg(long, default_value = "0")]
    investment_income: String,

    /// Qualifying children under 17.
    #[arg(long, default_value_t = 0)]
    children: u32,

    /// Dependents who are not qualifying children.
    #[arg(long, default_value_t = 0)]
    other_dependents: u32,
}

impl Cli {
    fn inline_scenario(&self) -> Scenario {
        let status = FilingStatusCode::parse_or_default(&self.filing_status);
        let request = FederalTaxRequest::new(status)
            .with_tax_year(self.tax_year)
            .with_income(IncomeInputs::new(
                parse_amount(&self.wages),
                parse_amount(&self.self_employment_profit),
                parse_amount(&self.withholding),
                parse_amount(&self.investment_income),
            ))
            .with_dependents(DependentCounts::new(self.children, self.other_dependents));
        Scenario {
            label: "command line".to_string(),
            request,
        }
    }
}

// ─── setup ───────────────────────────────────────────────────────────────────

fn build_registry(
    tax_year: i32,
    brackets: Option<&Path>,
) -> Result<ConstantsRegistry> {
    let mut registry =
        ConstantsRegistry::with_defaults().context("Built-in tax constants are invalid")?;

    if let Some(path) = brackets {
        let file =
            File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
        let records = TaxBracketLoader::parse(file)
            .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
        debug!(count = records.len(), "parsed bracket records");

        let mut constants = registry
            .resolve(tax_year)
            .with_context(|| format!("Cannot override brackets for tax year {tax_year}"))?
            .clone();
        let applied = TaxBracketLoader::apply(&mut constants, &records)
            .with_context(|| format!("Failed to apply brackets from: {}", path.display()))?;
        registry.register(constants)?;

        info!(tax_year, applied, "loaded bracket override");
    }

    Ok(registry)
}

fn run_scenario(
    registry: &ConstantsRegistry,
    scenario: &Scenario,
    quick: bool,
) -> ScenarioReport {
    if quick {
        let result = compute_quick_estimate_with(registry, &scenario.quick_request());
        ScenarioReport::new(scenario.label.clone(), result)
    } else {
        let result = compute_federal_tax_with(registry, &scenario.request);
        ScenarioReport::new(scenario.label.clone(), result)
    }
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level.as_deref())?;

    let registry = build_registry(cli.tax_year, cli.brackets.as_deref())?;

    let scenarios = match &cli.scenarios {
        Some(path) => load_from_file(path, cli.tax_year)
            .with_context(|| format!("Failed to load scenarios: {}", path.display()))?,
        None => vec![cli.inline_scenario()],
    };
    info!(count = scenarios.len(), quick = cli.quick, "running scenarios");

    let reports: Vec<ScenarioReport> = scenarios
        .iter()
        .map(|scenario| run_scenario(&registry, scenario, cli.quick))
        .collect();

    let failures = reports.iter().filter(|r| r.is_failure()).count();
    if failures > 0 {
        warn!(failures, "some scenarios could not be computed");
    }

    if cli.json {
        let json = render_json(&reports).context("Failed to serialize results")?;
        println!("{json}");
    } else {
        print!("{}", render_table(&reports));
    }

    Ok(())
}
