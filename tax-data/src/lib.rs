//! Hosting-side tooling for the tax engine: bracket overrides and scenario
//! batches loaded from CSV, result rendering and CLI logging.

mod amount;
pub mod loader;
pub mod logging;
pub mod report;
pub mod scenarios;

pub use amount::{ParseAmountError, parse_amount, try_parse_amount};
pub use loader::{TaxBracketLoader, TaxBracketLoaderError, TaxBracketRecord};
pub use report::{Outcome, ScenarioReport, render_json, render_table};
pub use scenarios::{Scenario, ScenarioLoadError, load_from_file, load_from_str};
