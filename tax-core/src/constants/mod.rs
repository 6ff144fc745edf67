//! Per-year tax constants and the registry that serves them.
//!
//! Tables are plain values: built once, validated on registration and never
//! mutated afterwards. Callers resolve the year they need at the call
//! boundary and pass the table down by reference.

mod registry;
mod year_2025;

pub use registry::{ConfigurationError, ConstantsRegistry, DEFAULT_TAX_YEAR, default_registry};
