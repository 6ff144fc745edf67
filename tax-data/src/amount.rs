use rust_decimal::Decimal;
use thiserror::Error;
use tracing::warn;

/// Error returned when text cannot be read as a currency amount.
#[derive(Debug, Error)]
#[error("invalid amount '{input}': {source}")]
pub struct ParseAmountError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Trims whitespace and drops the dollar sign and thousands separators.
/// Returns the cleaned text and whether it was wrapped in parentheses.
fn normalize_amount_input(s: &str) -> (String, bool) {
    let trimmed = s.trim();
    let (inner, negative) = match trimmed
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        Some(inner) => (inner, true),
        None => (trimmed, false),
    };
    let cleaned = inner
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();
    (cleaned, negative)
}

/// Parses currency text strictly.
///
/// Accepts `$` and comma separators (`"$1,234.56"`) and accounting-style
/// negatives (`"(500)"`). Empty or whitespace-only input is zero.
pub fn try_parse_amount(s: &str) -> Result<Decimal, ParseAmountError> {
    let (normalized, negative) = normalize_amount_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    let amount: Decimal = normalized.parse().map_err(|e| ParseAmountError {
        input: s.to_string(),
        source: e,
    })?;
    Ok(if negative { -amount } else { amount })
}

/// Parses currency text leniently: anything unreadable becomes zero and is
/// logged. Negative results are left for the engine to clamp.
pub fn parse_amount(s: &str) -> Decimal {
    try_parse_amount(s).unwrap_or_else(|error| {
        warn!(input = %s, %error, "unreadable amount treated as zero");
        Decimal::ZERO
    })
}
