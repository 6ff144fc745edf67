use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilingStatusCode {
    Single,
    MarriedFilingJointly,
    MarriedFilingSeparately,
    HeadOfHousehold,
    /// Offered to callers but not backed by any deduction or bracket table.
    /// Every lookup for this status fails with a configuration error.
    QualifyingSurvivingSpouse,
}

impl FilingStatusCode {
    /// Statuses the engine has constants for.
    pub const SUPPORTED: [FilingStatusCode; 4] = [
        Self::Single,
        Self::MarriedFilingJointly,
        Self::MarriedFilingSeparately,
        Self::HeadOfHousehold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "S",
            Self::MarriedFilingJointly => "MFJ",
            Self::MarriedFilingSeparately => "MFS",
            Self::HeadOfHousehold => "HOH",
            Self::QualifyingSurvivingSpouse => "QSS",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "S" => Some(Self::Single),
            "MFJ" => Some(Self::MarriedFilingJointly),
            "MFS" => Some(Self::MarriedFilingSeparately),
            "HOH" => Some(Self::HeadOfHousehold),
            "QSS" => Some(Self::QualifyingSurvivingSpouse),
            _ => None,
        }
    }

    /// Lenient variant of [`FilingStatusCode::parse`] for boundary input.
    ///
    /// Unknown text falls back to [`FilingStatusCode::Single`] instead of
    /// failing, so a malformed form field still yields a computation.
    pub fn parse_or_default(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| {
            warn!(input = %s, "unrecognised filing status; defaulting to single");
            Self::Single
        })
    }

    /// Whether the joint-return thresholds (CTC/ODC phase-out, EITC
    /// phase-out pair) apply.
    pub fn is_joint(&self) -> bool {
        matches!(self, Self::MarriedFilingJointly)
    }
}

impl fmt::Display for FilingStatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_accepts_known_codes() {
        assert_eq!(FilingStatusCode::parse("S"), Some(FilingStatusCode::Single));
        assert_eq!(
            FilingStatusCode::parse("MFJ"),
            Some(FilingStatusCode::MarriedFilingJointly)
        );
        assert_eq!(
            FilingStatusCode::parse("MFS"),
            Some(FilingStatusCode::MarriedFilingSeparately)
        );
        assert_eq!(
            FilingStatusCode::parse("HOH"),
            Some(FilingStatusCode::HeadOfHousehold)
        );
        assert_eq!(
            FilingStatusCode::parse("QSS"),
            Some(FilingStatusCode::QualifyingSurvivingSpouse)
        );
    }

    #[test]
    fn parse_is_case_and_whitespace_insensitive() {
        assert_eq!(
            FilingStatusCode::parse(" mfj "),
            Some(FilingStatusCode::MarriedFilingJointly)
        );
    }

    #[test]
    fn parse_rejects_unknown_codes() {
        assert_eq!(FilingStatusCode::parse("WIDOW"), None);
    }

    #[test]
    fn parse_or_default_clamps_unknown_to_single() {
        assert_eq!(
            FilingStatusCode::parse_or_default("married"),
            FilingStatusCode::Single
        );
        assert_eq!(
            FilingStatusCode::parse_or_default("HOH"),
            FilingStatusCode::HeadOfHousehold
        );
    }

    #[test]
    fn display_round_trips_through_parse() {
        for status in FilingStatusCode::SUPPORTED {
            assert_eq!(FilingStatusCode::parse(&status.to_string()), Some(status));
        }
    }

    #[test]
    fn only_married_filing_jointly_is_joint() {
        assert!(FilingStatusCode::MarriedFilingJointly.is_joint());
        assert!(!FilingStatusCode::Single.is_joint());
        assert!(!FilingStatusCode::HeadOfHousehold.is_joint());
        assert!(!FilingStatusCode::MarriedFilingSeparately.is_joint());
    }
}
