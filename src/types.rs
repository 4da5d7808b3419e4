//! Core types shared by the calculators and the computation engine

use bigdecimal::BigDecimal;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Fiscal year running 1 July to 30 June.
///
/// The value is the year the period ends in, so `TaxYear(2026)` is the
/// "2025-26" year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaxYear(pub i32);

impl TaxYear {
    /// Tax year a given date falls in
    pub fn from_date(date: NaiveDate) -> Self {
        if date.month() >= 7 {
            TaxYear(date.year() + 1)
        } else {
            TaxYear(date.year())
        }
    }

    /// First day of the fiscal year (1 July of the previous calendar year)
    pub fn start_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.0.checked_sub(1)?, 7, 1)
    }

    /// Last day of the fiscal year (30 June)
    pub fn end_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.0, 6, 30)
    }

    /// Whether a date falls inside this fiscal year
    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::from_date(date) == *self
    }

    /// Label in the "2025-26" form used on returns
    pub fn label(&self) -> String {
        format!("{}-{:02}", i64::from(self.0) - 1, self.0.rem_euclid(100))
    }
}

impl fmt::Display for TaxYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for TaxYear {
    type Err = TaxError;

    /// Accepts either the "2025-26" label or the bare end year "2026"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || TaxError::Parse(format!("Invalid tax year: '{}'", s));

        match s.split_once('-') {
            Some((start, end)) => {
                let start: i32 = start.parse().map_err(|_| invalid())?;
                let end: i32 = end.parse().map_err(|_| invalid())?;
                let end_year = start.checked_add(1).ok_or_else(invalid)?;
                if end != end_year.rem_euclid(100) {
                    return Err(invalid());
                }
                Ok(TaxYear(end_year))
            }
            None => s.parse().map(TaxYear).map_err(|_| invalid()),
        }
    }
}

/// Identifies one filing: a user's return for one fiscal year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FilingKey {
    pub user_id: Uuid,
    pub tax_year: TaxYear,
}

impl FilingKey {
    pub fn new(user_id: Uuid, tax_year: TaxYear) -> Self {
        Self { user_id, tax_year }
    }
}

impl fmt::Display for FilingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user_id, self.tax_year)
    }
}

/// Whether the taxpayer appears on the active taxpayers list.
/// Several final-tax rates are doubled for inactive filers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FilerStatus {
    #[default]
    Active,
    Inactive,
}

/// Where an input value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FieldSource {
    /// Typed in by the user (or never set)
    #[default]
    Entered,
    /// Filled in by the cross-form linker
    Linked,
}

/// Severity class of a warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WarningKind {
    /// Suspicious input that was accepted (possibly after clamping)
    Validation,
    /// A computed figure that breaks a statutory expectation
    Compliance,
}

/// Non-fatal anomaly attached to an otherwise usable result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TaxWarning {
    /// A negative input was replaced by zero
    NegativeAmountClamped { field: String, original: BigDecimal },
    /// An input is larger than the configured sanity ceiling
    SanityCeilingExceeded {
        field: String,
        amount: BigDecimal,
        ceiling: BigDecimal,
    },
    /// A configured category rate is above the top bracket rate.
    /// The rate is still applied as configured.
    RateAboveTopBracket {
        category: String,
        rate: BigDecimal,
        top_bracket_rate: BigDecimal,
    },
    /// Reductions and credits exceed the tax they are applied against
    NegativeNetTaxPayable { net_tax_payable: BigDecimal },
    /// Normal tax divided by taxable income exceeds the highest bracket rate
    EffectiveRateAboveMaximum {
        effective_rate: BigDecimal,
        maximum_rate: BigDecimal,
    },
    /// Reported tax does not match gross amount times the statutory rate
    WithheldRateMismatch {
        category: String,
        expected_rate: BigDecimal,
        actual_rate: BigDecimal,
    },
}

impl TaxWarning {
    pub fn kind(&self) -> WarningKind {
        match self {
            TaxWarning::NegativeAmountClamped { .. }
            | TaxWarning::SanityCeilingExceeded { .. }
            | TaxWarning::RateAboveTopBracket { .. }
            | TaxWarning::NegativeNetTaxPayable { .. } => WarningKind::Validation,
            TaxWarning::EffectiveRateAboveMaximum { .. }
            | TaxWarning::WithheldRateMismatch { .. } => WarningKind::Compliance,
        }
    }
}

impl fmt::Display for TaxWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaxWarning::NegativeAmountClamped { field, original } => {
                write!(f, "{} was negative ({}) and has been treated as 0", field, original)
            }
            TaxWarning::SanityCeilingExceeded {
                field,
                amount,
                ceiling,
            } => write!(f, "{} of {} exceeds the expected ceiling of {}", field, amount, ceiling),
            TaxWarning::RateAboveTopBracket {
                category,
                rate,
                top_bracket_rate,
            } => write!(
                f,
                "Rate {} for {} is above the top bracket rate {}",
                rate, category, top_bracket_rate
            ),
            TaxWarning::NegativeNetTaxPayable { net_tax_payable } => {
                write!(f, "Net tax payable is negative: {}", net_tax_payable)
            }
            TaxWarning::EffectiveRateAboveMaximum {
                effective_rate,
                maximum_rate,
            } => write!(
                f,
                "Effective rate {} exceeds the maximum bracket rate {}",
                effective_rate, maximum_rate
            ),
            TaxWarning::WithheldRateMismatch {
                category,
                expected_rate,
                actual_rate,
            } => write!(
                f,
                "Tax reported for {} implies a rate of {}, expected {}",
                category, actual_rate, expected_rate
            ),
        }
    }
}

/// Errors that can occur while computing tax
#[derive(Debug, thiserror::Error)]
pub enum TaxError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Filing not found: {0}")]
    FilingNotFound(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result type for tax operations
pub type TaxResult<T> = Result<T, TaxError>;
