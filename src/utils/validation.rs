//! Validation and rounding utilities

use bigdecimal::{BigDecimal, RoundingMode};

use crate::types::*;

/// Tolerance used when comparing a reported tax against gross × rate
pub fn rate_tolerance() -> BigDecimal {
    BigDecimal::new(1.into(), 3)
}

/// Build a decimal from an integer mantissa and a scale (`decimal(125, 3)` = 0.125)
pub fn decimal(digits: i64, scale: i64) -> BigDecimal {
    BigDecimal::new(digits.into(), scale)
}

/// Round to the nearest whole currency unit, halves away from zero
pub fn round_currency(amount: &BigDecimal) -> BigDecimal {
    amount.with_scale_round(0, RoundingMode::HalfUp)
}

/// Round a rate (a fraction) to six decimal places
pub fn round_rate(rate: &BigDecimal) -> BigDecimal {
    rate.with_scale_round(6, RoundingMode::HalfUp)
}

/// `part / whole`, or zero when `whole` is not positive
pub fn ratio(part: &BigDecimal, whole: &BigDecimal) -> BigDecimal {
    if *whole <= BigDecimal::from(0) {
        BigDecimal::from(0)
    } else {
        round_rate(&(part / whole))
    }
}

/// Replace a negative amount with zero, recording a warning
pub fn clamp_non_negative(
    field: &str,
    amount: &BigDecimal,
    warnings: &mut Vec<TaxWarning>,
) -> BigDecimal {
    if *amount < BigDecimal::from(0) {
        warnings.push(TaxWarning::NegativeAmountClamped {
            field: field.to_string(),
            original: amount.clone(),
        });
        BigDecimal::from(0)
    } else {
        amount.clone()
    }
}

/// Record a warning when an amount is above its sanity ceiling
pub fn check_ceiling(
    field: &str,
    amount: &BigDecimal,
    ceiling: &BigDecimal,
    warnings: &mut Vec<TaxWarning>,
) {
    if amount > ceiling {
        warnings.push(TaxWarning::SanityCeilingExceeded {
            field: field.to_string(),
            amount: amount.clone(),
            ceiling: ceiling.clone(),
        });
    }
}

/// Record a mismatch when `reported / gross` strays from `expected_rate`
/// by more than the rate tolerance
pub fn check_reported_rate(
    category: &str,
    gross: &BigDecimal,
    reported: &BigDecimal,
    expected_rate: &BigDecimal,
    warnings: &mut Vec<TaxWarning>,
) {
    if *gross <= BigDecimal::from(0) {
        return;
    }

    let actual_rate = ratio(reported, gross);
    if (&actual_rate - expected_rate).abs() > rate_tolerance() {
        warnings.push(TaxWarning::WithheldRateMismatch {
            category: category.to_string(),
            expected_rate: expected_rate.clone(),
            actual_rate,
        });
    }
}

/// Validate that a rate is a fraction in [0, 1]
pub fn validate_rate(name: &str, rate: &BigDecimal) -> TaxResult<()> {
    if *rate < BigDecimal::from(0) || *rate > BigDecimal::from(1) {
        return Err(TaxError::Configuration(format!(
            "Rate for {} must be between 0 and 1, got {}",
            name, rate
        )));
    }
    Ok(())
}
