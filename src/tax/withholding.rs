//! Withholding (adjustable) tax calculations

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TaxYearRates;
use crate::forms::{AdjustableTaxForm, AdjustableTaxLineItem, WithholdingCategory};
use crate::types::*;
use crate::utils::validation::{check_reported_rate, clamp_non_negative, round_currency};

/// Calculated adjustable tax for one line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithholdingLine {
    pub category: WithholdingCategory,
    pub gross_receipt: BigDecimal,
    pub gross_receipt_source: FieldSource,
    /// Rate applied; `None` when the category has no statutory rate
    pub rate: Option<BigDecimal>,
    pub tax_collected: BigDecimal,
    /// Whether `tax_collected` was computed rather than supplied
    pub computed: bool,
}

/// Adjustable tax over a whole schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithholdingSummary {
    pub lines: Vec<WithholdingLine>,
    pub total_tax_collected: BigDecimal,
    pub warnings: Vec<TaxWarning>,
}

/// Computes tax collected at source from gross receipts and rates
#[derive(Debug, Clone)]
pub struct WithholdingCalculator<'a> {
    rates: &'a TaxYearRates,
}

impl<'a> WithholdingCalculator<'a> {
    pub fn new(rates: &'a TaxYearRates) -> Self {
        Self { rates }
    }

    /// Rate for a line: its own override, else the configured category rate
    pub fn rate_for(&self, line: &AdjustableTaxLineItem) -> TaxResult<Option<BigDecimal>> {
        if let Some(rate) = &line.rate {
            return Ok(Some(rate.clone()));
        }

        match self.rates.withholding_rate(line.category) {
            Some(rate) => Ok(Some(rate.clone())),
            None if line.category.requires_reported_tax() => Ok(None),
            None => Err(TaxError::Configuration(format!(
                "No withholding rate for {} in {}",
                line.category.name(),
                self.rates.tax_year
            ))),
        }
    }

    /// Tax collected on one line.
    ///
    /// A supplied `tax_collected` is kept. The only exception is a zero on a
    /// line whose gross receipt was filled in by the linker, which is
    /// recomputed as `round(gross_receipt * rate)`.
    pub fn calculate_line(
        &self,
        line: &AdjustableTaxLineItem,
        warnings: &mut Vec<TaxWarning>,
    ) -> TaxResult<WithholdingLine> {
        let name = line.category.name();
        let gross_receipt = clamp_non_negative(name, &line.gross_receipt, warnings);
        let rate = self
            .rate_for(line)?
            .map(|rate| clamp_non_negative(&format!("{}_rate", name), &rate, warnings));

        let top_rate = self.rates.top_rate();
        if let Some(rate) = &rate {
            if *rate > top_rate && gross_receipt > BigDecimal::from(0) {
                warnings.push(TaxWarning::RateAboveTopBracket {
                    category: name.to_string(),
                    rate: rate.clone(),
                    top_bracket_rate: top_rate,
                });
            }
        }

        let zero = BigDecimal::from(0);
        let supplied = line.tax_collected.as_ref().filter(|tax| {
            !(line.gross_receipt_source == FieldSource::Linked && **tax == zero)
        });

        let (tax_collected, computed) = match supplied {
            Some(tax) => {
                let tax = clamp_non_negative(&format!("{}_tax", name), tax, warnings);
                if let Some(rate) = &rate {
                    check_reported_rate(name, &gross_receipt, &tax, rate, warnings);
                }
                (tax, false)
            }
            None => {
                let tax = rate
                    .as_ref()
                    .map(|rate| round_currency(&(&gross_receipt * rate)))
                    .unwrap_or_else(|| BigDecimal::from(0));
                (tax, true)
            }
        };

        Ok(WithholdingLine {
            category: line.category,
            gross_receipt,
            gross_receipt_source: line.gross_receipt_source,
            rate,
            tax_collected,
            computed,
        })
    }

    pub fn calculate(&self, form: &AdjustableTaxForm) -> TaxResult<WithholdingSummary> {
        let mut warnings = Vec::new();
        let lines = form
            .lines
            .iter()
            .map(|line| self.calculate_line(line, &mut warnings))
            .collect::<TaxResult<Vec<_>>>()?;

        let total_tax_collected: BigDecimal = lines.iter().map(|line| &line.tax_collected).sum();

        debug!(
            lines = lines.len(),
            total_tax_collected = %total_tax_collected,
            "withholding computed"
        );

        Ok(WithholdingSummary {
            lines,
            total_tax_collected,
            warnings,
        })
    }
}
