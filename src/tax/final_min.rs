//! Final and minimum tax regimes

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TaxYearRates;
use crate::forms::{FinalMinCategory, FinalMinTaxForm, FinalMinTaxLineItem, TaxRegime};
use crate::types::*;
use crate::utils::validation::{check_reported_rate, clamp_non_negative, round_currency};

/// Calculated final/minimum tax for one line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalMinLine {
    pub category: FinalMinCategory,
    pub regime: TaxRegime,
    pub amount: BigDecimal,
    pub tax_deducted: BigDecimal,
    pub tax_deducted_source: FieldSource,
    /// Statutory rate, or the average rate for average-rate categories
    pub rate: Option<BigDecimal>,
    pub tax_chargeable: BigDecimal,
    /// Whether `tax_deducted` counts toward tax paid. Reference lines and
    /// values copied over from withholding are already counted elsewhere.
    pub counts_as_paid: bool,
}

/// Final/minimum tax over a whole schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalMinSummary {
    pub lines: Vec<FinalMinLine>,
    pub final_tax_total: BigDecimal,
    pub tax_deducted_total: BigDecimal,
    pub warnings: Vec<TaxWarning>,
}

/// Total tax chargeable across final/minimum tax lines
pub fn final_tax_total(lines: &[FinalMinLine]) -> BigDecimal {
    lines
        .iter()
        .filter(|line| line.regime != TaxRegime::Reference)
        .map(|line| &line.tax_chargeable)
        .sum()
}

/// Tax deducted on final/minimum tax lines that counts as paid
pub fn final_tax_paid(lines: &[FinalMinLine]) -> BigDecimal {
    lines
        .iter()
        .filter(|line| line.counts_as_paid)
        .map(|line| &line.tax_deducted)
        .sum()
}

/// Applies each category's regime to the final/minimum tax schedule
#[derive(Debug, Clone)]
pub struct FinalMinTaxCalculator<'a> {
    rates: &'a TaxYearRates,
    filer_status: FilerStatus,
}

impl<'a> FinalMinTaxCalculator<'a> {
    pub fn new(rates: &'a TaxYearRates, filer_status: FilerStatus) -> Self {
        Self {
            rates,
            filer_status,
        }
    }

    fn statutory_rate(&self, category: FinalMinCategory) -> TaxResult<BigDecimal> {
        self.rates
            .final_tax_rate(category, self.filer_status)
            .cloned()
            .ok_or_else(|| {
                TaxError::Configuration(format!(
                    "No final tax rate for {} in {}",
                    category.name(),
                    self.rates.tax_year
                ))
            })
    }

    /// Tax chargeable on one line. `average_rate` is the average rate of
    /// tax on normal income, used by the average-rate categories.
    pub fn calculate_line(
        &self,
        line: &FinalMinTaxLineItem,
        average_rate: &BigDecimal,
        warnings: &mut Vec<TaxWarning>,
    ) -> TaxResult<FinalMinLine> {
        let name = line.category.name();
        let regime = line.category.regime();
        let amount = clamp_non_negative(name, &line.amount, warnings);
        let tax_deducted = clamp_non_negative(&format!("{}_tax_deducted", name), &line.tax_deducted, warnings);
        let supplied = line
            .tax_chargeable
            .as_ref()
            .map(|tax| clamp_non_negative(&format!("{}_tax_chargeable", name), tax, warnings));

        let (rate, tax_chargeable) = match regime {
            TaxRegime::Reference => (None, BigDecimal::from(0)),
            TaxRegime::Final => {
                let rate = self.statutory_rate(line.category)?;
                check_reported_rate(name, &amount, &tax_deducted, &rate, warnings);
                let chargeable = supplied.unwrap_or_else(|| tax_deducted.clone());
                (Some(rate), chargeable)
            }
            TaxRegime::Minimum => {
                let rate = self.statutory_rate(line.category)?;
                let chargeable = supplied.unwrap_or_else(|| {
                    let minimum = round_currency(&(&amount * &rate));
                    if tax_deducted > minimum {
                        tax_deducted.clone()
                    } else {
                        minimum
                    }
                });
                (Some(rate), chargeable)
            }
            TaxRegime::AverageRate => {
                let chargeable =
                    supplied.unwrap_or_else(|| round_currency(&(&amount * average_rate)));
                (Some(average_rate.clone()), chargeable)
            }
        };

        Ok(FinalMinLine {
            category: line.category,
            regime,
            amount,
            counts_as_paid: regime != TaxRegime::Reference
                && line.tax_deducted_source != FieldSource::Linked,
            tax_deducted,
            tax_deducted_source: line.tax_deducted_source,
            rate,
            tax_chargeable,
        })
    }

    pub fn calculate(
        &self,
        form: &FinalMinTaxForm,
        average_rate: &BigDecimal,
    ) -> TaxResult<FinalMinSummary> {
        let mut warnings = Vec::new();
        let lines = form
            .lines
            .iter()
            .map(|line| self.calculate_line(line, average_rate, &mut warnings))
            .collect::<TaxResult<Vec<_>>>()?;

        let summary = FinalMinSummary {
            final_tax_total: final_tax_total(&lines),
            tax_deducted_total: final_tax_paid(&lines),
            lines,
            warnings,
        };

        debug!(
            final_tax_total = %summary.final_tax_total,
            tax_deducted_total = %summary.tax_deducted_total,
            "final/minimum tax computed"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validation::decimal;

    fn line(category: FinalMinCategory, amount: i64, deducted: i64) -> FinalMinTaxLineItem {
        FinalMinTaxLineItem::new(category, BigDecimal::from(amount), BigDecimal::from(deducted))
    }

    #[test]
    fn test_final_regime_charges_tax_deducted() {
        let rates = TaxYearRates::tax_year_2025_26();
        let calculator = FinalMinTaxCalculator::new(&rates, FilerStatus::Active);
        let mut warnings = Vec::new();

        let result = calculator
            .calculate_line(&line(FinalMinCategory::DividendRegular, 200_000, 30_000), &BigDecimal::from(0), &mut warnings)
            .unwrap();
        assert_eq!(result.tax_chargeable, BigDecimal::from(30_000));
        assert!(result.counts_as_paid);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_inactive_filer_rate_check() {
        let rates = TaxYearRates::tax_year_2025_26();
        let calculator = FinalMinTaxCalculator::new(&rates, FilerStatus::Inactive);
        let mut warnings = Vec::new();

        // 15% withheld where 30% applies to an inactive filer
        let result = calculator
            .calculate_line(&line(FinalMinCategory::DividendRegular, 200_000, 30_000), &BigDecimal::from(0), &mut warnings)
            .unwrap();
        assert_eq!(result.rate, Some(decimal(30, 2)));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind(), WarningKind::Compliance);
    }

    #[test]
    fn test_minimum_regime_takes_higher_of_deducted_and_minimum() {
        let rates = TaxYearRates::tax_year_2025_26();
        let calculator = FinalMinTaxCalculator::new(&rates, FilerStatus::Active);
        let mut warnings = Vec::new();

        let under = calculator
            .calculate_line(&line(FinalMinCategory::SukukAbove5M, 6_000_000, 1_000_000), &BigDecimal::from(0), &mut warnings)
            .unwrap();
        assert_eq!(under.tax_chargeable, BigDecimal::from(1_500_000));

        let over = calculator
            .calculate_line(&line(FinalMinCategory::SukukAbove5M, 6_000_000, 1_600_000), &BigDecimal::from(0), &mut warnings)
            .unwrap();
        assert_eq!(over.tax_chargeable, BigDecimal::from(1_600_000));

        let profit = calculator
            .calculate_line(&line(FinalMinCategory::ProfitOnDebtAbove5M, 8_000_000, 900_000), &BigDecimal::from(0), &mut warnings)
            .unwrap();
        assert_eq!(profit.regime, TaxRegime::Minimum);
        assert_eq!(profit.tax_chargeable, BigDecimal::from(1_200_000));
        assert!(profit.counts_as_paid);
    }

    #[test]
    fn test_average_rate_and_override() {
        let rates = TaxYearRates::tax_year_2025_26();
        let calculator = FinalMinTaxCalculator::new(&rates, FilerStatus::Active);
        let mut warnings = Vec::new();
        let average_rate = "0.265904".parse::<BigDecimal>().unwrap();

        let computed = calculator
            .calculate_line(&line(FinalMinCategory::EmploymentTermination, 1_000_000, 0), &average_rate, &mut warnings)
            .unwrap();
        assert_eq!(computed.tax_chargeable, BigDecimal::from(265_904));

        let overridden = line(FinalMinCategory::EmploymentTermination, 1_000_000, 0)
            .with_tax_chargeable(BigDecimal::from(250_000));
        let result = calculator
            .calculate_line(&overridden, &average_rate, &mut warnings)
            .unwrap();
        assert_eq!(result.tax_chargeable, BigDecimal::from(250_000));
    }

    #[test]
    fn test_reference_and_linked_lines_are_not_double_counted() {
        let rates = TaxYearRates::tax_year_2025_26();
        let calculator = FinalMinTaxCalculator::new(&rates, FilerStatus::Active);

        let mut linked = line(FinalMinCategory::ProfitOnDebt, 400_000, 60_000);
        linked.tax_deducted_source = FieldSource::Linked;

        let form = FinalMinTaxForm::new(vec![
            line(FinalMinCategory::Salary, 8_740_000, 2_000_000),
            linked,
            line(FinalMinCategory::PrizeBond, 100_000, 15_000),
        ]);

        let summary = calculator.calculate(&form, &BigDecimal::from(0)).unwrap();
        assert_eq!(summary.final_tax_total, BigDecimal::from(75_000));
        assert_eq!(summary.tax_deducted_total, BigDecimal::from(15_000));
        assert_eq!(final_tax_total(&summary.lines), summary.final_tax_total);
    }

    #[test]
    fn test_missing_rate_is_configuration_error() {
        let mut rates = TaxYearRates::tax_year_2025_26();
        rates.final_tax_rates.remove(&FinalMinCategory::PrizeBond);
        let calculator = FinalMinTaxCalculator::new(&rates, FilerStatus::Active);

        let form = FinalMinTaxForm::new(vec![line(FinalMinCategory::PrizeBond, 100_000, 15_000)]);
        assert!(matches!(
            calculator.calculate(&form, &BigDecimal::from(0)),
            Err(TaxError::Configuration(_))
        ));
    }
}
