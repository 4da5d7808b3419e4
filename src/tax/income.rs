//! Income aggregation: annualizing, exemption caps and group totals

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TaxYearRates;
use crate::forms::{CapitalGainLineItem, Exemption, IncomeField, IncomeForm, IncomeGroup, Period};
use crate::types::*;
use crate::utils::validation::{check_ceiling, clamp_non_negative};

/// One income field after normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeLine {
    pub field: IncomeField,
    pub group: IncomeGroup,
    /// Yearly amount (monthly fields × 12), never negative
    pub annual_amount: BigDecimal,
    pub exempt_amount: BigDecimal,
    pub taxable_amount: BigDecimal,
}

/// Income totals for one filing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeSummary {
    pub lines: Vec<IncomeLine>,
    /// Sum of every annualized income field, exempt portions included
    pub gross_income: BigDecimal,
    pub exempt_income: BigDecimal,
    /// `gross_income - exempt_income`
    pub taxable_income: BigDecimal,
    /// Taxable salary plus taxable non-cash benefits
    pub total_employment_income: BigDecimal,
    pub other_income_minimum_tax: BigDecimal,
    pub other_income_normal_tax: BigDecimal,
    /// Capital gains, kept out of progressive taxable income
    pub capital_gains: BigDecimal,
    pub capital_gains_tax: BigDecimal,
    pub warnings: Vec<TaxWarning>,
}

impl IncomeSummary {
    /// Taxable total of one group
    pub fn group_total(&self, group: IncomeGroup) -> BigDecimal {
        self.lines
            .iter()
            .filter(|line| line.group == group)
            .map(|line| &line.taxable_amount)
            .sum()
    }

    pub fn line(&self, field: IncomeField) -> Option<&IncomeLine> {
        self.lines.iter().find(|line| line.field == field)
    }
}

/// Normalizes the income form against one year's caps and ceilings
#[derive(Debug, Clone)]
pub struct IncomeAggregator<'a> {
    rates: &'a TaxYearRates,
}

impl<'a> IncomeAggregator<'a> {
    pub fn new(rates: &'a TaxYearRates) -> Self {
        Self { rates }
    }

    /// Annualize one field and split it into exempt and taxable portions
    pub fn normalize(
        &self,
        form: &IncomeForm,
        field: IncomeField,
        warnings: &mut Vec<TaxWarning>,
    ) -> IncomeLine {
        let amount = clamp_non_negative(field.name(), form.amount(field), warnings);
        check_ceiling(
            field.name(),
            &amount,
            &self.rates.sanity_ceilings.any_amount,
            warnings,
        );

        let annual_amount = match field.period() {
            Period::Monthly => amount * BigDecimal::from(12),
            Period::Annual => amount,
        };

        let exempt_amount = match field.exemption() {
            Exemption::None => BigDecimal::from(0),
            Exemption::Full => annual_amount.clone(),
            Exemption::Capped(cap) => {
                let cap = self.rates.exemption_cap(cap);
                if annual_amount > *cap {
                    cap.clone()
                } else {
                    annual_amount.clone()
                }
            }
        };

        IncomeLine {
            field,
            group: field.group(),
            taxable_amount: &annual_amount - &exempt_amount,
            annual_amount,
            exempt_amount,
        }
    }

    pub fn aggregate(
        &self,
        form: &IncomeForm,
        capital_gains: &[CapitalGainLineItem],
    ) -> IncomeSummary {
        let mut warnings = Vec::new();

        let lines: Vec<IncomeLine> = IncomeField::ALL
            .iter()
            .map(|field| self.normalize(form, *field, &mut warnings))
            .collect();

        let gross_income: BigDecimal = lines.iter().map(|line| &line.annual_amount).sum();
        let exempt_income: BigDecimal = lines.iter().map(|line| &line.exempt_amount).sum();
        let taxable_income = &gross_income - &exempt_income;

        let annual_salary: BigDecimal = lines
            .iter()
            .filter(|line| line.group == IncomeGroup::Salary)
            .map(|line| &line.annual_amount)
            .sum();
        check_ceiling(
            "annual_salary",
            &annual_salary,
            &self.rates.sanity_ceilings.annual_salary,
            &mut warnings,
        );

        let mut capital_gains_total = BigDecimal::from(0);
        let mut capital_gains_tax = BigDecimal::from(0);
        for line in capital_gains {
            let name = format!("capital_gain_{:?}", line.category).to_lowercase();
            capital_gains_total += clamp_non_negative(&name, &line.gain, &mut warnings);
            capital_gains_tax += clamp_non_negative(&format!("{}_tax", name), &line.tax, &mut warnings);
        }

        let mut summary = IncomeSummary {
            lines,
            gross_income,
            exempt_income,
            taxable_income,
            total_employment_income: BigDecimal::from(0),
            other_income_minimum_tax: BigDecimal::from(0),
            other_income_normal_tax: BigDecimal::from(0),
            capital_gains: capital_gains_total,
            capital_gains_tax,
            warnings,
        };

        summary.total_employment_income = summary.group_total(IncomeGroup::Salary)
            + summary.group_total(IncomeGroup::NonCashBenefits);
        summary.other_income_minimum_tax = summary.group_total(IncomeGroup::OtherMinimumTax);
        summary.other_income_normal_tax = summary.group_total(IncomeGroup::OtherNormalTax);

        debug!(
            gross_income = %summary.gross_income,
            exempt_income = %summary.exempt_income,
            taxable_income = %summary.taxable_income,
            total_employment_income = %summary.total_employment_income,
            "income aggregated"
        );

        summary
    }
}
