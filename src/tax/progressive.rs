//! Progressive slab tax

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TaxBracket;
use crate::types::*;
use crate::utils::validation::{ratio, round_currency};

/// Tax attributed to one slab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketTax {
    pub order: u32,
    pub min_income: BigDecimal,
    pub max_income: Option<BigDecimal>,
    pub rate: BigDecimal,
    /// Portion of income falling in this slab
    pub taxable_amount: BigDecimal,
    /// Unrounded tax on that portion
    pub tax: BigDecimal,
}

/// Result of a progressive tax calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressiveTax {
    pub taxable_income: BigDecimal,
    /// Total tax, rounded to whole currency units
    pub tax: BigDecimal,
    /// `tax / taxable_income`, zero for no income
    pub effective_rate: BigDecimal,
    /// Rate of the slab containing the income
    pub marginal_rate: BigDecimal,
    pub breakdown: Vec<BracketTax>,
}

/// Progressive tax calculator over an ordered slab table
#[derive(Debug, Clone)]
pub struct ProgressiveTaxCalculator<'a> {
    brackets: &'a [TaxBracket],
}

impl<'a> ProgressiveTaxCalculator<'a> {
    /// Create a calculator, rejecting a table that does not cover [0, ∞)
    /// with contiguous slabs and consistent fixed bases
    pub fn new(brackets: &'a [TaxBracket]) -> TaxResult<Self> {
        TaxBracket::validate_table(brackets)?;
        Ok(Self { brackets })
    }

    /// Slab containing `income`; `None` for zero or negative income
    pub fn containing_bracket(&self, income: &BigDecimal) -> Option<&'a TaxBracket> {
        self.brackets.iter().find(|bracket| bracket.contains(income))
    }

    /// Walk the slabs, accumulating the tax on each portion of income
    pub fn calculate(&self, taxable_income: &BigDecimal) -> ProgressiveTax {
        let zero = BigDecimal::from(0);
        let mut breakdown = Vec::new();
        let mut total = BigDecimal::from(0);

        if *taxable_income > zero {
            for bracket in self.brackets {
                if bracket.min_income >= *taxable_income {
                    break;
                }

                let upper = match &bracket.max_income {
                    Some(max) if max < taxable_income => max,
                    _ => taxable_income,
                };
                let taxable_amount = upper - &bracket.min_income;
                let tax = &taxable_amount * &bracket.rate;
                total += &tax;

                breakdown.push(BracketTax {
                    order: bracket.order,
                    min_income: bracket.min_income.clone(),
                    max_income: bracket.max_income.clone(),
                    rate: bracket.rate.clone(),
                    taxable_amount,
                    tax,
                });
            }
        }

        let tax = round_currency(&total);
        let marginal_rate = self
            .containing_bracket(taxable_income)
            .or(self.brackets.first())
            .map(|bracket| bracket.rate.clone())
            .unwrap_or_else(|| BigDecimal::from(0));

        debug!(
            taxable_income = %taxable_income,
            tax = %tax,
            marginal_rate = %marginal_rate,
            "progressive tax computed"
        );

        ProgressiveTax {
            taxable_income: taxable_income.clone(),
            effective_rate: ratio(&tax, taxable_income),
            tax,
            marginal_rate,
            breakdown,
        }
    }

    /// Unrounded tax from the containing slab's fixed base:
    /// `fixed_base_amount + (income - min_income) * rate`
    pub fn closed_form(&self, taxable_income: &BigDecimal) -> BigDecimal {
        match self.containing_bracket(taxable_income) {
            Some(bracket) => {
                &bracket.fixed_base_amount + (taxable_income - &bracket.min_income) * &bracket.rate
            }
            None => BigDecimal::from(0),
        }
    }
}
