//! Cross-form linking: one-directional defaults between forms

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::TaxYearRates;
use crate::forms::{FilingSnapshot, FinalMinCategory, IncomeField, WithholdingCategory};
use crate::tax::income::IncomeAggregator;
use crate::tax::withholding::WithholdingCalculator;
use crate::types::*;

/// Where a linked value is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkSource {
    /// Taxable salary plus taxable non-cash benefits
    TotalEmploymentIncome,
    /// Annualized value of one income field
    IncomeField(IncomeField),
    /// Tax collected on a withholding line, computed if not supplied
    WithholdingTaxCollected(WithholdingCategory),
}

/// The dependent input a linked value is written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkTarget {
    WithholdingGrossReceipt(WithholdingCategory),
    FinalMinAmount(FinalMinCategory),
    FinalMinTaxDeducted(FinalMinCategory),
}

impl LinkTarget {
    /// Whether a missing line is added to receive the value. Tax deducted is
    /// only filled into a final/minimum line the user already declared.
    pub fn creates_line(&self) -> bool {
        !matches!(self, LinkTarget::FinalMinTaxDeducted(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkRule {
    pub source: LinkSource,
    pub target: LinkTarget,
}

impl LinkRule {
    pub const fn new(source: LinkSource, target: LinkTarget) -> Self {
        Self { source, target }
    }
}

/// Links applied to every filing, in order. Gross-receipt rules come before
/// the rules that read tax collected on those receipts.
pub const DEFAULT_LINK_RULES: &[LinkRule] = &[
    LinkRule::new(
        LinkSource::TotalEmploymentIncome,
        LinkTarget::FinalMinAmount(FinalMinCategory::Salary),
    ),
    LinkRule::new(
        LinkSource::TotalEmploymentIncome,
        LinkTarget::WithholdingGrossReceipt(WithholdingCategory::Salary),
    ),
    LinkRule::new(
        LinkSource::IncomeField(IncomeField::DirectorshipFee),
        LinkTarget::WithholdingGrossReceipt(WithholdingCategory::DirectorshipFee),
    ),
    LinkRule::new(
        LinkSource::IncomeField(IncomeField::ProfitOnDebt15Percent),
        LinkTarget::WithholdingGrossReceipt(WithholdingCategory::ProfitOnDebt),
    ),
    LinkRule::new(
        LinkSource::IncomeField(IncomeField::ProfitOnDebt12_5Percent),
        LinkTarget::WithholdingGrossReceipt(WithholdingCategory::SukukProfit),
    ),
    LinkRule::new(
        LinkSource::IncomeField(IncomeField::RentIncome),
        LinkTarget::WithholdingGrossReceipt(WithholdingCategory::Rent),
    ),
    LinkRule::new(
        LinkSource::WithholdingTaxCollected(WithholdingCategory::Salary),
        LinkTarget::FinalMinTaxDeducted(FinalMinCategory::Salary),
    ),
    LinkRule::new(
        LinkSource::WithholdingTaxCollected(WithholdingCategory::ProfitOnDebt),
        LinkTarget::FinalMinTaxDeducted(FinalMinCategory::ProfitOnDebt),
    ),
    LinkRule::new(
        LinkSource::WithholdingTaxCollected(WithholdingCategory::SukukProfit),
        LinkTarget::FinalMinTaxDeducted(FinalMinCategory::Sukuk1MTo5M),
    ),
];

/// A rule that changed the snapshot, with the value it wrote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedLink {
    pub rule: LinkRule,
    pub value: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkOutcome {
    pub snapshot: FilingSnapshot,
    pub applied: Vec<AppliedLink>,
}

/// Applies a rule table to a snapshot in one pass.
///
/// A target is written only when it is zero or missing and the source is
/// positive, so running the pass again changes nothing.
#[derive(Debug, Clone)]
pub struct CrossFormLinker<'a> {
    rates: &'a TaxYearRates,
    rules: &'a [LinkRule],
}

impl<'a> CrossFormLinker<'a> {
    /// Linker using [`DEFAULT_LINK_RULES`]
    pub fn new(rates: &'a TaxYearRates) -> Self {
        Self::with_rules(rates, DEFAULT_LINK_RULES)
    }

    pub fn with_rules(rates: &'a TaxYearRates, rules: &'a [LinkRule]) -> Self {
        Self { rates, rules }
    }

    /// Current value of a source in the snapshot
    pub fn source_value(
        &self,
        snapshot: &FilingSnapshot,
        source: LinkSource,
    ) -> TaxResult<BigDecimal> {
        let aggregator = IncomeAggregator::new(self.rates);
        // Link sources are read silently; the same warnings come out of the computation
        let mut scratch = Vec::new();

        match source {
            LinkSource::TotalEmploymentIncome => Ok(aggregator
                .aggregate(&snapshot.income, &[])
                .total_employment_income),
            LinkSource::IncomeField(field) => Ok(aggregator
                .normalize(&snapshot.income, field, &mut scratch)
                .annual_amount),
            LinkSource::WithholdingTaxCollected(category) => {
                match snapshot.adjustable_tax.line(category) {
                    Some(line) => Ok(WithholdingCalculator::new(self.rates)
                        .calculate_line(line, &mut scratch)?
                        .tax_collected),
                    None => Ok(BigDecimal::from(0)),
                }
            }
        }
    }

    /// Write `value` into the target if it is unset. Returns whether it was written.
    fn apply_target(snapshot: &mut FilingSnapshot, target: LinkTarget, value: &BigDecimal) -> bool {
        let zero = BigDecimal::from(0);

        match target {
            LinkTarget::WithholdingGrossReceipt(category) => {
                let line = snapshot.adjustable_tax.line_mut(category);
                if line.gross_receipt != zero {
                    return false;
                }
                line.gross_receipt = value.clone();
                line.gross_receipt_source = FieldSource::Linked;
            }
            LinkTarget::FinalMinAmount(category) => {
                let line = snapshot.final_min_tax.line_mut(category);
                if line.amount != zero {
                    return false;
                }
                line.amount = value.clone();
                line.amount_source = FieldSource::Linked;
            }
            LinkTarget::FinalMinTaxDeducted(category) => {
                let line = snapshot.final_min_tax.line_mut(category);
                if line.tax_deducted != zero {
                    return false;
                }
                line.tax_deducted = value.clone();
                line.tax_deducted_source = FieldSource::Linked;
            }
        }

        true
    }

    fn target_exists(snapshot: &FilingSnapshot, target: LinkTarget) -> bool {
        match target {
            LinkTarget::WithholdingGrossReceipt(category) => {
                snapshot.adjustable_tax.line(category).is_some()
            }
            LinkTarget::FinalMinAmount(category) | LinkTarget::FinalMinTaxDeducted(category) => {
                snapshot.final_min_tax.line(category).is_some()
            }
        }
    }

    /// Run every rule in order over a copy of the snapshot
    pub fn link(&self, snapshot: &FilingSnapshot) -> TaxResult<LinkOutcome> {
        let mut linked = snapshot.clone();
        let mut applied = Vec::new();
        let zero = BigDecimal::from(0);

        for rule in self.rules {
            let value = self.source_value(&linked, rule.source)?;
            if value <= zero {
                continue;
            }
            if !rule.target.creates_line() && !Self::target_exists(&linked, rule.target) {
                continue;
            }

            if Self::apply_target(&mut linked, rule.target, &value) {
                debug!(source = ?rule.source, target = ?rule.target, value = %value, "linked value");
                applied.push(AppliedLink { rule: *rule, value });
            }
        }

        info!(
            filing = %snapshot.key,
            applied = applied.len(),
            "cross-form linking complete"
        );

        Ok(LinkOutcome {
            snapshot: linked,
            applied,
        })
    }
}
