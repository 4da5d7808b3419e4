//! Reductions, credits, deductions and capital gains

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// Tax reduction sub-categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReductionCategory {
    /// Full-time teacher or researcher reduction
    TeacherResearcher,
    /// Profit on Behbood certificates / pensioners' benefit account
    BehboodCertificates,
    /// Capital gain on immovable property already taxed
    CapitalGainImmovableProperty,
    Other,
}

/// Tax credit sub-categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreditCategory {
    CharitableDonation,
    PensionContribution,
    LifeInsurancePremium,
    InvestmentTaxCredit,
    Other,
}

/// A flat tax reduction amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReductionLineItem {
    pub category: ReductionCategory,
    #[serde(default)]
    pub amount: BigDecimal,
}

impl ReductionLineItem {
    pub fn new(category: ReductionCategory, amount: BigDecimal) -> Self {
        Self { category, amount }
    }
}

/// A flat tax credit amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditLineItem {
    pub category: CreditCategory,
    #[serde(default)]
    pub amount: BigDecimal,
}

impl CreditLineItem {
    pub fn new(category: CreditCategory, amount: BigDecimal) -> Self {
        Self { category, amount }
    }
}

/// Deductible allowances and tax already paid outside withholding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeductionsForm {
    /// Professional expenses, deductible from income
    pub professional_expenses: BigDecimal,
    /// Zakat paid under the Zakat and Ushr Ordinance, deductible from income
    pub zakat_paid: BigDecimal,
    /// Advance tax paid, counted as tax paid
    pub advance_tax_paid: BigDecimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapitalGainCategory {
    ImmovableProperty,
    Securities,
    Other,
}

/// Capital gain for one category, with the tax already computed for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalGainLineItem {
    pub category: CapitalGainCategory,
    #[serde(default)]
    pub gain: BigDecimal,
    #[serde(default)]
    pub tax: BigDecimal,
}

impl CapitalGainLineItem {
    pub fn new(category: CapitalGainCategory, gain: BigDecimal, tax: BigDecimal) -> Self {
        Self {
            category,
            gain,
            tax,
        }
    }
}
