//! Input forms for one filing, each with a statically declared field set

mod adjustable;
mod adjustments;
mod final_min;
mod income;

pub use adjustable::*;
pub use adjustments::*;
pub use final_min::*;
pub use income::*;

use serde::{Deserialize, Serialize};

use crate::types::{FilerStatus, FilingKey};

/// Everything the engine reads for one user and tax year.
///
/// Any form that has not been filled in yet is empty and counts as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilingSnapshot {
    pub key: FilingKey,
    #[serde(default)]
    pub filer_status: FilerStatus,
    #[serde(default)]
    pub income: IncomeForm,
    #[serde(default)]
    pub adjustable_tax: AdjustableTaxForm,
    #[serde(default)]
    pub final_min_tax: FinalMinTaxForm,
    #[serde(default)]
    pub capital_gains: Vec<CapitalGainLineItem>,
    #[serde(default)]
    pub reductions: Vec<ReductionLineItem>,
    #[serde(default)]
    pub credits: Vec<CreditLineItem>,
    #[serde(default)]
    pub deductions: DeductionsForm,
}

impl FilingSnapshot {
    /// Create an empty snapshot for a filing
    pub fn new(key: FilingKey) -> Self {
        Self {
            key,
            filer_status: FilerStatus::default(),
            income: IncomeForm::default(),
            adjustable_tax: AdjustableTaxForm::default(),
            final_min_tax: FinalMinTaxForm::default(),
            capital_gains: Vec::new(),
            reductions: Vec::new(),
            credits: Vec::new(),
            deductions: DeductionsForm::default(),
        }
    }
}
