//! Final / minimum tax schedule

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::FieldSource;

/// How tax on a final/minimum category is charged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxRegime {
    /// Tax withheld is the final liability
    Final,
    /// Liability is at least amount × statutory rate
    Minimum,
    /// Charged at the average rate of tax on normal income
    AverageRate,
    /// Shown for reference only; taxed elsewhere on the return
    Reference,
}

/// Income categories reported on the final/minimum tax schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FinalMinCategory {
    /// Salary, u/s 12(7). Taxed at normal rates; informational here.
    Salary,
    /// Dividend from REIT/SPV, u/s 150 at 0%
    DividendReitSpv,
    /// Dividend from other SPV, u/s 150 at 35%/70%
    DividendOtherSpv,
    /// Dividend from IPP shares, u/s 150 at 7.5%/15%
    DividendIpp,
    /// Dividend, u/s 150 at 15%/30%
    DividendRegular,
    /// Dividend from mutual funds/REITs with mostly profit-on-debt income, 25%/50%
    DividendDebtFunds,
    /// Dividend in specie, 15%/30%
    DividendInSpecie,
    /// Profit on debt up to 5M, u/s 151 at 15%
    ProfitOnDebt,
    /// Profit on debt above 5M, u/s 151 (minimum tax)
    ProfitOnDebtAbove5M,
    /// Government securities bought through an FCVA, 10%
    GovernmentSecuritiesFcva,
    /// Sukuk return up to 1M, u/s 151(1A) at 10%
    SukukUpTo1M,
    /// Sukuk return above 1M up to 5M, at 12.5%
    Sukuk1MTo5M,
    /// Sukuk return above 5M, at 25% (minimum tax)
    SukukAbove5M,
    /// Prize bond or crossword prize, u/s 156 at 15%
    PrizeBond,
    /// Raffle, lottery or quiz prize, u/s 156 at 20%
    RaffleLottery,
    /// Employment termination benefits, u/s 12(6)
    EmploymentTermination,
    /// Salary arrears, u/s 12(7)
    SalaryArrears,
}

impl FinalMinCategory {
    pub const ALL: [FinalMinCategory; 17] = [
        FinalMinCategory::Salary,
        FinalMinCategory::DividendReitSpv,
        FinalMinCategory::DividendOtherSpv,
        FinalMinCategory::DividendIpp,
        FinalMinCategory::DividendRegular,
        FinalMinCategory::DividendDebtFunds,
        FinalMinCategory::DividendInSpecie,
        FinalMinCategory::ProfitOnDebt,
        FinalMinCategory::ProfitOnDebtAbove5M,
        FinalMinCategory::GovernmentSecuritiesFcva,
        FinalMinCategory::SukukUpTo1M,
        FinalMinCategory::Sukuk1MTo5M,
        FinalMinCategory::SukukAbove5M,
        FinalMinCategory::PrizeBond,
        FinalMinCategory::RaffleLottery,
        FinalMinCategory::EmploymentTermination,
        FinalMinCategory::SalaryArrears,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FinalMinCategory::Salary => "salary_12_7",
            FinalMinCategory::DividendReitSpv => "dividend_150_reit_spv",
            FinalMinCategory::DividendOtherSpv => "dividend_150_other_spv",
            FinalMinCategory::DividendIpp => "dividend_150_ipp_shares",
            FinalMinCategory::DividendRegular => "dividend_150_regular",
            FinalMinCategory::DividendDebtFunds => "dividend_150_debt_funds",
            FinalMinCategory::DividendInSpecie => "dividend_in_specie",
            FinalMinCategory::ProfitOnDebt => "profit_on_debt_151_up_to_5m",
            FinalMinCategory::ProfitOnDebtAbove5M => "profit_on_debt_151_above_5m",
            FinalMinCategory::GovernmentSecuritiesFcva => "government_securities_fcva",
            FinalMinCategory::SukukUpTo1M => "sukuk_151_1a_up_to_1m",
            FinalMinCategory::Sukuk1MTo5M => "sukuk_151_1a_1m_to_5m",
            FinalMinCategory::SukukAbove5M => "sukuk_151_1a_above_5m",
            FinalMinCategory::PrizeBond => "prize_bond_156",
            FinalMinCategory::RaffleLottery => "raffle_lottery_156",
            FinalMinCategory::EmploymentTermination => "employment_termination_12_6",
            FinalMinCategory::SalaryArrears => "salary_arrears_12_7",
        }
    }

    pub fn regime(&self) -> TaxRegime {
        match self {
            FinalMinCategory::Salary => TaxRegime::Reference,
            FinalMinCategory::ProfitOnDebtAbove5M | FinalMinCategory::SukukAbove5M => {
                TaxRegime::Minimum
            }
            FinalMinCategory::EmploymentTermination | FinalMinCategory::SalaryArrears => {
                TaxRegime::AverageRate
            }
            _ => TaxRegime::Final,
        }
    }
}

/// One row of the final/minimum tax schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalMinTaxLineItem {
    pub category: FinalMinCategory,
    #[serde(default)]
    pub amount: BigDecimal,
    #[serde(default)]
    pub amount_source: FieldSource,
    #[serde(default)]
    pub tax_deducted: BigDecimal,
    #[serde(default)]
    pub tax_deducted_source: FieldSource,
    /// Overrides the computed tax chargeable
    #[serde(default)]
    pub tax_chargeable: Option<BigDecimal>,
}

impl FinalMinTaxLineItem {
    pub fn new(category: FinalMinCategory, amount: BigDecimal, tax_deducted: BigDecimal) -> Self {
        Self {
            category,
            amount,
            amount_source: FieldSource::Entered,
            tax_deducted,
            tax_deducted_source: FieldSource::Entered,
            tax_chargeable: None,
        }
    }

    pub fn with_tax_chargeable(mut self, tax_chargeable: BigDecimal) -> Self {
        self.tax_chargeable = Some(tax_chargeable);
        self
    }
}

/// The final/minimum tax schedule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinalMinTaxForm {
    pub lines: Vec<FinalMinTaxLineItem>,
}

impl FinalMinTaxForm {
    pub fn new(lines: Vec<FinalMinTaxLineItem>) -> Self {
        Self { lines }
    }

    pub fn line(&self, category: FinalMinCategory) -> Option<&FinalMinTaxLineItem> {
        self.lines.iter().find(|line| line.category == category)
    }

    /// Mutable access to a category's line, appending an empty one if absent
    pub fn line_mut(&mut self, category: FinalMinCategory) -> &mut FinalMinTaxLineItem {
        let index = match self.lines.iter().position(|line| line.category == category) {
            Some(index) => index,
            None => {
                self.lines.push(FinalMinTaxLineItem::new(
                    category,
                    BigDecimal::from(0),
                    BigDecimal::from(0),
                ));
                self.lines.len() - 1
            }
        };
        &mut self.lines[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regimes() {
        assert_eq!(FinalMinCategory::Salary.regime(), TaxRegime::Reference);
        assert_eq!(FinalMinCategory::DividendRegular.regime(), TaxRegime::Final);
        assert_eq!(FinalMinCategory::SukukAbove5M.regime(), TaxRegime::Minimum);
        assert_eq!(FinalMinCategory::ProfitOnDebtAbove5M.regime(), TaxRegime::Minimum);
        assert_eq!(
            FinalMinCategory::EmploymentTermination.regime(),
            TaxRegime::AverageRate
        );
        assert_eq!(FinalMinCategory::SalaryArrears.regime(), TaxRegime::AverageRate);
    }

    #[test]
    fn test_line_mut_reuses_existing_line() {
        let mut form = FinalMinTaxForm::new(vec![FinalMinTaxLineItem::new(
            FinalMinCategory::PrizeBond,
            BigDecimal::from(100000),
            BigDecimal::from(15000),
        )]);

        form.line_mut(FinalMinCategory::PrizeBond).tax_chargeable = Some(BigDecimal::from(15000));
        assert_eq!(form.lines.len(), 1);
    }
}
