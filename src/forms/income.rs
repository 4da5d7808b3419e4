//! Income form: salary, non-cash benefits and other income

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// How often an income field is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    Monthly,
    Annual,
}

/// Which part of the return an income field belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncomeGroup {
    Salary,
    NonCashBenefits,
    /// Other income subject to minimum tax
    OtherMinimumTax,
    /// Other income taxed at normal rates
    OtherNormalTax,
}

/// Named yearly exemption ceilings, resolved against the rate table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExemptionCap {
    MedicalAllowance,
    ProvidentFund,
}

/// Exemption rule for an income field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Exemption {
    None,
    Full,
    /// Exempt up to the named yearly cap, taxable above it
    Capped(ExemptionCap),
}

/// Every input field of the income form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IncomeField {
    MonthlyBasicSalary,
    MonthlyAllowances,
    MonthlyHouseRentAllowance,
    MonthlyConveyanceAllowance,
    MonthlyMedicalAllowance,
    BonusCommission,
    DirectorshipFee,
    OtherCashBenefits,
    RetirementFromApprovedFunds,
    EmploymentTerminationPayment,
    NonCashBenefits,
    ProvidentFundContribution,
    Gratuity,
    ProfitOnDebt15Percent,
    ProfitOnDebt12_5Percent,
    RentIncome,
    OtherIncome,
}

impl IncomeField {
    pub const ALL: [IncomeField; 17] = [
        IncomeField::MonthlyBasicSalary,
        IncomeField::MonthlyAllowances,
        IncomeField::MonthlyHouseRentAllowance,
        IncomeField::MonthlyConveyanceAllowance,
        IncomeField::MonthlyMedicalAllowance,
        IncomeField::BonusCommission,
        IncomeField::DirectorshipFee,
        IncomeField::OtherCashBenefits,
        IncomeField::RetirementFromApprovedFunds,
        IncomeField::EmploymentTerminationPayment,
        IncomeField::NonCashBenefits,
        IncomeField::ProvidentFundContribution,
        IncomeField::Gratuity,
        IncomeField::ProfitOnDebt15Percent,
        IncomeField::ProfitOnDebt12_5Percent,
        IncomeField::RentIncome,
        IncomeField::OtherIncome,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            IncomeField::MonthlyBasicSalary => "monthly_basic_salary",
            IncomeField::MonthlyAllowances => "monthly_allowances",
            IncomeField::MonthlyHouseRentAllowance => "monthly_house_rent_allowance",
            IncomeField::MonthlyConveyanceAllowance => "monthly_conveyance_allowance",
            IncomeField::MonthlyMedicalAllowance => "monthly_medical_allowance",
            IncomeField::BonusCommission => "bonus_commission",
            IncomeField::DirectorshipFee => "directorship_fee",
            IncomeField::OtherCashBenefits => "other_cash_benefits",
            IncomeField::RetirementFromApprovedFunds => "retirement_from_approved_funds",
            IncomeField::EmploymentTerminationPayment => "employment_termination_payment",
            IncomeField::NonCashBenefits => "non_cash_benefits",
            IncomeField::ProvidentFundContribution => "provident_fund_contribution",
            IncomeField::Gratuity => "gratuity",
            IncomeField::ProfitOnDebt15Percent => "profit_on_debt_15_percent",
            IncomeField::ProfitOnDebt12_5Percent => "profit_on_debt_12_5_percent",
            IncomeField::RentIncome => "rent_income",
            IncomeField::OtherIncome => "other_income",
        }
    }

    pub fn period(&self) -> Period {
        match self {
            IncomeField::MonthlyBasicSalary
            | IncomeField::MonthlyAllowances
            | IncomeField::MonthlyHouseRentAllowance
            | IncomeField::MonthlyConveyanceAllowance
            | IncomeField::MonthlyMedicalAllowance => Period::Monthly,
            _ => Period::Annual,
        }
    }

    pub fn group(&self) -> IncomeGroup {
        match self {
            IncomeField::MonthlyBasicSalary
            | IncomeField::MonthlyAllowances
            | IncomeField::MonthlyHouseRentAllowance
            | IncomeField::MonthlyConveyanceAllowance
            | IncomeField::MonthlyMedicalAllowance
            | IncomeField::BonusCommission
            | IncomeField::DirectorshipFee
            | IncomeField::OtherCashBenefits
            | IncomeField::RetirementFromApprovedFunds
            | IncomeField::EmploymentTerminationPayment => IncomeGroup::Salary,
            IncomeField::NonCashBenefits
            | IncomeField::ProvidentFundContribution
            | IncomeField::Gratuity => IncomeGroup::NonCashBenefits,
            IncomeField::ProfitOnDebt15Percent | IncomeField::ProfitOnDebt12_5Percent => {
                IncomeGroup::OtherMinimumTax
            }
            IncomeField::RentIncome | IncomeField::OtherIncome => IncomeGroup::OtherNormalTax,
        }
    }

    pub fn exemption(&self) -> Exemption {
        match self {
            IncomeField::MonthlyMedicalAllowance => Exemption::Capped(ExemptionCap::MedicalAllowance),
            IncomeField::ProvidentFundContribution => Exemption::Capped(ExemptionCap::ProvidentFund),
            // Taxed through the final/minimum tax schedule instead
            IncomeField::RetirementFromApprovedFunds | IncomeField::EmploymentTerminationPayment => {
                Exemption::Full
            }
            _ => Exemption::None,
        }
    }
}

/// Income form as entered by the user. Missing fields are zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncomeForm {
    pub monthly_basic_salary: BigDecimal,
    pub monthly_allowances: BigDecimal,
    pub monthly_house_rent_allowance: BigDecimal,
    pub monthly_conveyance_allowance: BigDecimal,
    pub monthly_medical_allowance: BigDecimal,
    pub bonus_commission: BigDecimal,
    pub directorship_fee: BigDecimal,
    pub other_cash_benefits: BigDecimal,
    pub retirement_from_approved_funds: BigDecimal,
    pub employment_termination_payment: BigDecimal,
    pub non_cash_benefits: BigDecimal,
    pub provident_fund_contribution: BigDecimal,
    pub gratuity: BigDecimal,
    pub profit_on_debt_15_percent: BigDecimal,
    pub profit_on_debt_12_5_percent: BigDecimal,
    pub rent_income: BigDecimal,
    pub other_income: BigDecimal,
}

impl IncomeForm {
    /// Value of a field as entered (monthly fields are not annualized here)
    pub fn amount(&self, field: IncomeField) -> &BigDecimal {
        match field {
            IncomeField::MonthlyBasicSalary => &self.monthly_basic_salary,
            IncomeField::MonthlyAllowances => &self.monthly_allowances,
            IncomeField::MonthlyHouseRentAllowance => &self.monthly_house_rent_allowance,
            IncomeField::MonthlyConveyanceAllowance => &self.monthly_conveyance_allowance,
            IncomeField::MonthlyMedicalAllowance => &self.monthly_medical_allowance,
            IncomeField::BonusCommission => &self.bonus_commission,
            IncomeField::DirectorshipFee => &self.directorship_fee,
            IncomeField::OtherCashBenefits => &self.other_cash_benefits,
            IncomeField::RetirementFromApprovedFunds => &self.retirement_from_approved_funds,
            IncomeField::EmploymentTerminationPayment => &self.employment_termination_payment,
            IncomeField::NonCashBenefits => &self.non_cash_benefits,
            IncomeField::ProvidentFundContribution => &self.provident_fund_contribution,
            IncomeField::Gratuity => &self.gratuity,
            IncomeField::ProfitOnDebt15Percent => &self.profit_on_debt_15_percent,
            IncomeField::ProfitOnDebt12_5Percent => &self.profit_on_debt_12_5_percent,
            IncomeField::RentIncome => &self.rent_income,
            IncomeField::OtherIncome => &self.other_income,
        }
    }
}
