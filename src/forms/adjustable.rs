//! Adjustable (withholding) tax schedule

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::FieldSource;

/// Receipt categories on which tax is collected at source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WithholdingCategory {
    /// Salary, u/s 149. Tax is taken from the employer's certificate.
    Salary,
    /// Directorship fee, u/s 149(3)
    DirectorshipFee,
    /// Profit on debt, u/s 151 at 15%
    ProfitOnDebt,
    /// Profit on debt paid to a non-resident, u/s 152(2)
    ProfitOnDebtNonResident,
    /// Profit on sukuk, u/s 151A at 12.5%
    SukukProfit,
    /// Rent, u/s 155
    Rent,
    /// Cash withdrawal from a bank, u/s 231AB
    CashWithdrawal,
    /// Motor vehicle registration fee, u/s 231B(1)
    MotorVehicleRegistration,
    /// Motor vehicle transfer fee, u/s 231B(2)
    MotorVehicleTransfer,
    /// Motor vehicle sale, u/s 231B(3)
    MotorVehicleSale,
    /// Motor vehicle leasing to an inactive filer, u/s 231B(1A) at 4%
    MotorVehicleLeasing,
    /// Advance tax on motor vehicles, u/s 231B(2A)
    MotorVehicleAdvance,
    /// Advance tax on foreign domestic workers, u/s 231C
    ForeignDomesticWorkers,
    /// Domestic electricity bill, u/s 235
    ElectricityDomestic,
    /// Telephone bill, u/s 236(1)(a)
    TelephoneBill,
    /// Prepaid telephone card, u/s 236(1)(b)
    PrepaidTelephoneCard,
    /// Phone unit, u/s 236(1)(c)
    PhoneUnit,
    /// Internet bill, u/s 236(1)(d)
    InternetBill,
    /// Prepaid internet card, u/s 236(1)(e)
    PrepaidInternetCard,
    /// Cellphone bill, u/s 236(1)(f)
    CellphoneBill,
    /// Sale or transfer of immovable property, u/s 236C
    PropertySale,
    /// 236C tax where the property was bought and sold in the same tax year
    PropertySoldSameYear,
    /// 236C tax where the property was bought before the current tax year
    PropertyHeldFromPriorYear,
    /// Purchase or transfer of immovable property, u/s 236K
    PropertyPurchase,
    /// Functions and gatherings charges, u/s 236CB
    FunctionsAndGatherings,
    /// Sale considerations, u/s 37E
    SaleConsideration,
    /// Advance from a pension fund, u/s 23A of Part I of the Second Schedule
    PensionFundAdvance,
    /// Withdrawal from a pension fund, u/s 23A
    PensionFundWithdrawal,
    /// Remittances abroad, u/s 236V
    RemittanceAbroad,
    /// Bonus shares, u/s 236Z
    BonusShares,
}

impl WithholdingCategory {
    pub const ALL: [WithholdingCategory; 30] = [
        WithholdingCategory::Salary,
        WithholdingCategory::DirectorshipFee,
        WithholdingCategory::ProfitOnDebt,
        WithholdingCategory::ProfitOnDebtNonResident,
        WithholdingCategory::SukukProfit,
        WithholdingCategory::Rent,
        WithholdingCategory::CashWithdrawal,
        WithholdingCategory::MotorVehicleRegistration,
        WithholdingCategory::MotorVehicleTransfer,
        WithholdingCategory::MotorVehicleSale,
        WithholdingCategory::MotorVehicleLeasing,
        WithholdingCategory::MotorVehicleAdvance,
        WithholdingCategory::ForeignDomesticWorkers,
        WithholdingCategory::ElectricityDomestic,
        WithholdingCategory::TelephoneBill,
        WithholdingCategory::PrepaidTelephoneCard,
        WithholdingCategory::PhoneUnit,
        WithholdingCategory::InternetBill,
        WithholdingCategory::PrepaidInternetCard,
        WithholdingCategory::CellphoneBill,
        WithholdingCategory::PropertySale,
        WithholdingCategory::PropertySoldSameYear,
        WithholdingCategory::PropertyHeldFromPriorYear,
        WithholdingCategory::PropertyPurchase,
        WithholdingCategory::FunctionsAndGatherings,
        WithholdingCategory::SaleConsideration,
        WithholdingCategory::PensionFundAdvance,
        WithholdingCategory::PensionFundWithdrawal,
        WithholdingCategory::RemittanceAbroad,
        WithholdingCategory::BonusShares,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            WithholdingCategory::Salary => "salary_149",
            WithholdingCategory::DirectorshipFee => "directorship_fee_149_3",
            WithholdingCategory::ProfitOnDebt => "profit_on_debt_151_15_percent",
            WithholdingCategory::ProfitOnDebtNonResident => "profit_on_debt_non_resident_152_2",
            WithholdingCategory::SukukProfit => "sukuk_151a_12_5_percent",
            WithholdingCategory::Rent => "rent_155",
            WithholdingCategory::CashWithdrawal => "cash_withdrawal_231ab",
            WithholdingCategory::MotorVehicleRegistration => "motor_vehicle_registration_231b_1",
            WithholdingCategory::MotorVehicleTransfer => "motor_vehicle_transfer_231b_2",
            WithholdingCategory::MotorVehicleSale => "motor_vehicle_sale_231b_3",
            WithholdingCategory::MotorVehicleLeasing => "motor_vehicle_leasing_231b_1a",
            WithholdingCategory::MotorVehicleAdvance => "motor_vehicle_advance_231b_2a",
            WithholdingCategory::ForeignDomesticWorkers => "foreign_domestic_workers_231c",
            WithholdingCategory::ElectricityDomestic => "electricity_domestic_235",
            WithholdingCategory::TelephoneBill => "telephone_bill_236_1a",
            WithholdingCategory::PrepaidTelephoneCard => "prepaid_telephone_card_236_1b",
            WithholdingCategory::PhoneUnit => "phone_unit_236_1c",
            WithholdingCategory::InternetBill => "internet_bill_236_1d",
            WithholdingCategory::PrepaidInternetCard => "prepaid_internet_card_236_1e",
            WithholdingCategory::CellphoneBill => "cellphone_bill_236_1f",
            WithholdingCategory::PropertySale => "property_sale_236c",
            WithholdingCategory::PropertySoldSameYear => "property_sold_same_year_236c",
            WithholdingCategory::PropertyHeldFromPriorYear => "property_held_from_prior_year_236c",
            WithholdingCategory::PropertyPurchase => "property_purchase_236k",
            WithholdingCategory::FunctionsAndGatherings => "functions_gatherings_236cb",
            WithholdingCategory::SaleConsideration => "sale_consideration_37e",
            WithholdingCategory::PensionFundAdvance => "pension_fund_advance_23a_part_i",
            WithholdingCategory::PensionFundWithdrawal => "pension_fund_withdrawal_23a",
            WithholdingCategory::RemittanceAbroad => "remittance_abroad_236v",
            WithholdingCategory::BonusShares => "bonus_shares_236z",
        }
    }

    /// Categories without a flat statutory rate; the collected tax has to be reported
    pub fn requires_reported_tax(&self) -> bool {
        matches!(
            self,
            WithholdingCategory::Salary
                | WithholdingCategory::ProfitOnDebtNonResident
                | WithholdingCategory::CashWithdrawal
                | WithholdingCategory::MotorVehicleRegistration
                | WithholdingCategory::MotorVehicleSale
                | WithholdingCategory::MotorVehicleAdvance
                | WithholdingCategory::ForeignDomesticWorkers
                | WithholdingCategory::PropertySale
                | WithholdingCategory::PropertySoldSameYear
                | WithholdingCategory::PropertyHeldFromPriorYear
                | WithholdingCategory::PropertyPurchase
                | WithholdingCategory::FunctionsAndGatherings
                | WithholdingCategory::SaleConsideration
                | WithholdingCategory::PensionFundAdvance
                | WithholdingCategory::PensionFundWithdrawal
                | WithholdingCategory::RemittanceAbroad
        )
    }
}

/// One row of the adjustable tax schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustableTaxLineItem {
    pub category: WithholdingCategory,
    #[serde(default)]
    pub gross_receipt: BigDecimal,
    #[serde(default)]
    pub gross_receipt_source: FieldSource,
    /// Overrides the configured rate for this line
    #[serde(default)]
    pub rate: Option<BigDecimal>,
    /// Tax actually collected, when the user supplied it
    #[serde(default)]
    pub tax_collected: Option<BigDecimal>,
}

impl AdjustableTaxLineItem {
    pub fn new(category: WithholdingCategory, gross_receipt: BigDecimal) -> Self {
        Self {
            category,
            gross_receipt,
            gross_receipt_source: FieldSource::Entered,
            rate: None,
            tax_collected: None,
        }
    }

    /// Record the tax the user reports as collected
    pub fn with_tax_collected(mut self, tax_collected: BigDecimal) -> Self {
        self.tax_collected = Some(tax_collected);
        self
    }

    pub fn with_rate(mut self, rate: BigDecimal) -> Self {
        self.rate = Some(rate);
        self
    }
}

/// The adjustable tax schedule. At most one line per category is expected;
/// the first matching line is the one linked into.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustableTaxForm {
    pub lines: Vec<AdjustableTaxLineItem>,
}

impl AdjustableTaxForm {
    pub fn new(lines: Vec<AdjustableTaxLineItem>) -> Self {
        Self { lines }
    }

    pub fn line(&self, category: WithholdingCategory) -> Option<&AdjustableTaxLineItem> {
        self.lines.iter().find(|line| line.category == category)
    }

    /// Mutable access to a category's line, appending an empty one if absent
    pub fn line_mut(&mut self, category: WithholdingCategory) -> &mut AdjustableTaxLineItem {
        let index = match self.lines.iter().position(|line| line.category == category) {
            Some(index) => index,
            None => {
                self.lines
                    .push(AdjustableTaxLineItem::new(category, BigDecimal::from(0)));
                self.lines.len() - 1
            }
        };
        &mut self.lines[index]
    }
}
