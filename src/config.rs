//! Rate tables: progressive slabs and fixed category rates per tax year

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::forms::{ExemptionCap, FinalMinCategory, TaxRegime, WithholdingCategory};
use crate::traits::SlabProvider;
use crate::types::*;
use crate::utils::validation::{decimal, validate_rate};

/// One progressive tax slab.
///
/// The slab covers incomes in `(min_income, max_income]`; `max_income` of
/// `None` means unbounded. `fixed_base_amount` is the total tax on all lower
/// slabs, so tax for an income in this slab is
/// `fixed_base_amount + (income - min_income) * rate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub order: u32,
    pub min_income: BigDecimal,
    pub max_income: Option<BigDecimal>,
    pub rate: BigDecimal,
    pub fixed_base_amount: BigDecimal,
}

impl TaxBracket {
    pub fn new(
        order: u32,
        min_income: BigDecimal,
        max_income: Option<BigDecimal>,
        rate: BigDecimal,
        fixed_base_amount: BigDecimal,
    ) -> Self {
        Self {
            order,
            min_income,
            max_income,
            rate,
            fixed_base_amount,
        }
    }

    /// Build a contiguous slab table starting at 0 from `(upper bound, rate)`
    /// tiers, filling in each slab's fixed base amount
    pub fn schedule(tiers: Vec<(Option<BigDecimal>, BigDecimal)>) -> Vec<TaxBracket> {
        let mut brackets = Vec::with_capacity(tiers.len());
        let mut min_income = BigDecimal::from(0);
        let mut fixed_base_amount = BigDecimal::from(0);

        for (index, (max_income, rate)) in tiers.into_iter().enumerate() {
            let next_base = max_income
                .as_ref()
                .map(|max| &fixed_base_amount + (max - &min_income) * &rate);

            brackets.push(TaxBracket::new(
                index as u32 + 1,
                min_income.clone(),
                max_income.clone(),
                rate,
                fixed_base_amount.clone(),
            ));

            match (max_income, next_base) {
                (Some(max), Some(base)) => {
                    min_income = max;
                    fixed_base_amount = base;
                }
                _ => break,
            }
        }

        brackets
    }

    /// Whether an income falls in this slab (lower bound exclusive)
    pub fn contains(&self, income: &BigDecimal) -> bool {
        *income > self.min_income
            && self
                .max_income
                .as_ref()
                .is_none_or(|max| income <= max)
    }

    /// Check a slab table covers [0, ∞): it starts at 0, each slab begins
    /// where the previous one ends, only the last is unbounded, fixed bases
    /// match the slabs below and every rate is within [0, 1]
    pub fn validate_table(brackets: &[TaxBracket]) -> TaxResult<()> {
        let first = brackets
            .first()
            .ok_or_else(|| TaxError::Configuration("No tax brackets configured".to_string()))?;

        if first.min_income != BigDecimal::from(0) {
            return Err(TaxError::Configuration(format!(
                "Tax brackets must start at 0, first starts at {}",
                first.min_income
            )));
        }

        let mut expected_min = BigDecimal::from(0);
        let mut expected_base = BigDecimal::from(0);
        let last_index = brackets.len() - 1;

        for (index, bracket) in brackets.iter().enumerate() {
            validate_rate(&format!("bracket {}", bracket.order), &bracket.rate)?;

            if bracket.min_income != expected_min {
                return Err(TaxError::Configuration(format!(
                    "Bracket {} starts at {}, expected {}",
                    bracket.order, bracket.min_income, expected_min
                )));
            }

            if bracket.fixed_base_amount != expected_base {
                return Err(TaxError::Configuration(format!(
                    "Bracket {} has fixed base {}, expected {}",
                    bracket.order, bracket.fixed_base_amount, expected_base
                )));
            }

            match (&bracket.max_income, index == last_index) {
                (None, true) => {}
                (None, false) => {
                    return Err(TaxError::Configuration(format!(
                        "Only the last bracket may be unbounded (bracket {})",
                        bracket.order
                    )));
                }
                (Some(_), true) => {
                    return Err(TaxError::Configuration(
                        "Last bracket must be unbounded".to_string(),
                    ));
                }
                (Some(max), false) => {
                    if *max <= bracket.min_income {
                        return Err(TaxError::Configuration(format!(
                            "Bracket {} is empty or inverted",
                            bracket.order
                        )));
                    }
                    expected_base = &expected_base + (max - &bracket.min_income) * &bracket.rate;
                    expected_min = max.clone();
                }
            }
        }

        Ok(())
    }

    /// Tax on the full width of this slab, `None` for the unbounded slab
    pub fn full_slab_tax(&self) -> Option<BigDecimal> {
        self.max_income
            .as_ref()
            .map(|max| (max - &self.min_income) * &self.rate)
    }
}

/// Additional levy on normal tax once taxable income passes a threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurchargeRule {
    pub threshold: BigDecimal,
    pub rate: BigDecimal,
}

impl SurchargeRule {
    /// Applies strictly above the threshold
    pub fn applies_to(&self, taxable_income: &BigDecimal) -> bool {
        *taxable_income > self.threshold
    }
}

/// Final/minimum tax rate, which may differ for inactive filers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalTaxRate {
    pub active: BigDecimal,
    pub inactive: BigDecimal,
}

impl FinalTaxRate {
    /// Same rate regardless of filer status
    pub fn flat(rate: BigDecimal) -> Self {
        Self {
            active: rate.clone(),
            inactive: rate,
        }
    }

    pub fn by_filer_status(active: BigDecimal, inactive: BigDecimal) -> Self {
        Self { active, inactive }
    }

    pub fn for_status(&self, status: FilerStatus) -> &BigDecimal {
        match status {
            FilerStatus::Active => &self.active,
            FilerStatus::Inactive => &self.inactive,
        }
    }
}

/// Yearly exemption ceilings for capped income fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExemptionCaps {
    pub medical_allowance: BigDecimal,
    pub provident_fund: BigDecimal,
}

/// Amounts above these are accepted but flagged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanityCeilings {
    /// Annualized salary
    pub annual_salary: BigDecimal,
    /// A single reduction or credit line
    pub adjustment_line: BigDecimal,
    /// Any other single amount
    pub any_amount: BigDecimal,
}

/// Complete rate table for one tax year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxYearRates {
    pub tax_year: TaxYear,
    pub brackets: Vec<TaxBracket>,
    pub surcharge: SurchargeRule,
    pub withholding_rates: BTreeMap<WithholdingCategory, BigDecimal>,
    pub final_tax_rates: BTreeMap<FinalMinCategory, FinalTaxRate>,
    pub exemption_caps: ExemptionCaps,
    pub sanity_ceilings: SanityCeilings,
}

impl FromStr for TaxYearRates {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s)
            .map_err(|e| TaxError::Parse(format!("Failed to parse rate table JSON: {}", e)))
    }
}

impl TaxYearRates {
    /// Rates for the 2025-26 tax year
    pub fn tax_year_2025_26() -> Self {
        let brackets = TaxBracket::schedule(vec![
            (Some(BigDecimal::from(600_000)), BigDecimal::from(0)),
            (Some(BigDecimal::from(1_200_000)), decimal(5, 2)),
            (Some(BigDecimal::from(2_200_000)), decimal(15, 2)),
            (Some(BigDecimal::from(3_200_000)), decimal(25, 2)),
            (Some(BigDecimal::from(4_100_000)), decimal(30, 2)),
            (None, decimal(35, 2)),
        ]);

        let withholding_rates = BTreeMap::from([
            (WithholdingCategory::DirectorshipFee, decimal(20, 2)),
            (WithholdingCategory::ProfitOnDebt, decimal(15, 2)),
            (WithholdingCategory::SukukProfit, decimal(125, 3)),
            (WithholdingCategory::Rent, decimal(10, 2)),
            (WithholdingCategory::MotorVehicleTransfer, decimal(3, 2)),
            (WithholdingCategory::MotorVehicleLeasing, decimal(4, 2)),
            (WithholdingCategory::ElectricityDomestic, decimal(75, 3)),
            (WithholdingCategory::TelephoneBill, decimal(15, 2)),
            (WithholdingCategory::PrepaidTelephoneCard, decimal(15, 2)),
            (WithholdingCategory::PhoneUnit, decimal(15, 2)),
            (WithholdingCategory::InternetBill, decimal(15, 2)),
            (WithholdingCategory::PrepaidInternetCard, decimal(15, 2)),
            (WithholdingCategory::CellphoneBill, decimal(15, 2)),
            // Published as 92%, far above every other rate; kept as published
            (WithholdingCategory::BonusShares, decimal(92, 2)),
        ]);

        let final_tax_rates = BTreeMap::from([
            (FinalMinCategory::DividendReitSpv, FinalTaxRate::flat(BigDecimal::from(0))),
            (
                FinalMinCategory::DividendOtherSpv,
                FinalTaxRate::by_filer_status(decimal(35, 2), decimal(70, 2)),
            ),
            (
                FinalMinCategory::DividendIpp,
                FinalTaxRate::by_filer_status(decimal(75, 3), decimal(15, 2)),
            ),
            (
                FinalMinCategory::DividendRegular,
                FinalTaxRate::by_filer_status(decimal(15, 2), decimal(30, 2)),
            ),
            (
                FinalMinCategory::DividendDebtFunds,
                FinalTaxRate::by_filer_status(decimal(25, 2), decimal(50, 2)),
            ),
            (
                FinalMinCategory::DividendInSpecie,
                FinalTaxRate::by_filer_status(decimal(15, 2), decimal(30, 2)),
            ),
            (FinalMinCategory::ProfitOnDebt, FinalTaxRate::flat(decimal(15, 2))),
            (FinalMinCategory::ProfitOnDebtAbove5M, FinalTaxRate::flat(decimal(15, 2))),
            (FinalMinCategory::GovernmentSecuritiesFcva, FinalTaxRate::flat(decimal(10, 2))),
            (FinalMinCategory::SukukUpTo1M, FinalTaxRate::flat(decimal(10, 2))),
            (FinalMinCategory::Sukuk1MTo5M, FinalTaxRate::flat(decimal(125, 3))),
            (FinalMinCategory::SukukAbove5M, FinalTaxRate::flat(decimal(25, 2))),
            (FinalMinCategory::PrizeBond, FinalTaxRate::flat(decimal(15, 2))),
            (FinalMinCategory::RaffleLottery, FinalTaxRate::flat(decimal(20, 2))),
        ]);

        Self {
            tax_year: TaxYear(2026),
            brackets,
            surcharge: SurchargeRule {
                threshold: BigDecimal::from(10_000_000),
                rate: decimal(10, 2),
            },
            withholding_rates,
            final_tax_rates,
            exemption_caps: ExemptionCaps {
                medical_allowance: BigDecimal::from(120_000),
                provident_fund: BigDecimal::from(150_000),
            },
            sanity_ceilings: SanityCeilings {
                annual_salary: BigDecimal::from(120_000_000),
                adjustment_line: BigDecimal::from(5_000_000),
                any_amount: BigDecimal::from(1_000_000_000i64),
            },
        }
    }

    /// Rate of the highest slab
    pub fn top_rate(&self) -> BigDecimal {
        self.brackets
            .last()
            .map(|bracket| bracket.rate.clone())
            .unwrap_or_else(|| BigDecimal::from(0))
    }

    pub fn withholding_rate(&self, category: WithholdingCategory) -> Option<&BigDecimal> {
        self.withholding_rates.get(&category)
    }

    pub fn final_tax_rate(
        &self,
        category: FinalMinCategory,
        status: FilerStatus,
    ) -> Option<&BigDecimal> {
        self.final_tax_rates
            .get(&category)
            .map(|rate| rate.for_status(status))
    }

    pub fn exemption_cap(&self, cap: ExemptionCap) -> &BigDecimal {
        match cap {
            ExemptionCap::MedicalAllowance => &self.exemption_caps.medical_allowance,
            ExemptionCap::ProvidentFund => &self.exemption_caps.provident_fund,
        }
    }

    /// Check the table is usable: slabs start at 0, are contiguous, end
    /// unbounded and carry consistent fixed bases; every statutory rate is
    /// present and within [0, 1].
    pub fn validate(&self) -> TaxResult<()> {
        let year = self.tax_year;
        TaxBracket::validate_table(&self.brackets).map_err(|e| match e {
            TaxError::Configuration(message) => {
                TaxError::Configuration(format!("{} for {}", message, year))
            }
            other => other,
        })?;

        validate_rate("surcharge", &self.surcharge.rate)?;

        for category in WithholdingCategory::ALL {
            match self.withholding_rates.get(&category) {
                Some(rate) => validate_rate(category.name(), rate)?,
                None if category.requires_reported_tax() => {}
                None => {
                    return Err(TaxError::Configuration(format!(
                        "No withholding rate for {} in {}",
                        category.name(),
                        year
                    )));
                }
            }
        }

        for category in FinalMinCategory::ALL {
            let needs_rate = matches!(category.regime(), TaxRegime::Final | TaxRegime::Minimum);
            match self.final_tax_rates.get(&category) {
                Some(rate) => {
                    validate_rate(category.name(), &rate.active)?;
                    validate_rate(category.name(), &rate.inactive)?;
                }
                None if needs_rate => {
                    return Err(TaxError::Configuration(format!(
                        "No final tax rate for {} in {}",
                        category.name(),
                        year
                    )));
                }
                None => {}
            }
        }

        Ok(())
    }
}

impl SlabProvider for TaxYearRates {
    fn rates_for(&self, tax_year: TaxYear) -> TaxResult<TaxYearRates> {
        if tax_year == self.tax_year {
            Ok(self.clone())
        } else {
            Err(missing_year(tax_year))
        }
    }
}

/// Slab provider over a fixed set of rate tables
#[derive(Debug, Clone, Default)]
pub struct StaticSlabProvider {
    years: BTreeMap<TaxYear, TaxYearRates>,
}

impl StaticSlabProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider holding every built-in rate table
    pub fn builtin() -> Self {
        let mut provider = Self::new();
        provider
            .years
            .insert(TaxYear(2026), TaxYearRates::tax_year_2025_26());
        provider
    }

    /// Add a rate table after validating it, replacing any table for the same year
    pub fn insert(&mut self, rates: TaxYearRates) -> TaxResult<()> {
        rates.validate()?;
        self.years.insert(rates.tax_year, rates);
        Ok(())
    }

    pub fn tax_years(&self) -> Vec<TaxYear> {
        self.years.keys().copied().collect()
    }
}

impl SlabProvider for StaticSlabProvider {
    fn rates_for(&self, tax_year: TaxYear) -> TaxResult<TaxYearRates> {
        self.years
            .get(&tax_year)
            .cloned()
            .ok_or_else(|| missing_year(tax_year))
    }
}

pub(crate) fn missing_year(tax_year: TaxYear) -> TaxError {
    TaxError::Configuration(format!("No tax rates configured for tax year {}", tax_year))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_is_valid() {
        let rates = TaxYearRates::tax_year_2025_26();
        assert!(rates.validate().is_ok());
        assert_eq!(rates.brackets.len(), 6);
        assert_eq!(rates.top_rate(), decimal(35, 2));
    }

    #[test]
    fn test_schedule_fixed_bases() {
        let rates = TaxYearRates::tax_year_2025_26();
        let bases: Vec<BigDecimal> = rates
            .brackets
            .iter()
            .map(|bracket| bracket.fixed_base_amount.clone())
            .collect();

        assert_eq!(
            bases,
            vec![
                BigDecimal::from(0),
                BigDecimal::from(0),
                BigDecimal::from(30_000),
                BigDecimal::from(180_000),
                BigDecimal::from(430_000),
                BigDecimal::from(700_000),
            ]
        );
    }

    #[test]
    fn test_bracket_lower_bound_is_exclusive() {
        let rates = TaxYearRates::tax_year_2025_26();
        let second = &rates.brackets[1];

        assert!(!second.contains(&BigDecimal::from(600_000)));
        assert!(second.contains(&BigDecimal::from(600_001)));
        assert!(second.contains(&BigDecimal::from(1_200_000)));
        assert!(rates.brackets[5].contains(&BigDecimal::from(1_000_000_000i64)));
    }

    #[test]
    fn test_validate_rejects_gap() {
        let mut rates = TaxYearRates::tax_year_2025_26();
        rates.brackets[2].min_income = BigDecimal::from(1_300_000);
        assert!(matches!(rates.validate(), Err(TaxError::Configuration(_))));
    }

    #[test]
    fn test_validate_rejects_wrong_fixed_base() {
        let mut rates = TaxYearRates::tax_year_2025_26();
        rates.brackets[3].fixed_base_amount = BigDecimal::from(100_000);
        assert!(matches!(rates.validate(), Err(TaxError::Configuration(_))));
    }

    #[test]
    fn test_validate_rejects_bounded_top_and_empty_table() {
        let mut rates = TaxYearRates::tax_year_2025_26();
        rates.brackets[5].max_income = Some(BigDecimal::from(50_000_000));
        assert!(rates.validate().is_err());

        rates.brackets.clear();
        assert!(rates.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_missing_withholding_rate() {
        let mut rates = TaxYearRates::tax_year_2025_26();
        rates.withholding_rates.remove(&WithholdingCategory::Rent);
        assert!(matches!(rates.validate(), Err(TaxError::Configuration(_))));
    }

    #[test]
    fn test_filer_status_rates() {
        let rates = TaxYearRates::tax_year_2025_26();
        assert_eq!(
            rates.final_tax_rate(FinalMinCategory::DividendRegular, FilerStatus::Inactive),
            Some(&decimal(30, 2))
        );
        assert_eq!(
            rates.final_tax_rate(FinalMinCategory::PrizeBond, FilerStatus::Inactive),
            Some(&decimal(15, 2))
        );
        assert_eq!(rates.final_tax_rate(FinalMinCategory::Salary, FilerStatus::Active), None);
    }

    #[test]
    fn test_json_round_trip_through_from_str() {
        let rates = TaxYearRates::tax_year_2025_26();
        let json = serde_json::to_string(&rates).unwrap();
        let parsed: TaxYearRates = json.parse().unwrap();
        assert_eq!(parsed, rates);

        let bad = "{\"tax_year\": 2026}".parse::<TaxYearRates>();
        assert!(matches!(bad, Err(TaxError::Parse(_))));
    }

    #[test]
    fn test_static_provider_missing_year() {
        let provider = StaticSlabProvider::builtin();
        assert!(provider.rates_for(TaxYear(2026)).is_ok());
        assert!(matches!(
            provider.rates_for(TaxYear(2019)),
            Err(TaxError::Configuration(_))
        ));
        assert_eq!(provider.tax_years(), vec![TaxYear(2026)]);
    }
}
