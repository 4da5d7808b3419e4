//! Comprehensive tax computation in statutory order

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::TaxYearRates;
use crate::forms::FilingSnapshot;
use crate::tax::{
    BracketTax, CrossFormLinker, FinalMinLine, FinalMinTaxCalculator, IncomeAggregator,
    ProgressiveTaxCalculator, WithholdingCalculator, WithholdingLine,
};
use crate::traits::SlabProvider;
use crate::types::*;
use crate::utils::validation::{check_ceiling, clamp_non_negative, round_currency};

/// Liability for one filing, reconciled against tax paid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComprehensiveResult {
    pub tax_year: TaxYear,
    pub filer_status: FilerStatus,

    pub gross_income: BigDecimal,
    pub exempt_income: BigDecimal,
    /// Zakat and professional expenses deducted from income
    pub deductible_allowances: BigDecimal,
    pub taxable_income: BigDecimal,
    pub capital_gains: BigDecimal,
    pub taxable_income_including_capital_gains: BigDecimal,

    pub normal_tax: BigDecimal,
    pub surcharge: BigDecimal,
    pub capital_gains_tax: BigDecimal,
    pub tax_reductions: BigDecimal,
    pub tax_credits: BigDecimal,
    /// May be negative when reductions and credits exceed the tax
    pub net_tax_payable: BigDecimal,

    pub adjustable_tax_total: BigDecimal,
    pub final_tax_total: BigDecimal,
    pub total_liability: BigDecimal,

    pub advance_tax_paid: BigDecimal,
    pub total_paid: BigDecimal,
    pub refund_due: BigDecimal,
    pub additional_tax_due: BigDecimal,

    pub effective_rate: BigDecimal,
    pub marginal_rate: BigDecimal,
    pub bracket_breakdown: Vec<BracketTax>,
    pub withholding_lines: Vec<WithholdingLine>,
    pub final_min_lines: Vec<FinalMinLine>,
    pub warnings: Vec<TaxWarning>,
}

impl ComprehensiveResult {
    /// `total_paid - total_liability`; equals `refund_due - additional_tax_due`
    pub fn balance(&self) -> BigDecimal {
        &self.total_paid - &self.total_liability
    }

    pub fn warnings_of(&self, kind: WarningKind) -> impl Iterator<Item = &TaxWarning> {
        self.warnings.iter().filter(move |warning| warning.kind() == kind)
    }
}

/// Orchestrates every calculator over one filing snapshot
///
/// The computation is pure: it reads the snapshot and the year's rates and
/// returns a new result without touching either.
pub struct ComprehensiveTaxComputation<'a, P: SlabProvider + ?Sized> {
    provider: &'a P,
}

impl<'a, P: SlabProvider + ?Sized> ComprehensiveTaxComputation<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    /// Link and compute a snapshot with the rates for its tax year
    pub fn compute(&self, snapshot: &FilingSnapshot) -> TaxResult<ComprehensiveResult> {
        let rates = self.provider.rates_for(snapshot.key.tax_year)?;
        compute_with_rates(&rates, snapshot)
    }
}

/// Link and compute a snapshot against an already loaded rate table
pub fn compute_with_rates(
    rates: &TaxYearRates,
    snapshot: &FilingSnapshot,
) -> TaxResult<ComprehensiveResult> {
    if rates.tax_year != snapshot.key.tax_year {
        return Err(TaxError::Configuration(format!(
            "Rates for {} cannot be used for a {} filing",
            rates.tax_year, snapshot.key.tax_year
        )));
    }
    rates.validate()?;

    let zero = BigDecimal::from(0);
    let linked = CrossFormLinker::new(rates).link(snapshot)?.snapshot;

    // 1. Income
    let income = IncomeAggregator::new(rates).aggregate(&linked.income, &linked.capital_gains);
    let mut warnings = income.warnings.clone();

    let deductions = &linked.deductions;
    let deductible_allowances = clamp_non_negative("zakat_paid", &deductions.zakat_paid, &mut warnings)
        + clamp_non_negative(
            "professional_expenses",
            &deductions.professional_expenses,
            &mut warnings,
        );
    let taxable_income = {
        let remaining = &income.taxable_income - &deductible_allowances;
        if remaining < zero {
            zero.clone()
        } else {
            remaining
        }
    };

    // 2. Normal tax
    let progressive = ProgressiveTaxCalculator::new(&rates.brackets)?.calculate(&taxable_income);
    let normal_tax = progressive.tax.clone();

    // 3. Surcharge
    let surcharge = if rates.surcharge.applies_to(&taxable_income) {
        round_currency(&(&normal_tax * &rates.surcharge.rate))
    } else {
        zero.clone()
    };

    // 4. Capital gains tax, computed upstream
    let capital_gains_tax = income.capital_gains_tax.clone();

    // 5. Reductions and credits
    let ceiling = &rates.sanity_ceilings.adjustment_line;
    let mut tax_reductions = BigDecimal::from(0);
    for line in &linked.reductions {
        let name = format!("reduction_{:?}", line.category).to_lowercase();
        let amount = clamp_non_negative(&name, &line.amount, &mut warnings);
        check_ceiling(&name, &amount, ceiling, &mut warnings);
        tax_reductions += amount;
    }
    let mut tax_credits = BigDecimal::from(0);
    for line in &linked.credits {
        let name = format!("credit_{:?}", line.category).to_lowercase();
        let amount = clamp_non_negative(&name, &line.amount, &mut warnings);
        check_ceiling(&name, &amount, ceiling, &mut warnings);
        tax_credits += amount;
    }

    // 6. Net tax payable, deliberately not floored
    let net_tax_payable =
        &normal_tax + &surcharge + &capital_gains_tax - &tax_reductions - &tax_credits;
    if net_tax_payable < zero {
        warnings.push(TaxWarning::NegativeNetTaxPayable {
            net_tax_payable: net_tax_payable.clone(),
        });
    }

    // 7. Final/minimum tax
    let withholding = WithholdingCalculator::new(rates).calculate(&linked.adjustable_tax)?;
    warnings.extend(withholding.warnings.iter().cloned());

    let final_min = FinalMinTaxCalculator::new(rates, linked.filer_status)
        .calculate(&linked.final_min_tax, &progressive.effective_rate)?;
    warnings.extend(final_min.warnings.iter().cloned());

    for line in &withholding.lines {
        check_ceiling(
            line.category.name(),
            &line.gross_receipt,
            &rates.sanity_ceilings.any_amount,
            &mut warnings,
        );
    }
    for line in &final_min.lines {
        check_ceiling(
            line.category.name(),
            &line.amount,
            &rates.sanity_ceilings.any_amount,
            &mut warnings,
        );
    }

    // 8. Liability
    let total_liability = &net_tax_payable + &final_min.final_tax_total;

    // 9. Tax paid
    let advance_tax_paid =
        clamp_non_negative("advance_tax_paid", &deductions.advance_tax_paid, &mut warnings);
    let total_paid =
        &withholding.total_tax_collected + &final_min.tax_deducted_total + &advance_tax_paid;

    // 10. Refund or additional tax
    let balance = &total_paid - &total_liability;
    let (refund_due, additional_tax_due) = if balance > zero {
        (balance, zero.clone())
    } else {
        (zero.clone(), -balance)
    };

    let top_rate = rates.top_rate();
    if progressive.effective_rate > top_rate {
        warnings.push(TaxWarning::EffectiveRateAboveMaximum {
            effective_rate: progressive.effective_rate.clone(),
            maximum_rate: top_rate,
        });
    }

    for warning in &warnings {
        warn!(filing = %snapshot.key, kind = ?warning.kind(), "{}", warning);
    }

    info!(
        filing = %snapshot.key,
        taxable_income = %taxable_income,
        total_liability = %total_liability,
        total_paid = %total_paid,
        refund_due = %refund_due,
        additional_tax_due = %additional_tax_due,
        "tax computed"
    );

    Ok(ComprehensiveResult {
        tax_year: snapshot.key.tax_year,
        filer_status: linked.filer_status,
        gross_income: income.gross_income,
        exempt_income: income.exempt_income,
        deductible_allowances,
        taxable_income_including_capital_gains: &taxable_income + &income.capital_gains,
        taxable_income,
        capital_gains: income.capital_gains,
        normal_tax,
        surcharge,
        capital_gains_tax,
        tax_reductions,
        tax_credits,
        net_tax_payable,
        adjustable_tax_total: withholding.total_tax_collected,
        final_tax_total: final_min.final_tax_total,
        total_liability,
        advance_tax_paid,
        total_paid,
        refund_due,
        additional_tax_due,
        effective_rate: progressive.effective_rate,
        marginal_rate: progressive.marginal_rate,
        bracket_breakdown: progressive.breakdown,
        withholding_lines: withholding.lines,
        final_min_lines: final_min.lines,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StaticSlabProvider;
    use crate::forms::{
        AdjustableTaxLineItem, CapitalGainCategory, CapitalGainLineItem, CreditCategory,
        CreditLineItem, FinalMinCategory, FinalMinTaxLineItem, WithholdingCategory,
    };
    use uuid::Uuid;

    fn salaried(monthly_basic: i64, bonus: i64) -> FilingSnapshot {
        let mut snapshot = FilingSnapshot::new(FilingKey::new(Uuid::new_v4(), TaxYear(2026)));
        snapshot.income.monthly_basic_salary = BigDecimal::from(monthly_basic);
        snapshot.income.bonus_commission = BigDecimal::from(bonus);
        snapshot
    }

    #[test]
    fn test_income_below_surcharge_threshold() {
        let provider = StaticSlabProvider::builtin();
        let engine = ComprehensiveTaxComputation::new(&provider);

        let result = engine.compute(&salaried(600_000, 1_540_000)).unwrap();
        assert_eq!(result.taxable_income, BigDecimal::from(8_740_000));
        assert_eq!(result.normal_tax, BigDecimal::from(2_324_000));
        assert_eq!(result.surcharge, BigDecimal::from(0));
        assert_eq!(result.effective_rate, "0.265904".parse::<BigDecimal>().unwrap());
    }

    #[test]
    fn test_surcharge_and_additional_tax_due() {
        let provider = StaticSlabProvider::builtin();
        let engine = ComprehensiveTaxComputation::new(&provider);

        let mut snapshot = salaried(1_000_000, 2_880_000);
        snapshot.adjustable_tax.lines.push(
            AdjustableTaxLineItem::new(WithholdingCategory::Salary, BigDecimal::from(0))
                .with_tax_collected(BigDecimal::from(3_000_000)),
        );

        let result = engine.compute(&snapshot).unwrap();
        assert_eq!(result.normal_tax, BigDecimal::from(4_473_000));
        assert_eq!(result.surcharge, BigDecimal::from(447_300));
        assert_eq!(result.total_liability, BigDecimal::from(4_920_300));
        assert_eq!(result.total_paid, BigDecimal::from(3_000_000));
        assert_eq!(result.additional_tax_due, BigDecimal::from(1_920_300));
        assert_eq!(result.refund_due, BigDecimal::from(0));
        assert_eq!(
            result.balance(),
            &result.refund_due - &result.additional_tax_due
        );
    }

    #[test]
    fn test_refund_when_overpaid() {
        let provider = StaticSlabProvider::builtin();
        let engine = ComprehensiveTaxComputation::new(&provider);

        let mut snapshot = salaried(100_000, 0);
        snapshot.deductions.advance_tax_paid = BigDecimal::from(50_000);

        // 1,200,000 taxable: 30,000 tax
        let result = engine.compute(&snapshot).unwrap();
        assert_eq!(result.total_liability, BigDecimal::from(30_000));
        assert_eq!(result.refund_due, BigDecimal::from(20_000));
        assert_eq!(result.additional_tax_due, BigDecimal::from(0));
    }

    #[test]
    fn test_deductible_allowances_and_capital_gains() {
        let provider = StaticSlabProvider::builtin();
        let engine = ComprehensiveTaxComputation::new(&provider);

        let mut snapshot = salaried(600_000, 1_540_000);
        snapshot.deductions.zakat_paid = BigDecimal::from(40_000);
        snapshot.capital_gains.push(CapitalGainLineItem::new(
            CapitalGainCategory::Securities,
            BigDecimal::from(1_000_000),
            BigDecimal::from(150_000),
        ));

        let result = engine.compute(&snapshot).unwrap();
        assert_eq!(result.gross_income, BigDecimal::from(8_740_000));
        assert_eq!(result.taxable_income, BigDecimal::from(8_700_000));
        assert_eq!(result.normal_tax, BigDecimal::from(2_310_000));
        assert_eq!(
            result.taxable_income_including_capital_gains,
            BigDecimal::from(9_700_000)
        );
        assert_eq!(result.net_tax_payable, BigDecimal::from(2_460_000));
    }

    #[test]
    fn test_negative_net_tax_is_kept_and_flagged() {
        let provider = StaticSlabProvider::builtin();
        let engine = ComprehensiveTaxComputation::new(&provider);

        let mut snapshot = salaried(100_000, 0);
        snapshot.credits.push(CreditLineItem::new(
            CreditCategory::CharitableDonation,
            BigDecimal::from(50_000),
        ));

        let result = engine.compute(&snapshot).unwrap();
        assert_eq!(result.net_tax_payable, BigDecimal::from(-20_000));
        assert!(result
            .warnings
            .iter()
            .any(|w| matches!(w, TaxWarning::NegativeNetTaxPayable { .. })));
    }

    #[test]
    fn test_final_tax_and_linked_deductions() {
        let provider = StaticSlabProvider::builtin();
        let engine = ComprehensiveTaxComputation::new(&provider);

        let mut snapshot = salaried(0, 0);
        snapshot.income.profit_on_debt_15_percent = BigDecimal::from(400_000);
        snapshot.final_min_tax.lines.push(FinalMinTaxLineItem::new(
            FinalMinCategory::ProfitOnDebt,
            BigDecimal::from(400_000),
            BigDecimal::from(0),
        ));
        snapshot.final_min_tax.lines.push(FinalMinTaxLineItem::new(
            FinalMinCategory::PrizeBond,
            BigDecimal::from(100_000),
            BigDecimal::from(15_000),
        ));

        let result = engine.compute(&snapshot).unwrap();
        // 400,000 is under the zero-rate slab
        assert_eq!(result.normal_tax, BigDecimal::from(0));
        assert_eq!(result.adjustable_tax_total, BigDecimal::from(60_000));
        assert_eq!(result.final_tax_total, BigDecimal::from(75_000));
        // Linked tax deducted is not counted twice
        assert_eq!(result.total_paid, BigDecimal::from(75_000));
        assert_eq!(result.refund_due, BigDecimal::from(0));
        assert_eq!(result.additional_tax_due, BigDecimal::from(0));
    }

    #[test]
    fn test_empty_filing_gives_zero_result() {
        let provider = StaticSlabProvider::builtin();
        let engine = ComprehensiveTaxComputation::new(&provider);
        let snapshot = FilingSnapshot::new(FilingKey::new(Uuid::new_v4(), TaxYear(2026)));

        let result = engine.compute(&snapshot).unwrap();
        assert_eq!(result.total_liability, BigDecimal::from(0));
        assert_eq!(result.total_paid, BigDecimal::from(0));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_missing_year_aborts() {
        let provider = StaticSlabProvider::builtin();
        let engine = ComprehensiveTaxComputation::new(&provider);
        let snapshot = FilingSnapshot::new(FilingKey::new(Uuid::new_v4(), TaxYear(2019)));

        assert!(matches!(
            engine.compute(&snapshot),
            Err(TaxError::Configuration(_))
        ));
    }

    #[test]
    fn test_rates_for_another_year_are_rejected() {
        let rates = TaxYearRates::tax_year_2025_26();
        let snapshot = FilingSnapshot::new(FilingKey::new(Uuid::new_v4(), TaxYear(2025)));
        assert!(compute_with_rates(&rates, &snapshot).is_err());
    }

    #[test]
    fn test_recomputation_is_identical() {
        let rates = TaxYearRates::tax_year_2025_26();
        let engine = ComprehensiveTaxComputation::new(&rates);
        let mut snapshot = salaried(1_000_000, 2_880_000);
        snapshot.income.rent_income = BigDecimal::from(-10);

        let first = serde_json::to_string(&engine.compute(&snapshot).unwrap()).unwrap();
        let second = serde_json::to_string(&engine.compute(&snapshot).unwrap()).unwrap();
        assert_eq!(first, second);
    }
}
