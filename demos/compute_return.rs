//! Computing a full return for one salaried taxpayer

use bigdecimal::BigDecimal;
use income_tax_core::{
    AdjustableTaxLineItem, CreditCategory, CreditLineItem, FilingKey, FilingSnapshot,
    FinalMinCategory, FinalMinTaxLineItem, MemoryStorage, TaxComputationService, TaxYear,
    WithholdingCategory,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("Income Tax Core - Comprehensive Return\n");

    let tax_year: TaxYear = "2025-26".parse()?;
    let key = FilingKey::new(Uuid::new_v4(), tax_year);

    let mut snapshot = FilingSnapshot::new(key);
    snapshot.income.monthly_basic_salary = BigDecimal::from(1_000_000);
    snapshot.income.monthly_medical_allowance = BigDecimal::from(10_000);
    snapshot.income.bonus_commission = BigDecimal::from(2_880_000);
    snapshot.income.rent_income = BigDecimal::from(1_800_000);
    snapshot.adjustable_tax.lines.push(
        AdjustableTaxLineItem::new(WithholdingCategory::Salary, BigDecimal::from(0))
            .with_tax_collected(BigDecimal::from(3_000_000)),
    );
    snapshot.final_min_tax.lines.push(FinalMinTaxLineItem::new(
        FinalMinCategory::DividendRegular,
        BigDecimal::from(400_000),
        BigDecimal::from(60_000),
    ));
    snapshot.credits.push(CreditLineItem::new(
        CreditCategory::CharitableDonation,
        BigDecimal::from(150_000),
    ));
    snapshot.deductions.zakat_paid = BigDecimal::from(50_000);

    let storage = MemoryStorage::with_builtin_rates()?;
    storage.put_snapshot(snapshot)?;
    let service = TaxComputationService::new(storage);

    let outcome = service.link_filing(&key).await?;
    println!("Linked values ({}):", outcome.applied.len());
    for link in &outcome.applied {
        println!("  {:?} -> {:?}: {}", link.rule.source, link.rule.target, link.value);
    }
    println!();

    let result = service.compute(&key).await?;

    println!("Tax year {}", result.tax_year);
    println!("  Gross income:        {}", result.gross_income);
    println!("  Exempt income:       {}", result.exempt_income);
    println!("  Deductions:          {}", result.deductible_allowances);
    println!("  Taxable income:      {}", result.taxable_income);
    println!();

    println!("Slabs:");
    for slab in &result.bracket_breakdown {
        println!(
            "  {:>2} @ {:<5} on {:>12} = {}",
            slab.order, slab.rate, slab.taxable_amount, slab.tax
        );
    }
    println!();

    println!("  Normal tax:          {}", result.normal_tax);
    println!("  Surcharge:           {}", result.surcharge);
    println!("  Credits:             {}", result.tax_credits);
    println!("  Net tax payable:     {}", result.net_tax_payable);
    println!("  Final/minimum tax:   {}", result.final_tax_total);
    println!("  Total liability:     {}", result.total_liability);
    println!("  Total paid:          {}", result.total_paid);
    println!("  Refund due:          {}", result.refund_due);
    println!("  Additional tax due:  {}", result.additional_tax_due);

    if !result.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &result.warnings {
            println!("  [{:?}] {}", warning.kind(), warning);
        }
    }

    Ok(())
}
