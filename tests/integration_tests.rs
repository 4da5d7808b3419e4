//! Integration tests for income-tax-core

use bigdecimal::BigDecimal;
use income_tax_core::{
    AdjustableTaxLineItem, ComprehensiveTaxComputation, CreditCategory, CreditLineItem,
    FieldSource, FilerStatus, FilingKey, FilingSnapshot, FinalMinCategory, FinalMinTaxLineItem,
    MemoryStorage, SlabProvider, TaxComputationService, TaxError, TaxYear, TaxYearRates,
    WarningKind, WithholdingCategory,
};
use uuid::Uuid;

/// Route engine logs to the test writer
fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .finish();
    tracing::subscriber::set_default(subscriber)
}

fn storage_with(snapshots: Vec<FilingSnapshot>) -> MemoryStorage {
    let storage = MemoryStorage::with_builtin_rates().unwrap();
    for snapshot in snapshots {
        storage.put_snapshot(snapshot).unwrap();
    }
    storage
}

fn salaried(user_id: Uuid, monthly_basic: i64, bonus: i64) -> FilingSnapshot {
    let mut snapshot = FilingSnapshot::new(FilingKey::new(user_id, TaxYear(2026)));
    snapshot.income.monthly_basic_salary = BigDecimal::from(monthly_basic);
    snapshot.income.bonus_commission = BigDecimal::from(bonus);
    snapshot
}

#[tokio::test]
async fn test_complete_filing_workflow() {
    let _guard = init_test_tracing();
    let user_id = Uuid::new_v4();
    let mut snapshot = salaried(user_id, 1_000_000, 2_880_000);
    snapshot.adjustable_tax.lines.push(
        AdjustableTaxLineItem::new(WithholdingCategory::Salary, BigDecimal::from(0))
            .with_tax_collected(BigDecimal::from(3_000_000)),
    );
    let key = snapshot.key;

    let service = TaxComputationService::new(storage_with(vec![snapshot]));
    let result = service.compute(&key).await.unwrap();

    assert_eq!(result.gross_income, BigDecimal::from(14_880_000));
    assert_eq!(result.taxable_income, BigDecimal::from(14_880_000));
    assert_eq!(result.normal_tax, BigDecimal::from(4_473_000));
    assert_eq!(result.surcharge, BigDecimal::from(447_300));
    assert_eq!(result.total_liability, BigDecimal::from(4_920_300));
    assert_eq!(result.total_paid, BigDecimal::from(3_000_000));
    assert_eq!(result.additional_tax_due, BigDecimal::from(1_920_300));
    assert_eq!(result.refund_due, BigDecimal::from(0));

    // The salary line on the final/minimum schedule is informational only
    let salary_line = result
        .final_min_lines
        .iter()
        .find(|line| line.category == FinalMinCategory::Salary)
        .unwrap();
    assert_eq!(salary_line.amount, BigDecimal::from(14_880_000));
    assert_eq!(salary_line.tax_deducted, BigDecimal::from(3_000_000));
    assert_eq!(result.final_tax_total, BigDecimal::from(0));
}

#[tokio::test]
async fn test_refund_and_due_are_exclusive() {
    let user_id = Uuid::new_v4();
    let mut overpaid = salaried(user_id, 600_000, 1_540_000);
    overpaid.deductions.advance_tax_paid = BigDecimal::from(2_500_000);
    let key = overpaid.key;

    let service = TaxComputationService::new(storage_with(vec![overpaid]));
    let result = service.compute(&key).await.unwrap();

    assert_eq!(result.normal_tax, BigDecimal::from(2_324_000));
    assert_eq!(result.refund_due, BigDecimal::from(176_000));
    assert_eq!(result.additional_tax_due, BigDecimal::from(0));
    assert_eq!(
        &result.refund_due - &result.additional_tax_due,
        &result.total_paid - &result.total_liability
    );
}

#[tokio::test]
async fn test_link_filing_returns_linked_snapshot_without_writing() {
    let user_id = Uuid::new_v4();
    let mut snapshot = salaried(user_id, 0, 0);
    snapshot.income.rent_income = BigDecimal::from(1_200_000);
    let key = snapshot.key;

    let storage = storage_with(vec![snapshot.clone()]);
    let service = TaxComputationService::new(storage.clone());

    let outcome = service.link_filing(&key).await.unwrap();
    let rent = outcome
        .snapshot
        .adjustable_tax
        .line(WithholdingCategory::Rent)
        .unwrap();
    assert_eq!(rent.gross_receipt, BigDecimal::from(1_200_000));
    assert_eq!(rent.gross_receipt_source, FieldSource::Linked);

    // Persisting is the caller's job
    let stored = service.snapshot(&key).await.unwrap();
    assert_eq!(stored, snapshot);

    // Linking the linked snapshot again changes nothing
    storage.put_snapshot(outcome.snapshot.clone()).unwrap();
    let again = service.link_filing(&key).await.unwrap();
    assert_eq!(again.snapshot, outcome.snapshot);
    assert!(again.applied.is_empty());

    // Rent tax is computed on the linked gross receipt
    let result = service.compute(&key).await.unwrap();
    assert_eq!(result.adjustable_tax_total, BigDecimal::from(120_000));
}

#[tokio::test]
async fn test_inactive_filer_dividends() {
    let user_id = Uuid::new_v4();
    let mut snapshot = FilingSnapshot::new(FilingKey::new(user_id, TaxYear(2026)));
    snapshot.filer_status = FilerStatus::Inactive;
    snapshot.final_min_tax.lines.push(FinalMinTaxLineItem::new(
        FinalMinCategory::DividendRegular,
        BigDecimal::from(1_000_000),
        BigDecimal::from(300_000),
    ));
    let key = snapshot.key;

    let service = TaxComputationService::new(storage_with(vec![snapshot]));
    let result = service.compute(&key).await.unwrap();

    assert_eq!(result.final_tax_total, BigDecimal::from(300_000));
    assert_eq!(result.total_paid, BigDecimal::from(300_000));
    assert!(result.warnings_of(WarningKind::Compliance).next().is_none());
}

#[tokio::test]
async fn test_partial_filing_with_warnings() {
    let _guard = init_test_tracing();
    let user_id = Uuid::new_v4();
    let mut snapshot = FilingSnapshot::new(FilingKey::new(user_id, TaxYear(2026)));
    snapshot.income.other_income = BigDecimal::from(-25_000);
    snapshot.credits.push(CreditLineItem::new(
        CreditCategory::InvestmentTaxCredit,
        BigDecimal::from(6_000_000),
    ));
    let key = snapshot.key;

    let service = TaxComputationService::new(storage_with(vec![snapshot]));
    let result = service.compute(&key).await.unwrap();

    assert_eq!(result.gross_income, BigDecimal::from(0));
    assert_eq!(result.net_tax_payable, BigDecimal::from(-6_000_000));
    // Clamped income, credit above its ceiling, negative net tax
    assert_eq!(result.warnings_of(WarningKind::Validation).count(), 3);
}

#[tokio::test]
async fn test_missing_filing_and_missing_rates() {
    let user_id = Uuid::new_v4();
    let service = TaxComputationService::new(storage_with(vec![]));

    let missing = FilingKey::new(user_id, TaxYear(2026));
    assert!(matches!(
        service.compute(&missing).await,
        Err(TaxError::FilingNotFound(_))
    ));

    let storage = MemoryStorage::new();
    storage
        .put_snapshot(FilingSnapshot::new(FilingKey::new(user_id, TaxYear(2026))))
        .unwrap();
    let service = TaxComputationService::new(storage);
    assert!(matches!(
        service.compute(&FilingKey::new(user_id, TaxYear(2026))).await,
        Err(TaxError::Configuration(_))
    ));
}

#[tokio::test]
async fn test_invalid_rate_table_is_rejected() {
    let user_id = Uuid::new_v4();
    let snapshot = salaried(user_id, 100_000, 0);
    let key = snapshot.key;

    let mut rates = TaxYearRates::tax_year_2025_26();
    rates.brackets.remove(0);

    let storage = MemoryStorage::new();
    storage.put_rates(rates).unwrap();
    storage.put_snapshot(snapshot).unwrap();

    let service = TaxComputationService::new(storage);
    assert!(matches!(
        service.compute(&key).await,
        Err(TaxError::Configuration(_))
    ));
}

#[tokio::test]
async fn test_compute_for_user() {
    let user_id = Uuid::new_v4();
    let current = salaried(user_id, 600_000, 1_540_000);
    let other_user = salaried(Uuid::new_v4(), 1_000_000, 0);

    let service = TaxComputationService::new(storage_with(vec![current, other_user]));
    let results = service.compute_for_user(&user_id).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].0.user_id, user_id);
    assert_eq!(results[0].1.normal_tax, BigDecimal::from(2_324_000));
}

#[tokio::test]
async fn test_service_matches_direct_engine() {
    let user_id = Uuid::new_v4();
    let mut snapshot = salaried(user_id, 450_000, 300_000);
    snapshot.income.profit_on_debt_15_percent = BigDecimal::from(900_000);
    snapshot.income.monthly_medical_allowance = BigDecimal::from(12_000);
    let key = snapshot.key;

    let storage = storage_with(vec![snapshot.clone()]);
    let service = TaxComputationService::new(storage.clone());

    let via_service = service.compute(&key).await.unwrap();
    let direct = ComprehensiveTaxComputation::new(&storage)
        .compute(&snapshot)
        .unwrap();
    assert_eq!(via_service, direct);

    let rates = storage.rates_for(TaxYear(2026)).unwrap();
    assert_eq!(rates, TaxYearRates::tax_year_2025_26());
}
