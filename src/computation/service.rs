//! Boundary service: loads inputs from a repository and runs the engine

use tracing::{debug, info};
use uuid::Uuid;

use crate::computation::engine::{compute_with_rates, ComprehensiveResult};
use crate::config::{missing_year, TaxYearRates};
use crate::forms::FilingSnapshot;
use crate::tax::{CrossFormLinker, LinkOutcome};
use crate::traits::FilingRepository;
use crate::types::*;

/// Tax computation over filings held in a repository
///
/// All I/O happens here; the engine itself only sees loaded values.
pub struct TaxComputationService<R: FilingRepository> {
    repository: R,
}

impl<R: FilingRepository> TaxComputationService<R> {
    /// Create a new service over the given repository
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Rate table for a tax year, validated
    pub async fn rates(&self, tax_year: TaxYear) -> TaxResult<TaxYearRates> {
        let rates = self
            .repository
            .load_rates(tax_year)
            .await?
            .ok_or_else(|| missing_year(tax_year))?;
        rates.validate()?;
        Ok(rates)
    }

    /// Snapshot for a filing, or `TaxError::FilingNotFound`
    pub async fn snapshot(&self, key: &FilingKey) -> TaxResult<FilingSnapshot> {
        self.repository
            .load_snapshot(key)
            .await?
            .ok_or_else(|| TaxError::FilingNotFound(key.to_string()))
    }

    /// Compute one filing
    pub async fn compute(&self, key: &FilingKey) -> TaxResult<ComprehensiveResult> {
        debug!(filing = %key, "loading filing for computation");
        let rates = self.rates(key.tax_year).await?;
        let snapshot = self.snapshot(key).await?;
        compute_with_rates(&rates, &snapshot)
    }

    /// Apply cross-form links to a filing. The linked snapshot is returned for
    /// the caller to persist; the repository is not written.
    pub async fn link_filing(&self, key: &FilingKey) -> TaxResult<LinkOutcome> {
        let rates = self.rates(key.tax_year).await?;
        let snapshot = self.snapshot(key).await?;
        CrossFormLinker::new(&rates).link(&snapshot)
    }

    /// Compute every filing a user has, ordered by tax year
    pub async fn compute_for_user(
        &self,
        user_id: &Uuid,
    ) -> TaxResult<Vec<(FilingKey, ComprehensiveResult)>> {
        let keys = self.repository.list_filings(user_id).await?;
        let mut results = Vec::with_capacity(keys.len());

        for key in keys {
            let result = self.compute(&key).await?;
            results.push((key, result));
        }

        info!(user_id = %user_id, filings = results.len(), "computed all filings for user");
        Ok(results)
    }
}
