//! Traits for rate lookup and filing storage

use async_trait::async_trait;

use crate::config::TaxYearRates;
use crate::forms::FilingSnapshot;
use crate::types::*;

/// Read-only source of slabs and category rates.
///
/// Lookups are synchronous; anything that has to hit a database should load
/// the table up front (see [`FilingRepository::load_rates`]).
pub trait SlabProvider: Send + Sync {
    /// Rate table for a tax year, or `TaxError::Configuration` if none exists
    fn rates_for(&self, tax_year: TaxYear) -> TaxResult<TaxYearRates>;
}

/// Storage abstraction for filings and rate tables
///
/// The computation core only ever reads through this trait; persisting forms
/// and results is the caller's concern.
#[async_trait]
pub trait FilingRepository: Send + Sync {
    /// Load the form snapshot for one filing
    async fn load_snapshot(&self, key: &FilingKey) -> TaxResult<Option<FilingSnapshot>>;

    /// Load the rate table for a tax year
    async fn load_rates(&self, tax_year: TaxYear) -> TaxResult<Option<TaxYearRates>>;

    /// List every filing a user has, ordered by tax year
    async fn list_filings(&self, user_id: &uuid::Uuid) -> TaxResult<Vec<FilingKey>>;
}
