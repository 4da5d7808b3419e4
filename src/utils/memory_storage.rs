//! In-memory storage implementation for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::config::{missing_year, TaxYearRates};
use crate::forms::FilingSnapshot;
use crate::traits::*;
use crate::types::*;

fn poisoned<T>(_: T) -> TaxError {
    TaxError::Storage("Memory storage lock poisoned".to_string())
}

/// In-memory storage implementation for testing and development
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    snapshots: Arc<RwLock<HashMap<FilingKey, FilingSnapshot>>>,
    rates: Arc<RwLock<HashMap<TaxYear, TaxYearRates>>>,
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self {
            snapshots: Arc::new(RwLock::new(HashMap::new())),
            rates: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Storage preloaded with the built-in rate tables
    pub fn with_builtin_rates() -> TaxResult<Self> {
        let storage = Self::new();
        storage.put_rates(TaxYearRates::tax_year_2025_26())?;
        Ok(storage)
    }

    /// Store a snapshot, replacing any snapshot with the same key
    pub fn put_snapshot(&self, snapshot: FilingSnapshot) -> TaxResult<()> {
        self.snapshots
            .write()
            .map_err(poisoned)?
            .insert(snapshot.key, snapshot);
        Ok(())
    }

    /// Store a rate table, replacing any table for the same year
    pub fn put_rates(&self, rates: TaxYearRates) -> TaxResult<()> {
        self.rates
            .write()
            .map_err(poisoned)?
            .insert(rates.tax_year, rates);
        Ok(())
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> TaxResult<()> {
        self.snapshots.write().map_err(poisoned)?.clear();
        self.rates.write().map_err(poisoned)?.clear();
        Ok(())
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FilingRepository for MemoryStorage {
    async fn load_snapshot(&self, key: &FilingKey) -> TaxResult<Option<FilingSnapshot>> {
        Ok(self.snapshots.read().map_err(poisoned)?.get(key).cloned())
    }

    async fn load_rates(&self, tax_year: TaxYear) -> TaxResult<Option<TaxYearRates>> {
        Ok(self.rates.read().map_err(poisoned)?.get(&tax_year).cloned())
    }

    async fn list_filings(&self, user_id: &Uuid) -> TaxResult<Vec<FilingKey>> {
        let snapshots = self.snapshots.read().map_err(poisoned)?;
        let mut keys: Vec<FilingKey> = snapshots
            .keys()
            .filter(|key| key.user_id == *user_id)
            .copied()
            .collect();
        keys.sort_by_key(|key| key.tax_year);
        Ok(keys)
    }
}

impl SlabProvider for MemoryStorage {
    fn rates_for(&self, tax_year: TaxYear) -> TaxResult<TaxYearRates> {
        self.rates
            .read()
            .map_err(poisoned)?
            .get(&tax_year)
            .cloned()
            .ok_or_else(|| missing_year(tax_year))
    }
}
