//! # Income Tax Core
//!
//! Computes a taxpayer's total income tax liability for one fiscal year and
//! reconciles it against tax already paid.
//!
//! ## Features
//!
//! - **Progressive slabs**: cumulative bracket tax with per-slab breakdown
//! - **Income aggregation**: monthly to annual conversion and capped exemptions
//! - **Withholding tax**: tax collected at source per receipt category
//! - **Final/minimum tax**: final, minimum and average-rate regimes
//! - **Cross-form linking**: declarative, idempotent defaults between forms
//! - **Reconciliation**: refund or additional tax due against tax paid
//! - **Storage abstraction**: inputs are read through a repository trait
//!
//! ## Quick Start
//!
//! ```rust
//! use income_tax_core::{
//!     ComprehensiveTaxComputation, FilingKey, FilingSnapshot, StaticSlabProvider, TaxYear,
//! };
//! use bigdecimal::BigDecimal;
//! use uuid::Uuid;
//!
//! let provider = StaticSlabProvider::builtin();
//! let mut snapshot = FilingSnapshot::new(FilingKey::new(Uuid::new_v4(), TaxYear(2026)));
//! snapshot.income.monthly_basic_salary = BigDecimal::from(600_000);
//! snapshot.income.bonus_commission = BigDecimal::from(1_540_000);
//!
//! let result = ComprehensiveTaxComputation::new(&provider).compute(&snapshot).unwrap();
//! assert_eq!(result.normal_tax, BigDecimal::from(2_324_000));
//! ```

pub mod computation;
pub mod config;
pub mod forms;
pub mod tax;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use computation::*;
pub use config::*;
pub use forms::*;
pub use tax::*;
pub use traits::*;
pub use types::*;
pub use utils::memory_storage::MemoryStorage;
