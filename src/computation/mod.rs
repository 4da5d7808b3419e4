//! Comprehensive computation and the repository-facing service

pub mod engine;
pub mod service;

pub use engine::*;
pub use service::*;
