//! Tax calculators

pub mod final_min;
pub mod income;
pub mod linking;
pub mod progressive;
pub mod withholding;

pub use final_min::*;
pub use income::*;
pub use linking::*;
pub use progressive::*;
pub use withholding::*;
