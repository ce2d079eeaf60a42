pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "fixed_income")]
pub mod fixed_income;

#[cfg(feature = "site")]
pub mod site;

pub use error::BondReturnError;
pub use types::*;

/// Standard result type for all bond-return operations
pub type BondReturnResult<T> = Result<T, BondReturnError>;
