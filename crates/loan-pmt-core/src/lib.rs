pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "loan")]
pub mod loan;

pub use error::LoanPmtError;
pub use types::*;

/// Standard result type for all loan-pmt operations
pub type LoanPmtResult<T> = Result<T, LoanPmtError>;
