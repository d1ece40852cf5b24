//! Loan records, validation and sheet loading

mod data;
pub mod loader;
pub mod validate;

pub use data::{Loan, LoanRecord, RateFormat};
pub use loader::{load_loans, load_records, load_records_from_reader};
pub use validate::{validate_loans, validate_records, ValidatedLoans, ValidationWarning};
