//! Loan terms, raw input parsing and scenario loading

mod terms;
pub mod loader;

pub use terms::{months_to_years, parse_amount, years_to_months, LoanField, LoanInputs, LoanTerms};
pub use loader::{load_loans, load_loans_from_reader, LoanScenario};
