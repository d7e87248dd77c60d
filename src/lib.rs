//! Loan Amortization - installment solver and repayment schedule generator
//!
//! This library provides:
//! - Annuity formulas for installment, principal and tenure
//! - Deriving whichever loan field was not given from the other three
//! - Month-by-month amortization schedules with final-payment correction
//! - CSV loading of loan batches and CSV export of schedules
//! - Parallel batch and rate-sensitivity runs

pub mod amortization;
pub mod config;
pub mod error;
pub mod export;
pub mod loan;
pub mod scenario;

// Re-export commonly used types
pub use amortization::{Calculation, Schedule, ScheduleEntry, ScheduleSummary, SolveFor, YearMonth};
pub use config::CalculatorConfig;
pub use error::{AmortizationError, Unresolvable};
pub use loan::{LoanField, LoanInputs, LoanScenario, LoanTerms};
pub use scenario::{RatePoint, ScenarioResult, ScenarioRunner};
