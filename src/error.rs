//! Error types for loan calculations

use thiserror::Error;

/// Why a loan quantity could not be derived from the supplied terms
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Unresolvable {
    /// A required input was zero, negative or not a finite number
    #[error("{field} must be a positive number, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    /// The installment never covers the monthly interest, so the balance never falls
    #[error("installment {installment:.2} does not exceed monthly interest {monthly_interest:.2}; loan never amortizes")]
    NeverAmortizes { monthly_interest: f64, installment: f64 },

    /// A tenure longer than the supported maximum, or a derived value that overflowed
    #[error("{field} {value} is outside the supported range")]
    OutOfRange { field: &'static str, value: f64 },

    /// Fewer than three of the four loan fields are known
    #[error("at least three of principal, rate, tenure and installment are required")]
    InsufficientInputs,
}

impl Unresolvable {
    /// Legacy sentinel for callers that expect a bare number:
    /// 0 for "not computable", positive infinity for "never resolves"
    pub fn sentinel(&self) -> f64 {
        match self {
            Unresolvable::NeverAmortizes { .. } => f64::INFINITY,
            Unresolvable::NonPositive { .. }
            | Unresolvable::OutOfRange { .. }
            | Unresolvable::InsufficientInputs => 0.0,
        }
    }
}

/// Errors raised while loading, parsing or exporting loans
#[derive(Debug, Error)]
pub enum AmortizationError {
    #[error(transparent)]
    Unresolvable(#[from] Unresolvable),

    #[error("invalid period '{0}', expected YYYY-MM")]
    InvalidPeriod(String),

    #[error("loan {loan_id}: {reason}")]
    InvalidLoan { loan_id: String, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AmortizationError>;
