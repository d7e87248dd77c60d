//! Amortization engine: annuity math, schedule generation and field solving

pub mod engine;
mod period;
mod schedule;
pub mod solver;
mod state;

pub use engine::{
    ceil_periods, compute_installment, compute_principal, compute_tenure, generate_schedule,
    monthly_rate, MAX_TENURE_MONTHS,
};
pub use period::YearMonth;
pub use schedule::{Schedule, ScheduleEntry, ScheduleSummary};
pub use solver::{calculate, calculate_with, solve, Calculation, SolveFor};
pub use state::BalanceState;
