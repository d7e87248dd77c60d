//! Running balance tracked while a schedule is generated

use super::period::YearMonth;
use super::schedule::ScheduleEntry;

/// Residual balance, relative to the original principal, swept into the last
/// scheduled payment instead of being left outstanding
const RESIDUAL_TOLERANCE: f64 = 1e-10;

/// State of the loan between repayment periods
#[derive(Debug, Clone)]
pub struct BalanceState {
    /// Last period processed (0 before the first payment)
    pub month: u32,

    /// Outstanding balance
    pub balance: f64,

    /// Working installment; replaced by the exact payoff amount on the final period
    pub installment: f64,

    /// Monthly interest rate as a decimal
    pub monthly_rate: f64,

    principal: f64,
    start: YearMonth,
}

impl BalanceState {
    /// Initialize state at loan origination
    pub fn new(principal: f64, monthly_rate: f64, installment: f64, start: YearMonth) -> Self {
        Self {
            month: 0,
            balance: principal,
            installment,
            monthly_rate,
            principal,
            start,
        }
    }

    pub fn is_paid_off(&self) -> bool {
        self.balance <= 0.0
    }

    /// Apply one payment and return the resulting schedule entry.
    ///
    /// On the last scheduled period a rounding residue left by the level
    /// installment is paid off with it.
    pub fn advance_month(&mut self, last_period: bool) -> ScheduleEntry {
        self.month += 1;

        let interest = self.balance * self.monthly_rate;
        let mut principal = self.installment - interest;

        // Final payment retires whatever is left
        if self.balance < self.installment {
            principal = self.balance;
            self.installment = self.balance + interest;
        }

        self.balance -= principal;

        // Fold floating-point overshoot back into the principal portion
        if self.balance < 0.0 {
            principal += self.balance;
            self.balance = 0.0;
        }

        if last_period && self.balance > 0.0 && self.balance <= self.principal * RESIDUAL_TOLERANCE {
            principal += self.balance;
            self.installment += self.balance;
            self.balance = 0.0;
        }

        ScheduleEntry {
            month: self.month,
            period: self.start.plus_months(self.month - 1),
            principal,
            interest,
            payment: self.installment,
            remaining_balance: self.balance,
        }
    }
}
