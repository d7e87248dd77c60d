//! Schedule output structures for amortization runs

use serde::{Deserialize, Serialize};

use super::period::YearMonth;

/// A single repayment period of the schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Period number (1-indexed)
    pub month: u32,

    /// Calendar month the payment falls in
    pub period: YearMonth,

    /// Portion of the payment that reduces the balance
    pub principal: f64,

    /// Interest accrued on the opening balance
    pub interest: f64,

    /// Amount paid this period (differs from the nominal installment only on the final payment)
    pub payment: f64,

    /// Balance outstanding after this payment, never negative
    pub remaining_balance: f64,
}

/// Complete amortization schedule, ordered by period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub entries: Vec<ScheduleEntry>,
}

impl Schedule {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Add an entry
    pub fn add_entry(&mut self, entry: ScheduleEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first(&self) -> Option<&ScheduleEntry> {
        self.entries.first()
    }

    pub fn last(&self) -> Option<&ScheduleEntry> {
        self.entries.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScheduleEntry> {
        self.entries.iter()
    }

    /// Sum of every payment made
    pub fn total_payment(&self) -> f64 {
        self.entries.iter().map(|e| e.payment).sum()
    }

    /// Sum of interest across all periods
    pub fn total_interest(&self) -> f64 {
        self.entries.iter().map(|e| e.interest).sum()
    }

    /// Sum of principal repaid; equals the loan amount for a fully amortized schedule
    pub fn total_principal(&self) -> f64 {
        self.entries.iter().map(|e| e.principal).sum()
    }

    /// Get summary statistics, or `None` for an empty schedule
    pub fn summary(&self) -> Option<ScheduleSummary> {
        let first = self.entries.first()?;
        let last = self.entries.last()?;

        Some(ScheduleSummary {
            total_months: self.entries.len() as u32,
            total_payment: self.total_payment(),
            total_interest: self.total_interest(),
            total_principal: self.total_principal(),
            first_period: first.period,
            end_period: last.period,
            final_payment: last.payment,
            final_balance: last.remaining_balance,
        })
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a ScheduleEntry;
    type IntoIter = std::slice::Iter<'a, ScheduleEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Aggregate totals for a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub total_months: u32,
    pub total_payment: f64,
    pub total_interest: f64,
    pub total_principal: f64,
    pub first_period: YearMonth,
    /// Month of the last payment (loan end date)
    pub end_period: YearMonth,
    pub final_payment: f64,
    pub final_balance: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn entry(month: u32, principal: f64, interest: f64, balance: f64) -> ScheduleEntry {
        ScheduleEntry {
            month,
            period: YearMonth::new(2020, 1).unwrap().plus_months(month - 1),
            principal,
            interest,
            payment: principal + interest,
            remaining_balance: balance,
        }
    }

    #[test]
    fn test_empty_schedule_has_no_summary() {
        let schedule = Schedule::new();
        assert!(schedule.is_empty());
        assert!(schedule.summary().is_none());
        assert_eq!(schedule.total_payment(), 0.0);
    }

    #[test]
    fn test_summary_totals() {
        let mut schedule = Schedule::new();
        schedule.add_entry(entry(1, 480.0, 20.0, 520.0));
        schedule.add_entry(entry(2, 500.0, 10.4, 20.0));
        schedule.add_entry(entry(3, 20.0, 0.4, 0.0));

        let summary = schedule.summary().unwrap();
        assert_eq!(summary.total_months, 3);
        assert_abs_diff_eq!(summary.total_principal, 1000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(summary.total_interest, 30.8, epsilon = 1e-9);
        assert_abs_diff_eq!(summary.total_payment, 1030.8, epsilon = 1e-9);
        assert_abs_diff_eq!(summary.final_payment, 20.4, epsilon = 1e-9);
        assert_eq!(summary.end_period.to_string(), "2020-03");
        assert_eq!(summary.final_balance, 0.0);
    }
}
