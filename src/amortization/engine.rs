//! Core amortization math: annuity formulas and schedule generation
//!
//! All functions are pure. Quantities that cannot be derived come back as
//! [`Unresolvable`] rather than as magic numbers.

use log::{debug, warn};

use super::period::YearMonth;
use super::schedule::Schedule;
use super::state::BalanceState;
use crate::error::Unresolvable;

/// Longest supported tenure: 100 years of monthly payments
pub const MAX_TENURE_MONTHS: u32 = 1200;

/// Convert an annual percentage rate to a monthly decimal rate (9.55 -> 0.0079583)
pub fn monthly_rate(annual_rate_percent: f64) -> f64 {
    annual_rate_percent / 12.0 / 100.0
}

/// Round a tenure up to a whole number of periods.
/// `None` unless the result lies in `1..=MAX_TENURE_MONTHS`.
pub fn ceil_periods(tenure_months: f64) -> Option<u32> {
    let periods = tenure_months.ceil();
    if periods.is_finite() && periods >= 1.0 && periods <= MAX_TENURE_MONTHS as f64 {
        Some(periods as u32)
    } else {
        None
    }
}

fn require_positive(field: &'static str, value: f64) -> Result<f64, Unresolvable> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Unresolvable::NonPositive { field, value })
    }
}

fn require_tenure(tenure_months: f64) -> Result<f64, Unresolvable> {
    let n = require_positive("tenure", tenure_months)?;
    if n > MAX_TENURE_MONTHS as f64 {
        return Err(Unresolvable::OutOfRange { field: "tenure", value: n });
    }
    Ok(n)
}

fn require_rate(annual_rate_percent: f64) -> Result<f64, Unresolvable> {
    if annual_rate_percent.is_finite() && annual_rate_percent >= 0.0 {
        Ok(monthly_rate(annual_rate_percent))
    } else {
        Err(Unresolvable::NonPositive { field: "annual rate", value: annual_rate_percent })
    }
}

/// A derived quantity must come out finite and positive
fn derived(field: &'static str, value: f64) -> Result<f64, Unresolvable> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Unresolvable::OutOfRange { field, value })
    }
}

/// `1 - (1 + r)^-n`, evaluated without cancellation for tiny rates
fn discount_fraction(r: f64, n: f64) -> f64 {
    -(-n * r.ln_1p()).exp_m1()
}

/// Level monthly installment that repays `principal` over `tenure_months`
pub fn compute_installment(
    principal: f64,
    annual_rate_percent: f64,
    tenure_months: f64,
) -> Result<f64, Unresolvable> {
    let principal = require_positive("principal", principal)?;
    let n = require_tenure(tenure_months)?;
    let r = require_rate(annual_rate_percent)?;

    if r == 0.0 {
        return derived("installment", principal / n);
    }

    derived("installment", principal * r / discount_fraction(r, n))
}

/// Loan amount that a given installment repays over `tenure_months`
pub fn compute_principal(
    installment: f64,
    annual_rate_percent: f64,
    tenure_months: f64,
) -> Result<f64, Unresolvable> {
    let installment = require_positive("installment", installment)?;
    let n = require_tenure(tenure_months)?;
    let r = require_rate(annual_rate_percent)?;

    if r == 0.0 {
        return derived("principal", installment * n);
    }

    derived("principal", installment * discount_fraction(r, n) / r)
}

/// Number of months (fractional) needed to repay `principal` at `installment` per month.
///
/// Fails with [`Unresolvable::NeverAmortizes`] when the installment does not
/// exceed the first month's interest. Use [`ceil_periods`] before treating the
/// result as a period count.
pub fn compute_tenure(
    principal: f64,
    annual_rate_percent: f64,
    installment: f64,
) -> Result<f64, Unresolvable> {
    let principal = require_positive("principal", principal)?;
    let installment = require_positive("installment", installment)?;
    let r = require_rate(annual_rate_percent)?;

    let monthly_interest = principal * r;
    if monthly_interest >= installment {
        warn!(
            "Installment {:.2} cannot cover monthly interest {:.2}",
            installment, monthly_interest
        );
        return Err(Unresolvable::NeverAmortizes { monthly_interest, installment });
    }

    if r == 0.0 {
        return derived("tenure", principal / installment);
    }

    // ln(I / (I - P*r)) / ln(1 + r)
    derived("tenure", -(-monthly_interest / installment).ln_1p() / r.ln_1p())
}

/// Month-by-month repayment schedule.
///
/// Runs for at most `ceil(tenure_months)` periods and stops as soon as the
/// balance reaches zero. Invalid inputs, including tenures beyond
/// [`MAX_TENURE_MONTHS`], yield an empty schedule.
pub fn generate_schedule(
    principal: f64,
    annual_rate_percent: f64,
    tenure_months: f64,
    installment: f64,
    start: YearMonth,
) -> Schedule {
    let mut schedule = Schedule::new();

    let valid = principal.is_finite()
        && principal > 0.0
        && annual_rate_percent.is_finite()
        && annual_rate_percent >= 0.0
        && installment.is_finite()
        && installment > 0.0;
    let periods = match ceil_periods(tenure_months) {
        Some(periods) if valid => periods,
        _ => {
            debug!(
                "Skipping schedule: principal={} rate={} tenure={} installment={}",
                principal, annual_rate_percent, tenure_months, installment
            );
            return schedule;
        }
    };

    let mut state = BalanceState::new(principal, monthly_rate(annual_rate_percent), installment, start);

    for month in 1..=periods {
        if state.is_paid_off() {
            break;
        }
        schedule.add_entry(state.advance_month(month == periods));
    }

    if state.balance > 0.0 {
        warn!(
            "Schedule ended after {} periods with {:.2} still outstanding",
            periods, state.balance
        );
    }
    debug!("Generated {} of {} scheduled periods", schedule.len(), periods);

    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn jan_2015() -> YearMonth {
        YearMonth::new(2015, 1).unwrap()
    }

    #[test]
    fn test_reference_loan_installment() {
        let emi = compute_installment(2_500_000.0, 9.55, 120.0).unwrap();
        assert_abs_diff_eq!(emi, 32_417.87, epsilon = 0.01);
    }

    #[test]
    fn test_reference_loan_schedule() {
        let emi = compute_installment(2_500_000.0, 9.55, 120.0).unwrap();
        let schedule = generate_schedule(2_500_000.0, 9.55, 120.0, emi, jan_2015());

        assert_eq!(schedule.len(), 120);

        let first = schedule.first().unwrap();
        assert_abs_diff_eq!(first.interest, 19_895.83, epsilon = 0.01);
        assert_eq!(first.period.to_string(), "2015-01");

        let last = schedule.last().unwrap();
        assert_eq!(last.month, 120);
        assert_eq!(last.remaining_balance, 0.0);
        assert_eq!(last.period.to_string(), "2024-12");

        assert_abs_diff_eq!(schedule.total_principal(), 2_500_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rounded_installment_still_retires_loan() {
        let emi = (compute_installment(2_500_000.0, 9.55, 120.0).unwrap() * 100.0).round() / 100.0;
        let schedule = generate_schedule(2_500_000.0, 9.55, 120.0, emi, jan_2015());

        assert_eq!(schedule.len(), 120);
        assert_eq!(schedule.last().unwrap().remaining_balance, 0.0);
        assert_abs_diff_eq!(schedule.total_principal(), 2_500_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let emi = compute_installment(12_000.0, 0.0, 12.0).unwrap();
        assert_eq!(emi, 12_000.0 / 12.0);

        assert_eq!(compute_principal(1_000.0, 0.0, 12.0).unwrap(), 12_000.0);
        assert_eq!(compute_tenure(12_000.0, 0.0, 1_000.0).unwrap(), 12.0);

        let schedule = generate_schedule(12_000.0, 0.0, 12.0, emi, jan_2015());
        assert_eq!(schedule.len(), 12);
        assert!(schedule.iter().all(|e| e.interest == 0.0));
        assert_eq!(schedule.last().unwrap().remaining_balance, 0.0);
    }

    #[test]
    fn test_principal_round_trip() {
        let cases = [
            (100_000.0, 12.0, 24.0),
            (2_500_000.0, 9.55, 120.0),
            (5_000.0, 0.5, 6.0),
            (750_000.0, 7.25, 360.0),
        ];

        for (principal, rate, tenure) in cases {
            let emi = compute_installment(principal, rate, tenure).unwrap();
            let recovered = compute_principal(emi, rate, tenure).unwrap();
            assert_relative_eq!(recovered, principal, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_tenure_round_trip() {
        let emi = compute_installment(100_000.0, 12.0, 24.0).unwrap();
        let tenure = compute_tenure(100_000.0, 12.0, emi).unwrap();
        assert_abs_diff_eq!(tenure, 24.0, epsilon = 1e-6);
    }

    #[test]
    fn test_tenure_never_amortizes() {
        let err = compute_tenure(100_000.0, 24.0, 100.0).unwrap_err();
        assert!(matches!(err, Unresolvable::NeverAmortizes { .. }));
        assert!(!err.sentinel().is_finite());

        // Exactly interest-only also never amortizes
        let interest_only = 100_000.0 * monthly_rate(24.0);
        assert!(compute_tenure(100_000.0, 24.0, interest_only).is_err());
    }

    #[test]
    fn test_derived_tenure_schedule() {
        let tenure = compute_tenure(2_500_000.0, 9.55, 40_000.0).unwrap();
        assert_abs_diff_eq!(tenure, 86.7878, epsilon = 1e-3);

        let periods = ceil_periods(tenure).unwrap();
        assert_eq!(periods, 87);

        let schedule = generate_schedule(2_500_000.0, 9.55, periods as f64, 40_000.0, jan_2015());
        assert_eq!(schedule.len(), 87);

        let last = schedule.last().unwrap();
        assert_eq!(last.remaining_balance, 0.0);
        assert!(last.payment < 40_000.0);
        assert_abs_diff_eq!(last.payment, last.principal + last.interest, epsilon = 1e-9);
        assert_abs_diff_eq!(schedule.total_principal(), 2_500_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_non_positive_inputs() {
        assert_eq!(compute_installment(0.0, 9.0, 12.0).unwrap_err().sentinel(), 0.0);
        assert!(compute_installment(1000.0, 9.0, 0.0).is_err());
        assert!(compute_installment(1000.0, -1.0, 12.0).is_err());
        assert!(compute_installment(f64::NAN, 9.0, 12.0).is_err());
        assert!(compute_principal(-5.0, 9.0, 12.0).is_err());
        assert!(compute_tenure(1000.0, 9.0, 0.0).is_err());
    }

    #[test]
    fn test_invalid_schedule_inputs_are_empty() {
        assert!(generate_schedule(0.0, 9.55, 120.0, 1000.0, jan_2015()).is_empty());
        assert!(generate_schedule(1000.0, 9.55, 0.0, 1000.0, jan_2015()).is_empty());
        assert!(generate_schedule(1000.0, -1.0, 12.0, 100.0, jan_2015()).is_empty());
        assert!(generate_schedule(1000.0, 9.55, 12.0, 0.0, jan_2015()).is_empty());
        assert!(generate_schedule(1000.0, 9.55, f64::INFINITY, 100.0, jan_2015()).is_empty());
    }

    #[test]
    fn test_schedule_invariants() {
        let cases = [
            (100_000.0, 12.0, 24.0),
            (1_234.56, 18.0, 7.0),
            (2_500_000.0, 9.55, 120.0),
            (300_000.0, 6.5, 360.0),
            (10_000.0, 0.0, 36.0),
        ];

        for (principal, rate, tenure) in cases {
            let emi = compute_installment(principal, rate, tenure).unwrap();
            let schedule = generate_schedule(principal, rate, tenure, emi, jan_2015());

            assert!(schedule.len() as f64 <= tenure.ceil());
            assert!(schedule.iter().all(|e| e.remaining_balance >= 0.0));
            assert_eq!(schedule.last().unwrap().remaining_balance, 0.0);
            assert_abs_diff_eq!(schedule.total_principal(), principal, epsilon = 1e-6);

            for (i, entry) in schedule.iter().enumerate() {
                assert_eq!(entry.month as usize, i + 1);
            }
        }
    }

    #[test]
    fn test_fractional_tenure_uses_ceiling() {
        let emi = compute_installment(10_000.0, 10.0, 10.5).unwrap();
        let schedule = generate_schedule(10_000.0, 10.0, 10.5, emi, jan_2015());
        assert_eq!(schedule.len(), 11);
        assert_eq!(schedule.last().unwrap().remaining_balance, 0.0);
    }

    #[test]
    fn test_oversized_installment_ends_early() {
        let schedule = generate_schedule(1_000.0, 12.0, 24.0, 600.0, jan_2015());
        assert_eq!(schedule.len(), 2);

        let last = schedule.last().unwrap();
        assert_eq!(last.remaining_balance, 0.0);
        assert_abs_diff_eq!(last.principal, 410.0, epsilon = 1e-9);
        assert_abs_diff_eq!(last.payment, 414.1, epsilon = 1e-9);
    }

    #[test]
    fn test_tiny_rate_approaches_straight_line() {
        let emi = compute_installment(100_000.0, 1e-15, 12.0).unwrap();
        assert_relative_eq!(emi, 100_000.0 / 12.0, max_relative = 1e-12);

        let principal = compute_principal(2_500.0, 1e-15, 12.0).unwrap();
        assert_relative_eq!(principal, 30_000.0, max_relative = 1e-12);

        let tenure = compute_tenure(100_000.0, 1e-15, 2_500.0).unwrap();
        assert_relative_eq!(tenure, 40.0, max_relative = 1e-9);
    }

    #[test]
    fn test_long_tenures_are_out_of_range() {
        for result in [
            compute_installment(100_000.0, 24.0, 1e6),
            compute_principal(2_500.0, 24.0, 1e6),
            compute_installment(100_000.0, 24.0, f64::from(MAX_TENURE_MONTHS) + 1.0),
        ] {
            assert!(matches!(result, Err(Unresolvable::OutOfRange { field: "tenure", .. })));
        }

        // The longest supported tenure stays finite even at high rates
        let emi = compute_installment(100_000.0, 60.0, f64::from(MAX_TENURE_MONTHS)).unwrap();
        assert_relative_eq!(emi, 100_000.0 * monthly_rate(60.0), max_relative = 1e-9);
        assert!(compute_principal(5_000.0, 60.0, f64::from(MAX_TENURE_MONTHS)).unwrap().is_finite());
    }

    #[test]
    fn test_ceil_periods_bounds() {
        assert_eq!(ceil_periods(0.2), Some(1));
        assert_eq!(ceil_periods(86.79), Some(87));
        assert_eq!(ceil_periods(f64::from(MAX_TENURE_MONTHS)), Some(MAX_TENURE_MONTHS));
        assert_eq!(ceil_periods(0.0), None);
        assert_eq!(ceil_periods(-3.0), None);
        assert_eq!(ceil_periods(f64::NAN), None);
        assert_eq!(ceil_periods(1e10), None);

        assert!(generate_schedule(1_000.0, 9.55, 1e10, 100.0, jan_2015()).is_empty());
    }
}
