//! Derive the unknown loan field and build the full calculation
//!
//! Exactly one field is derived per pass. Which one is an explicit
//! [`SolveFor`] mode; [`SolveFor::select`] picks it from the field the user
//! edited most recently.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::engine::{ceil_periods, compute_installment, compute_principal, compute_tenure};
use super::period::YearMonth;
use super::schedule::{Schedule, ScheduleSummary};
use crate::error::Unresolvable;
use crate::loan::{LoanField, LoanInputs, LoanTerms};

/// Which loan field is derived from the other three
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveFor {
    Installment,
    Tenure,
    Principal,
}

impl SolveFor {
    /// Directions in priority order
    pub const ALL: [SolveFor; 3] = [SolveFor::Installment, SolveFor::Tenure, SolveFor::Principal];

    /// The field this mode derives
    pub fn derived_field(&self) -> LoanField {
        match self {
            SolveFor::Installment => LoanField::Installment,
            SolveFor::Tenure => LoanField::Tenure,
            SolveFor::Principal => LoanField::Principal,
        }
    }

    /// The three fields this mode needs
    pub fn required_fields(&self) -> [LoanField; 3] {
        match self {
            SolveFor::Installment => [LoanField::Principal, LoanField::AnnualRate, LoanField::Tenure],
            SolveFor::Tenure => [LoanField::Principal, LoanField::AnnualRate, LoanField::Installment],
            SolveFor::Principal => [LoanField::AnnualRate, LoanField::Tenure, LoanField::Installment],
        }
    }

    fn overwrites(&self, edited: LoanField) -> bool {
        let derived = self.derived_field();
        edited == derived || (derived.is_tenure() && edited.is_tenure())
    }

    /// Pick the first direction whose inputs are all valid and that does not
    /// overwrite the field the user just edited.
    pub fn select(inputs: &LoanInputs, last_edited: Option<LoanField>) -> Option<SolveFor> {
        if inputs.valid_count() < 3 {
            return None;
        }

        SolveFor::ALL.into_iter().find(|mode| {
            mode.required_fields().iter().all(|f| inputs.is_valid(*f))
                && !last_edited.is_some_and(|edited| mode.overwrites(edited))
        })
    }
}

impl fmt::Display for SolveFor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SolveFor::Installment => "installment",
            SolveFor::Tenure => "tenure",
            SolveFor::Principal => "principal",
        };
        f.write_str(name)
    }
}

impl FromStr for SolveFor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<LoanField>()? {
            LoanField::Installment => Ok(SolveFor::Installment),
            LoanField::Tenure | LoanField::TenureYears => Ok(SolveFor::Tenure),
            LoanField::Principal => Ok(SolveFor::Principal),
            LoanField::AnnualRate => Err("the interest rate cannot be derived".to_string()),
        }
    }
}

/// Resolve the loan by deriving the field named by `mode`
pub fn solve(inputs: &LoanInputs, mode: SolveFor) -> Result<LoanTerms, Unresolvable> {
    let rate = inputs.annual_rate_percent.ok_or(Unresolvable::InsufficientInputs)?;

    let terms = match mode {
        SolveFor::Installment => {
            let principal = inputs.principal.ok_or(Unresolvable::InsufficientInputs)?;
            let tenure = inputs.tenure_months.ok_or(Unresolvable::InsufficientInputs)?;
            let installment = compute_installment(principal, rate, tenure as f64)?;
            LoanTerms::new(principal, rate, tenure, installment)
        }
        SolveFor::Tenure => {
            let principal = inputs.principal.ok_or(Unresolvable::InsufficientInputs)?;
            let installment = inputs.installment.ok_or(Unresolvable::InsufficientInputs)?;
            let tenure = compute_tenure(principal, rate, installment)?;
            let periods = ceil_periods(tenure).ok_or(Unresolvable::OutOfRange { field: "tenure", value: tenure })?;
            LoanTerms::new(principal, rate, periods, installment)
        }
        SolveFor::Principal => {
            let tenure = inputs.tenure_months.ok_or(Unresolvable::InsufficientInputs)?;
            let installment = inputs.installment.ok_or(Unresolvable::InsufficientInputs)?;
            let principal = compute_principal(installment, rate, tenure as f64)?;
            LoanTerms::new(principal, rate, tenure, installment)
        }
    };

    debug!("Solved for {}: {:?}", mode, terms);
    Ok(terms)
}

/// Result of one full calculation pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calculation {
    pub solved_for: SolveFor,
    pub terms: LoanTerms,
    pub start: YearMonth,
    pub schedule: Schedule,
    pub summary: Option<ScheduleSummary>,
}

impl Calculation {
    /// Build schedule and summary for already-resolved terms
    pub fn from_terms(terms: LoanTerms, solved_for: SolveFor, start: YearMonth) -> Self {
        let schedule = terms.schedule(start);
        let summary = schedule.summary();
        Self {
            solved_for,
            terms,
            start,
            schedule,
            summary,
        }
    }
}

/// Solve with an explicit mode and generate the schedule
pub fn calculate_with(inputs: &LoanInputs, mode: SolveFor, start: YearMonth) -> Result<Calculation, Unresolvable> {
    let terms = solve(inputs, mode)?;
    Ok(Calculation::from_terms(terms, mode, start))
}

/// Full pass: pick the derived field from the last edit, solve, and generate the schedule
pub fn calculate(
    inputs: &LoanInputs,
    last_edited: Option<LoanField>,
    start: YearMonth,
) -> Result<Calculation, Unresolvable> {
    let mode = SolveFor::select(inputs, last_edited).ok_or(Unresolvable::InsufficientInputs)?;
    calculate_with(inputs, mode, start)
}
