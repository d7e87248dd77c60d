//! Loan terms and raw calculator inputs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::amortization::engine::{generate_schedule, MAX_TENURE_MONTHS};
use crate::amortization::{Schedule, YearMonth};

/// A fully resolved loan: all four quantities known
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Amount borrowed
    pub principal: f64,

    /// Nominal annual interest rate in percent (9.55 = 9.55%)
    pub annual_rate_percent: f64,

    /// Number of monthly repayments
    pub tenure_months: u32,

    /// Nominal monthly installment (EMI)
    pub installment: f64,
}

impl LoanTerms {
    pub fn new(principal: f64, annual_rate_percent: f64, tenure_months: u32, installment: f64) -> Self {
        Self {
            principal,
            annual_rate_percent,
            tenure_months,
            installment,
        }
    }

    /// Tenure expressed in years, rounded to two decimals
    pub fn tenure_years(&self) -> f64 {
        months_to_years(self.tenure_months)
    }

    /// Repayment schedule starting in `start`
    pub fn schedule(&self, start: YearMonth) -> Schedule {
        generate_schedule(
            self.principal,
            self.annual_rate_percent,
            self.tenure_months as f64,
            self.installment,
            start,
        )
    }
}

/// The editable loan fields, used to record which one the user touched last
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanField {
    Principal,
    AnnualRate,
    Tenure,
    TenureYears,
    Installment,
}

impl LoanField {
    /// Tenure edited in years or in months is the same field for solving
    pub fn is_tenure(&self) -> bool {
        matches!(self, LoanField::Tenure | LoanField::TenureYears)
    }
}

impl fmt::Display for LoanField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoanField::Principal => "principal",
            LoanField::AnnualRate => "annual_rate",
            LoanField::Tenure => "tenure",
            LoanField::TenureYears => "tenure_years",
            LoanField::Installment => "installment",
        };
        f.write_str(name)
    }
}

impl FromStr for LoanField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "principal" | "loan_amount" | "amount" => Ok(LoanField::Principal),
            "annual_rate" | "rate" | "interest_rate" => Ok(LoanField::AnnualRate),
            "tenure" | "tenure_months" | "months" => Ok(LoanField::Tenure),
            "tenure_years" | "years" => Ok(LoanField::TenureYears),
            "installment" | "emi" => Ok(LoanField::Installment),
            other => Err(format!("unknown loan field: {}", other)),
        }
    }
}

/// Parse a user-entered amount. Blank, non-numeric and non-finite text yields `None`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',' && *c != '_').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Whole months for a tenure given in years; `None` outside `1..=MAX_TENURE_MONTHS`
pub fn years_to_months(years: f64) -> Option<u32> {
    whole_months((years * 12.0).round())
}

fn whole_months(months: f64) -> Option<u32> {
    if months.is_finite() && months >= 1.0 && months <= MAX_TENURE_MONTHS as f64 {
        Some(months as u32)
    } else {
        None
    }
}

/// Years for a tenure given in months, rounded to two decimals
pub fn months_to_years(months: u32) -> f64 {
    (months as f64 / 12.0 * 100.0).round() / 100.0
}

/// Calculator inputs after parsing; a `None` field is unknown
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanInputs {
    pub principal: Option<f64>,
    pub annual_rate_percent: Option<f64>,
    pub tenure_months: Option<u32>,
    pub installment: Option<f64>,
}

impl LoanInputs {
    /// Parse the four raw text fields
    pub fn parse(principal: &str, annual_rate_percent: &str, tenure_months: &str, installment: &str) -> Self {
        Self {
            principal: parse_amount(principal),
            annual_rate_percent: parse_amount(annual_rate_percent),
            // Partial months are dropped, matching integer entry in the form
            tenure_months: parse_amount(tenure_months).and_then(|m| whole_months(m.trunc())),
            installment: parse_amount(installment),
        }
    }

    /// Replace the tenure with one entered in years
    pub fn with_tenure_years(mut self, years: &str) -> Self {
        self.tenure_months = parse_amount(years).and_then(years_to_months);
        self
    }

    /// Whether a field holds a usable value (rate may be zero, the rest must be positive)
    pub fn is_valid(&self, field: LoanField) -> bool {
        match field {
            LoanField::Principal => self.principal.is_some_and(|v| v > 0.0),
            LoanField::AnnualRate => self.annual_rate_percent.is_some_and(|v| v >= 0.0),
            LoanField::Tenure | LoanField::TenureYears => self.tenure_months.is_some_and(|v| v > 0),
            LoanField::Installment => self.installment.is_some_and(|v| v > 0.0),
        }
    }

    /// Number of usable fields out of the four
    pub fn valid_count(&self) -> usize {
        [
            LoanField::Principal,
            LoanField::AnnualRate,
            LoanField::Tenure,
            LoanField::Installment,
        ]
        .iter()
        .filter(|f| self.is_valid(**f))
        .count()
    }
}
