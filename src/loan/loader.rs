//! Load loan scenarios from CSV
//!
//! Expected header:
//! `LoanId,Principal,AnnualRatePercent,TenureMonths,Installment,StartPeriod`.
//! One of Principal, TenureMonths or Installment may be left blank; that field
//! is derived.

use csv::Reader;
use std::path::Path;

use super::LoanInputs;
use crate::amortization::engine::MAX_TENURE_MONTHS;
use crate::amortization::{SolveFor, YearMonth};
use crate::error::{AmortizationError, Result};

/// Raw CSV row
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "LoanId")]
    loan_id: String,
    #[serde(rename = "Principal")]
    principal: Option<f64>,
    #[serde(rename = "AnnualRatePercent")]
    annual_rate_percent: Option<f64>,
    #[serde(rename = "TenureMonths")]
    tenure_months: Option<u32>,
    #[serde(rename = "Installment")]
    installment: Option<f64>,
    #[serde(rename = "StartPeriod", default)]
    start_period: Option<String>,
}

/// One loan to evaluate
#[derive(Debug, Clone, PartialEq)]
pub struct LoanScenario {
    pub loan_id: String,
    pub inputs: LoanInputs,
    pub solve_for: SolveFor,
    /// Overrides the configured start period when present
    pub start: Option<YearMonth>,
}

impl CsvRow {
    fn into_scenario(self) -> Result<LoanScenario> {
        let invalid = |reason: &str| AmortizationError::InvalidLoan {
            loan_id: self.loan_id.clone(),
            reason: reason.to_string(),
        };

        if self.annual_rate_percent.is_none() {
            return Err(invalid("AnnualRatePercent is required"));
        }

        if self.tenure_months.is_some_and(|m| m > MAX_TENURE_MONTHS) {
            return Err(invalid(&format!("TenureMonths exceeds {} months", MAX_TENURE_MONTHS)));
        }

        let solve_for = match (self.principal, self.tenure_months, self.installment) {
            (None, Some(_), Some(_)) => SolveFor::Principal,
            (Some(_), None, Some(_)) => SolveFor::Tenure,
            (Some(_), Some(_), _) => SolveFor::Installment,
            _ => return Err(invalid("at most one of Principal, TenureMonths, Installment may be blank")),
        };

        let start = match self.start_period.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<YearMonth>()?),
        };

        Ok(LoanScenario {
            inputs: LoanInputs {
                principal: self.principal,
                annual_rate_percent: self.annual_rate_percent,
                tenure_months: self.tenure_months,
                installment: self.installment,
            },
            loan_id: self.loan_id,
            solve_for,
            start,
        })
    }
}

/// Load all loan scenarios from a CSV file
pub fn load_loans<P: AsRef<Path>>(path: P) -> Result<Vec<LoanScenario>> {
    let reader = Reader::from_path(path)?;
    read_scenarios(reader)
}

/// Load loan scenarios from any reader (e.g., string buffer, request body)
pub fn load_loans_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<LoanScenario>> {
    read_scenarios(Reader::from_reader(reader))
}

fn read_scenarios<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<LoanScenario>> {
    let mut scenarios = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        scenarios.push(row.into_scenario()?);
    }

    log::debug!("Loaded {} loan scenarios", scenarios.len());
    Ok(scenarios)
}
