//! Scenario runner for batch loan calculations
//!
//! Every calculation is independent and pure, so batches are spread across
//! threads with rayon.

use rayon::prelude::*;
use serde::Serialize;

use crate::amortization::{calculate_with, compute_installment, generate_schedule, Calculation};
use crate::config::CalculatorConfig;
use crate::error::Unresolvable;
use crate::loan::LoanScenario;

/// Outcome for one loan in a batch
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioResult {
    pub loan_id: String,
    pub outcome: Result<Calculation, Unresolvable>,
}

/// Installment and cost of a loan at one interest rate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatePoint {
    pub annual_rate_percent: f64,
    pub installment: f64,
    pub total_interest: f64,
    pub total_payment: f64,
}

/// Runs loan calculations against a shared configuration
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::from_env();
/// let loans = load_loans("loans.csv")?;
/// for result in runner.run_batch(&loans) {
///     println!("{}: {:?}", result.loan_id, result.outcome.map(|c| c.terms.installment));
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    config: CalculatorConfig,
}

impl ScenarioRunner {
    /// Create runner with default configuration
    pub fn new() -> Self {
        Self {
            config: CalculatorConfig::default(),
        }
    }

    /// Create runner configured from environment variables
    pub fn from_env() -> Self {
        Self {
            config: CalculatorConfig::from_env(),
        }
    }

    pub fn with_config(config: CalculatorConfig) -> Self {
        Self { config }
    }

    /// Solve one loan and build its schedule
    pub fn run(&self, scenario: &LoanScenario) -> ScenarioResult {
        let start = scenario.start.unwrap_or(self.config.start_period);
        let outcome = calculate_with(&scenario.inputs, scenario.solve_for, start);

        if let Err(err) = &outcome {
            log::warn!("Loan {} unresolvable: {}", scenario.loan_id, err);
        }

        ScenarioResult {
            loan_id: scenario.loan_id.clone(),
            outcome,
        }
    }

    /// Solve many loans in parallel, preserving input order
    pub fn run_batch(&self, scenarios: &[LoanScenario]) -> Vec<ScenarioResult> {
        scenarios.par_iter().map(|s| self.run(s)).collect()
    }

    /// Installment and total cost across a set of rates, holding principal and tenure fixed.
    /// Rates at which the loan cannot be computed are skipped.
    pub fn rate_sensitivity(&self, principal: f64, tenure_months: u32, rates: &[f64]) -> Vec<RatePoint> {
        rates
            .par_iter()
            .filter_map(|&rate| {
                let installment = compute_installment(principal, rate, tenure_months as f64).ok()?;
                let schedule = generate_schedule(
                    principal,
                    rate,
                    tenure_months as f64,
                    installment,
                    self.config.start_period,
                );
                Some(RatePoint {
                    annual_rate_percent: rate,
                    installment,
                    total_interest: schedule.total_interest(),
                    total_payment: schedule.total_payment(),
                })
            })
            .collect()
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}
