//! Runtime configuration for the calculator front ends

use std::env;
use std::path::PathBuf;

use crate::amortization::YearMonth;

/// Default CSV export location
pub const DEFAULT_OUTPUT_PATH: &str = "amortization_schedule.csv";

/// Configuration shared by the CLI, batch runner and Lambda handler
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorConfig {
    /// Month of the first repayment when the caller does not give one
    pub start_period: YearMonth,

    /// Decimal places for currency amounts in exported files
    pub currency_decimals: u32,

    /// Where the CSV export is written
    pub output_path: PathBuf,

    /// Schedule rows printed to the console
    pub preview_rows: usize,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            start_period: YearMonth::current(),
            currency_decimals: 2,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            preview_rows: 12,
        }
    }
}

impl CalculatorConfig {
    /// Defaults overridden by `LOAN_START_PERIOD`, `LOAN_CURRENCY_DECIMALS`,
    /// `LOAN_OUTPUT_PATH` and `LOAN_PREVIEW_ROWS`. Unparsable values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let defaults = Self::default();

        let start_period = lookup("LOAN_START_PERIOD")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.start_period);

        let currency_decimals = lookup("LOAN_CURRENCY_DECIMALS")
            .and_then(|s| s.parse().ok())
            .filter(|d: &u32| *d <= 10)
            .unwrap_or(defaults.currency_decimals);

        let output_path = lookup("LOAN_OUTPUT_PATH")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.output_path);

        let preview_rows = lookup("LOAN_PREVIEW_ROWS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.preview_rows);

        Self {
            start_period,
            currency_decimals,
            output_path,
            preview_rows,
        }
    }
}
