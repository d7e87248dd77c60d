//! Loan Amortization CLI
//!
//! Solves for the missing loan field, prints the schedule and writes it to CSV

use anyhow::{bail, Context, Result};
use clap::Parser;
use loan_amortization::amortization::{calculate, calculate_with};
use loan_amortization::export::export_calculation;
use loan_amortization::{CalculatorConfig, LoanField, LoanInputs, ScenarioRunner, SolveFor, YearMonth};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Loan amount (commas allowed, e.g. 25,00,000)
    #[arg(long)]
    principal: Option<String>,

    /// Annual interest rate in percent
    #[arg(long)]
    rate: Option<String>,

    /// Tenure in months
    #[arg(long, conflicts_with = "tenure_years")]
    tenure_months: Option<String>,

    /// Tenure in years
    #[arg(long)]
    tenure_years: Option<String>,

    /// Monthly installment (EMI)
    #[arg(long)]
    installment: Option<String>,

    /// Month of the first repayment, YYYY-MM
    #[arg(long)]
    start: Option<YearMonth>,

    /// Field to derive: installment, tenure or principal
    #[arg(long)]
    solve_for: Option<SolveFor>,

    /// Field edited last; the derived field never overwrites it
    #[arg(long, conflicts_with = "solve_for")]
    last_edited: Option<LoanField>,

    /// CSV output path
    #[arg(long)]
    output: Option<PathBuf>,

    /// Schedule rows to print
    #[arg(long)]
    rows: Option<usize>,

    /// Compare the EMI at other annual rates, e.g. --rates 8,9.5,11
    #[arg(long, value_delimiter = ',')]
    rates: Vec<f64>,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = CalculatorConfig::from_env();

    let field = |value: &Option<String>| value.clone().unwrap_or_default();
    let mut inputs = LoanInputs::parse(
        &field(&cli.principal),
        &field(&cli.rate),
        &field(&cli.tenure_months),
        &field(&cli.installment),
    );
    if let Some(years) = &cli.tenure_years {
        inputs = inputs.with_tenure_years(years);
    }

    if inputs.valid_count() < 3 {
        bail!("at least three of --principal, --rate, --tenure-months/--tenure-years, --installment are required");
    }

    let start = cli.start.unwrap_or(config.start_period);
    let calc = match cli.solve_for {
        Some(mode) => calculate_with(&inputs, mode, start),
        None => calculate(&inputs, cli.last_edited, start),
    }
    .context("loan cannot be resolved from the given values")?;

    println!("Loan Amortization v{}", env!("CARGO_PKG_VERSION"));
    println!("========================\n");

    let terms = &calc.terms;
    println!("Solved for: {}", calc.solved_for);
    println!("  Principal:   {:.2}", terms.principal);
    println!("  Annual Rate: {:.2}%", terms.annual_rate_percent);
    println!("  Tenure:      {} months ({} years)", terms.tenure_months, terms.tenure_years());
    println!("  EMI:         {:.2}", terms.installment);
    println!();

    let rows = cli.rows.unwrap_or(config.preview_rows);
    println!("Schedule ({} months from {}):", calc.schedule.len(), calc.start.long_name());
    println!("{:>5} {:>9} {:>14} {:>14} {:>14} {:>16}",
        "#", "Date", "Principal", "Interest", "EMI", "Balance");
    println!("{}", "-".repeat(77));

    for entry in calc.schedule.iter().take(rows) {
        println!("{:>5} {:>9} {:>14.2} {:>14.2} {:>14.2} {:>16.2}",
            entry.month,
            entry.period.short_name(),
            entry.principal,
            entry.interest,
            entry.payment,
            entry.remaining_balance,
        );
    }

    if calc.schedule.len() > rows {
        println!("... ({} more months)", calc.schedule.len() - rows);
    }

    if let Some(summary) = &calc.summary {
        println!("\nSummary:");
        println!("  Payments:       {}", summary.total_months);
        println!("  Loan End:       {}", summary.end_period.long_name());
        println!("  Total Interest: {:.2}", summary.total_interest);
        println!("  Total Payment:  {:.2}", summary.total_payment);
        println!("  Final Payment:  {:.2}", summary.final_payment);
    }

    if !cli.rates.is_empty() {
        let runner = ScenarioRunner::with_config(config.clone());
        let points = runner.rate_sensitivity(terms.principal, terms.tenure_months, &cli.rates);

        println!("\nRate Sensitivity ({} months):", terms.tenure_months);
        println!("{:>8} {:>14} {:>16} {:>16}", "Rate", "EMI", "Total Interest", "Total Payment");
        for point in &points {
            println!("{:>7.2}% {:>14.2} {:>16.2} {:>16.2}",
                point.annual_rate_percent,
                point.installment,
                point.total_interest,
                point.total_payment,
            );
        }
    }

    let output = cli.output.unwrap_or(config.output_path);
    export_calculation(&output, &calc, config.currency_decimals)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("\nFull schedule written to: {}", output.display());

    Ok(())
}
