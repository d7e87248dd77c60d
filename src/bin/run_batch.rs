//! Solve every loan in a CSV file
//!
//! Usage: run_batch <loans.csv> [output.csv]
//!
//! Writes one summary row per loan. Loans that cannot be resolved are kept in
//! the output with the reason in the Error column.

use anyhow::{Context, Result};
use loan_amortization::export::write_batch_summary;
use loan_amortization::loan::load_loans;
use loan_amortization::ScenarioRunner;
use std::env;
use std::fs::File;
use std::time::Instant;

const DEFAULT_SUMMARY_PATH: &str = "loan_batch_summary.csv";

fn main() -> Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let input = args.next().context("usage: run_batch <loans.csv> [output.csv]")?;
    let output = args.next().unwrap_or_else(|| DEFAULT_SUMMARY_PATH.to_string());

    let start = Instant::now();
    println!("Loading loans from {}...", input);

    let loans = load_loans(&input).with_context(|| format!("failed to load {}", input))?;
    println!("Loaded {} loans in {:?}", loans.len(), start.elapsed());

    let runner = ScenarioRunner::from_env();

    println!("Solving loans...");
    let run_start = Instant::now();
    let results = runner.run_batch(&loans);
    println!("Solved in {:?}", run_start.elapsed());

    let failed = results.iter().filter(|r| r.outcome.is_err()).count();
    let total_interest: f64 = results
        .iter()
        .filter_map(|r| r.outcome.as_ref().ok())
        .filter_map(|calc| calc.summary.as_ref())
        .map(|s| s.total_interest)
        .sum();

    let file = File::create(&output).with_context(|| format!("failed to create {}", output))?;
    write_batch_summary(file, &results, runner.config().currency_decimals)?;

    println!("\nSummary:");
    println!("  Loans:          {}", results.len());
    println!("  Unresolvable:   {}", failed);
    println!("  Total Interest: {:.2}", total_interest);
    println!("\nResults written to: {}", output);
    println!("Total time: {:?}", start.elapsed());

    Ok(())
}
