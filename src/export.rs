//! CSV export of a calculation: loan summary block followed by the schedule table

use csv::{Writer, WriterBuilder};
use std::io::Write;
use std::path::Path;

use crate::amortization::Calculation;
use crate::error::Result;
use crate::scenario::ScenarioResult;

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

fn money(value: f64, decimals: u32) -> String {
    format!("{:.*}", decimals as usize, round_to(value, decimals))
}

/// Write the summary block, a blank line, then the schedule table
pub fn write_calculation<W: Write>(mut writer: W, calc: &Calculation, decimals: u32) -> Result<()> {
    write_summary_block(&mut writer, calc, decimals)?;
    // csv quotes an empty record, so the separator goes straight to the writer
    writer.write_all(b"\n")?;
    write_schedule_table(&mut writer, calc, decimals)
}

fn write_summary_block<W: Write>(writer: W, calc: &Calculation, decimals: u32) -> Result<()> {
    let mut out = WriterBuilder::new().flexible(true).from_writer(writer);
    let terms = &calc.terms;

    let (end_period, total_interest, total_payment) = match &calc.summary {
        Some(s) => (s.end_period.to_string(), s.total_interest, s.total_payment),
        None => (String::new(), 0.0, 0.0),
    };

    out.write_record(["Loan Summary"])?;
    out.write_record(["Loan Amount", money(terms.principal, decimals).as_str()])?;
    // Rate as a fraction so spreadsheet percentage formatting applies directly
    out.write_record(["Annual Interest Rate", format!("{:.6}", terms.annual_rate_percent / 100.0).as_str()])?;
    out.write_record(["Tenure (Months)", terms.tenure_months.to_string().as_str()])?;
    out.write_record(["Monthly EMI", money(terms.installment, decimals).as_str()])?;
    out.write_record(["Loan Start Date", calc.start.to_string().as_str()])?;
    out.write_record(["Loan End Date", end_period.as_str()])?;
    out.write_record(["Total Interest", money(total_interest, decimals).as_str()])?;
    out.write_record(["Total Payment", money(total_payment, decimals).as_str()])?;
    out.flush()?;
    Ok(())
}

fn write_schedule_table<W: Write>(writer: W, calc: &Calculation, decimals: u32) -> Result<()> {
    let mut out = Writer::from_writer(writer);
    out.write_record(["#", "Date", "Principal", "Interest", "EMI", "Balance"])?;
    for entry in &calc.schedule {
        out.write_record([
            entry.month.to_string(),
            entry.period.to_string(),
            money(entry.principal, decimals),
            money(entry.interest, decimals),
            money(entry.payment, decimals),
            money(entry.remaining_balance, decimals),
        ])?;
    }

    out.flush()?;
    Ok(())
}

/// Write a calculation to a CSV file
pub fn export_calculation<P: AsRef<Path>>(path: P, calc: &Calculation, decimals: u32) -> Result<()> {
    let file = std::fs::File::create(path.as_ref())?;
    write_calculation(file, calc, decimals)?;
    log::info!("Schedule written to {}", path.as_ref().display());
    Ok(())
}

/// One row per loan: solved terms and totals, or the reason it could not be solved
pub fn write_batch_summary<W: Write>(writer: W, results: &[ScenarioResult], decimals: u32) -> Result<()> {
    let mut out: Writer<W> = Writer::from_writer(writer);

    out.write_record([
        "LoanId",
        "SolvedFor",
        "Principal",
        "AnnualRatePercent",
        "TenureMonths",
        "Installment",
        "StartPeriod",
        "EndPeriod",
        "TotalInterest",
        "TotalPayment",
        "Error",
    ])?;

    for result in results {
        match &result.outcome {
            Ok(calc) => {
                let (end, interest, payment) = match &calc.summary {
                    Some(s) => (s.end_period.to_string(), s.total_interest, s.total_payment),
                    None => (String::new(), 0.0, 0.0),
                };
                out.write_record([
                    result.loan_id.clone(),
                    calc.solved_for.to_string(),
                    money(calc.terms.principal, decimals),
                    calc.terms.annual_rate_percent.to_string(),
                    calc.terms.tenure_months.to_string(),
                    money(calc.terms.installment, decimals),
                    calc.start.to_string(),
                    end,
                    money(interest, decimals),
                    money(payment, decimals),
                    String::new(),
                ])?;
            }
            Err(err) => {
                let mut row = vec![result.loan_id.clone()];
                row.extend(std::iter::repeat(String::new()).take(9));
                row.push(err.to_string());
                out.write_record(&row)?;
            }
        }
    }

    out.flush()?;
    Ok(())
}
