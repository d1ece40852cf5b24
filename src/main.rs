//! Loan Strategies CLI
//!
//! Compare payoff strategies for a loan sheet under a monthly budget

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;

use loan_strategies::compare::{resolve_strategies, StrategyRunner};
use loan_strategies::loan::load_loans;
use loan_strategies::{
    Comparison, ComparisonSummary, LogObserver, PaymentMode, SimulationConfig, StrategyKind,
    StrategyResult,
};

#[derive(Parser)]
#[command(
    name = "loan-strategies",
    version,
    about = "Compare multi-loan payoff strategies under a fixed monthly budget"
)]
struct Cli {
    /// Loan sheet CSV (Loan Number, Lender/Description, ..., Annual Interest Rate (%))
    loans: PathBuf,

    /// Monthly budget
    #[arg(short, long)]
    budget: f64,

    /// 0 = budget covers interest and principal, 1 = budget is principal only
    #[arg(short, long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=1))]
    mode: u8,

    /// Comma-separated strategy keys (default: all)
    #[arg(short, long, value_delimiter = ',')]
    strategies: Option<Vec<String>>,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run strategies in parallel
    #[arg(long)]
    parallel: bool,

    /// First repayment month (YYYY-MM-DD), adds payoff dates
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Write the per-loan schedule of this strategy to schedule_<key>.csv
    #[arg(long)]
    schedule: Option<String>,
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Serialize)]
struct Report<'a> {
    summary: ComparisonSummary,
    results: Vec<&'a StrategyResult>,
    failures: Vec<FailureRow>,
}

#[derive(Serialize)]
struct FailureRow {
    strategy: String,
    error: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SimulationConfig::from_json_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if cli.parallel {
        config.parallel = true;
    }

    let validated = load_loans(&cli.loans)
        .with_context(|| format!("loading loans from {}", cli.loans.display()))?;
    for warning in &validated.warnings {
        eprintln!("warning: {}", warning);
    }

    let mode = PaymentMode::try_from(cli.mode)?;
    let keys: Option<Vec<&str>> = cli
        .strategies
        .as_ref()
        .map(|v| v.iter().map(String::as_str).collect());
    let kinds = resolve_strategies(keys.as_deref())?;

    let runner = StrategyRunner::new(config);
    let mut comparison = runner.compare(
        &kinds,
        cli.budget,
        mode,
        &validated.loans,
        &LogObserver::default(),
    );
    if let Some(start) = cli.start {
        comparison = comparison.with_start_date(start);
    }

    match cli.output {
        OutputFormat::Table => print_table(&comparison, validated.rate_format.as_str()),
        OutputFormat::Json => print_json(&comparison)?,
        OutputFormat::Csv => print_csv(&comparison.summary())?,
    }

    if let Some(key) = &cli.schedule {
        let kind: StrategyKind = key.parse()?;
        let result = match comparison.get(kind) {
            Some(Ok(result)) => result,
            Some(Err(e)) => bail!("{} failed: {}", kind.name(), e),
            None => bail!("{} was not part of this comparison", kind.name()),
        };
        let path = format!("schedule_{}.csv", kind.key());
        write_schedule(&path, result).with_context(|| format!("writing {}", path))?;
        eprintln!("Schedule written to: {}", path);
    }

    Ok(())
}

fn print_table(comparison: &Comparison, rate_format: &str) {
    let summary = comparison.summary();

    println!("Loan Strategy Comparison");
    println!("========================");
    println!("Rate format: {}\n", rate_format);

    println!(
        "{:<28} {:>7} {:>16} {:>16} {:>10}",
        "Strategy", "Months", "Total Cost", "Total Interest", "Payoff"
    );
    println!("{}", "-".repeat(81));
    for row in &summary.rows {
        let payoff = row
            .payoff_date
            .map(|d| d.format("%Y-%m").to_string())
            .unwrap_or_default();
        println!(
            "{:<28} {:>7} {:>16.2} {:>16.2} {:>10}",
            row.name, row.months, row.total_cost, row.total_interest, payoff
        );
    }

    for (kind, err) in comparison.failures() {
        println!("{:<28} FAILED: {}", kind.name(), err);
    }

    if let Some(best) = summary.best_by_interest() {
        println!("\nLeast interest: {} (${:.2})", best.name, best.total_interest);
    }
}

fn print_json(comparison: &Comparison) -> Result<()> {
    let report = Report {
        summary: comparison.summary(),
        results: comparison.successes().map(|(_, r)| r).collect(),
        failures: comparison
            .failures()
            .map(|(kind, e)| FailureRow {
                strategy: kind.key().to_string(),
                error: e.to_string(),
            })
            .collect(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_csv(summary: &ComparisonSummary) -> Result<()> {
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    for row in &summary.rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Month, interest, total, one principal column per loan, remaining balance
fn write_schedule(path: &str, result: &StrategyResult) -> Result<()> {
    let schedule = &result.schedule;
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec!["Month".to_string(), "Interest".to_string(), "Total".to_string()];
    header.extend(schedule.loan_numbers.iter().map(|n| format!("Loan {}", n)));
    header.push("Remaining".to_string());
    writer.write_record(&header)?;

    let remaining = schedule.remaining_balances();
    for (record, left) in schedule.months.iter().zip(remaining) {
        let mut line = vec![
            record.month.to_string(),
            format!("{:.2}", record.interest),
            format!("{:.2}", record.total_payment),
        ];
        line.extend(record.principal.iter().map(|p| format!("{:.2}", p)));
        line.push(format!("{:.2}", left));
        writer.write_record(&line)?;
    }
    writer.flush()?;
    Ok(())
}
