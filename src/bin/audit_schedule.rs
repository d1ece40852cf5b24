//! Run strategies on a loan sheet and audit every resulting schedule
//!
//! Replays each schedule from the starting balances and reports any month
//! that breaks the payoff invariants. Exits non-zero if any finding is made.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

use loan_strategies::compare::{resolve_strategies, StrategyRunner};
use loan_strategies::loan::load_loans;
use loan_strategies::simulation::audit::audit_schedule;
use loan_strategies::{NoopObserver, PaymentMode, SimulationConfig};

#[derive(Parser)]
#[command(name = "audit_schedule", about = "Audit strategy schedules for a loan sheet")]
struct Args {
    /// Loan sheet CSV
    loans: PathBuf,

    /// Monthly budget
    #[arg(short, long)]
    budget: f64,

    /// 0 = fixed total, 1 = fixed after interest
    #[arg(short, long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=1))]
    mode: u8,

    /// Comma-separated strategy keys (default: all)
    #[arg(short, long, value_delimiter = ',')]
    strategies: Option<Vec<String>>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let validated = load_loans(&args.loans)
        .with_context(|| format!("loading loans from {}", args.loans.display()))?;
    let rates: Vec<f64> = validated.loans.iter().map(|l| l.monthly_rate).collect();
    let mode = PaymentMode::try_from(args.mode)?;

    let keys: Option<Vec<&str>> = args
        .strategies
        .as_ref()
        .map(|v| v.iter().map(String::as_str).collect());
    let kinds = resolve_strategies(keys.as_deref())?;

    let config = SimulationConfig {
        parallel: true,
        ..Default::default()
    };
    let tolerance = config.tolerance;
    let start = Instant::now();
    let comparison = StrategyRunner::new(config).compare(
        &kinds,
        args.budget,
        mode,
        &validated.loans,
        &NoopObserver,
    );
    println!("Ran {} strategies in {:?}\n", kinds.len(), start.elapsed());

    let mut total_findings = 0;
    for entry in &comparison.entries {
        match &entry.outcome {
            Ok(result) => {
                let findings =
                    audit_schedule(&result.schedule, &rates, args.budget, mode, tolerance);
                if findings.is_empty() {
                    println!("{:<28} OK ({} months)", entry.kind.name(), result.months);
                } else {
                    println!("{:<28} {} findings", entry.kind.name(), findings.len());
                    for f in &findings {
                        println!("    {}", f);
                    }
                }
                total_findings += findings.len();
            }
            Err(e) => println!("{:<28} skipped: {}", entry.kind.name(), e),
        }
    }

    if total_findings > 0 {
        std::process::exit(1);
    }
    Ok(())
}
