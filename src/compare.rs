//! Strategy runner and multi-strategy comparison
//!
//! Holds one configuration and runs any number of strategies against the same
//! loans, each on its own copy of the balances.

use chrono::{Datelike, Months, NaiveDate};
use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::error::EngineError;
use crate::loan::{validate_loans, Loan};
use crate::observer::{NoopObserver, SimulationObserver};
use crate::simulation::{PaymentMode, StrategyResult};
use crate::strategy::StrategyKind;

/// Run one strategy from parallel input arrays
///
/// Arrays are indexed by loan position and must all have the same length.
pub fn run_strategy(
    name: &str,
    budget: f64,
    mode: PaymentMode,
    loan_numbers: &[u32],
    monthly_rates: &[f64],
    balances: &[f64],
    min_payments: &[f64],
) -> Result<StrategyResult, EngineError> {
    let kind: StrategyKind = name.parse()?;
    let loans = loans_from_arrays(loan_numbers, monthly_rates, balances, min_payments)?;
    StrategyRunner::default().run(kind, &loans, budget, mode, &NoopObserver)
}

/// Compare strategies by key; `None` runs every registered strategy
///
/// Unknown keys and invalid loans fail before anything runs. Individual
/// strategy failures are kept in the returned `Comparison`.
pub fn compare(
    strategies: Option<&[&str]>,
    budget: f64,
    mode: PaymentMode,
    loans: &[Loan],
) -> Result<Comparison, EngineError> {
    let kinds = resolve_strategies(strategies)?;
    validate_loans(loans)?;
    Ok(StrategyRunner::default().compare(&kinds, budget, mode, loans, &NoopObserver))
}

/// Resolve string keys to strategies, preserving order
pub fn resolve_strategies(keys: Option<&[&str]>) -> Result<Vec<StrategyKind>, EngineError> {
    match keys {
        None => Ok(StrategyKind::all().to_vec()),
        Some(keys) => keys.iter().map(|k| k.parse()).collect(),
    }
}

fn loans_from_arrays(
    loan_numbers: &[u32],
    monthly_rates: &[f64],
    balances: &[f64],
    min_payments: &[f64],
) -> Result<Vec<Loan>, EngineError> {
    let n = loan_numbers.len();
    if monthly_rates.len() != n || balances.len() != n || min_payments.len() != n {
        return Err(EngineError::invalid(
            "(all)",
            format!(
                "array lengths differ: {} loan numbers, {} rates, {} balances, {} minimums",
                n,
                monthly_rates.len(),
                balances.len(),
                min_payments.len()
            ),
        ));
    }

    let loans: Vec<Loan> = (0..n)
        .map(|i| Loan::new(loan_numbers[i], monthly_rates[i], min_payments[i], balances[i]))
        .collect();
    validate_loans(&loans)?;
    Ok(loans)
}

/// Pre-configured runner for batches of strategies
#[derive(Debug, Clone, Default)]
pub struct StrategyRunner {
    config: SimulationConfig,
}

impl StrategyRunner {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run a single strategy
    pub fn run(
        &self,
        kind: StrategyKind,
        loans: &[Loan],
        budget: f64,
        mode: PaymentMode,
        observer: &dyn SimulationObserver,
    ) -> Result<StrategyResult, EngineError> {
        let checked = validate_loans(loans);
        self.run_checked(kind, &checked, loans, budget, mode, observer)
    }

    fn run_checked(
        &self,
        kind: StrategyKind,
        checked: &Result<(), EngineError>,
        loans: &[Loan],
        budget: f64,
        mode: PaymentMode,
        observer: &dyn SimulationObserver,
    ) -> Result<StrategyResult, EngineError> {
        let outcome = match checked {
            Ok(()) => kind.run(loans, budget, mode, &self.config, observer),
            Err(e) => Err(e.clone()),
        };
        observer.on_strategy_finish(kind.key(), &outcome);
        outcome
    }

    /// Run several strategies on the same loans, in request order
    pub fn compare(
        &self,
        kinds: &[StrategyKind],
        budget: f64,
        mode: PaymentMode,
        loans: &[Loan],
        observer: &dyn SimulationObserver,
    ) -> Comparison {
        let total = kinds.len();
        // Checked once; a bad loan set fails every entry without simulating
        let checked = validate_loans(loans);
        let run_one = |(index, kind): (usize, &StrategyKind)| {
            observer.on_strategy_start(kind.name(), index, total);
            ComparisonEntry {
                kind: *kind,
                outcome: self.run_checked(*kind, &checked, loans, budget, mode, observer),
            }
        };

        let entries: Vec<ComparisonEntry> = if self.config.parallel {
            kinds.par_iter().enumerate().map(run_one).collect()
        } else {
            kinds.iter().enumerate().map(run_one).collect()
        };

        let comparison = Comparison {
            entries,
            start_date: None,
        };
        for row in &comparison.summary().rows {
            info!(
                "{}: {} months, total cost {:.2}, total interest {:.2}",
                row.name, row.months, row.total_cost, row.total_interest
            );
        }
        comparison
    }
}

/// Outcome of one strategy within a comparison
#[derive(Debug, Clone)]
pub struct ComparisonEntry {
    pub kind: StrategyKind,
    pub outcome: Result<StrategyResult, EngineError>,
}

/// Results of a comparison request, in request order
#[derive(Debug, Clone)]
pub struct Comparison {
    pub entries: Vec<ComparisonEntry>,

    /// First month of repayment, for payoff dates
    pub start_date: Option<NaiveDate>,
}

impl Comparison {
    /// Attach a calendar start; any day is normalised to the first of its month
    pub fn with_start_date(mut self, start: NaiveDate) -> Self {
        self.start_date = Some(start.with_day(1).unwrap_or(start));
        self
    }

    pub fn get(&self, kind: StrategyKind) -> Option<&Result<StrategyResult, EngineError>> {
        self.entries
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| &e.outcome)
    }

    /// Successful results, in request order
    pub fn successes(&self) -> impl Iterator<Item = (StrategyKind, &StrategyResult)> {
        self.entries
            .iter()
            .filter_map(|e| e.outcome.as_ref().ok().map(|r| (e.kind, r)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (StrategyKind, &EngineError)> {
        self.entries
            .iter()
            .filter_map(|e| e.outcome.as_ref().err().map(|err| (e.kind, err)))
    }

    /// All results, or the first failure
    pub fn into_results(self) -> Result<Vec<(StrategyKind, StrategyResult)>, EngineError> {
        self.entries
            .into_iter()
            .map(|e| e.outcome.map(|r| (e.kind, r)))
            .collect()
    }

    /// Summary rows for every successful strategy
    pub fn summary(&self) -> ComparisonSummary {
        let rows = self
            .successes()
            .map(|(kind, result)| {
                let summary = result.summary();
                SummaryRow {
                    key: kind.key().to_string(),
                    name: kind.name().to_string(),
                    months: summary.months,
                    total_cost: summary.total_cost,
                    total_interest: summary.total_interest,
                    payoff_date: self
                        .start_date
                        .and_then(|start| payoff_date(start, summary.months)),
                }
            })
            .collect();
        ComparisonSummary { rows }
    }
}

/// Month in which the last payment falls, counting `start` as month 1
pub fn payoff_date(start: NaiveDate, months: u32) -> Option<NaiveDate> {
    start.checked_add_months(Months::new(months.saturating_sub(1)))
}

/// One line of the comparison table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub key: String,
    pub name: String,
    pub months: u32,
    pub total_cost: f64,
    pub total_interest: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub payoff_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub rows: Vec<SummaryRow>,
}

impl ComparisonSummary {
    /// Row with the least total interest (first wins on ties)
    pub fn best_by_interest(&self) -> Option<&SummaryRow> {
        self.rows.iter().fold(None, |best: Option<&SummaryRow>, row| match best {
            Some(b) if b.total_interest <= row.total_interest => Some(b),
            _ => Some(row),
        })
    }
}
