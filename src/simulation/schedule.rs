//! Schedule output structures for a single strategy run

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One simulated month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthRecord {
    /// Month index (1-indexed)
    pub month: u32,

    /// Principal paid per loan, in ledger position order
    pub principal: Vec<f64>,

    /// Interest accrued on month-start balances
    pub interest: f64,

    /// Interest plus all principal, including redistributed overpayment
    pub total_payment: f64,
}

impl MonthRecord {
    pub fn new(month: u32, principal: Vec<f64>, interest: f64) -> Self {
        let total_payment = interest + principal.iter().sum::<f64>();
        Self {
            month,
            principal,
            interest,
            total_payment,
        }
    }

    pub fn total_principal(&self) -> f64 {
        self.principal.iter().sum()
    }
}

/// Ordered month records for a set of loans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Loan identifiers, one per principal column
    pub loan_numbers: Vec<u32>,

    /// Balances at the start of month 1
    pub starting_balances: Vec<f64>,

    pub months: Vec<MonthRecord>,
}

impl Schedule {
    pub fn new(loan_numbers: Vec<u32>, starting_balances: Vec<f64>) -> Self {
        Self {
            loan_numbers,
            starting_balances,
            months: Vec::new(),
        }
    }

    /// Add a month record
    pub fn add_month(&mut self, record: MonthRecord) {
        self.months.push(record);
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// Principal series for one loan, or None for an unknown loan number
    pub fn principal_for(&self, loan_number: u32) -> Option<Vec<f64>> {
        let pos = self.loan_numbers.iter().position(|&n| n == loan_number)?;
        Some(self.months.iter().map(|m| m.principal[pos]).collect())
    }

    /// Loan number -> ordered per-month principal payments
    pub fn by_loan(&self) -> BTreeMap<u32, Vec<f64>> {
        self.loan_numbers
            .iter()
            .enumerate()
            .map(|(pos, &n)| (n, self.months.iter().map(|m| m.principal[pos]).collect()))
            .collect()
    }

    /// Total principal paid per loan over the whole schedule
    pub fn principal_totals(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.loan_numbers.len()];
        for month in &self.months {
            for (total, p) in totals.iter_mut().zip(&month.principal) {
                *total += p;
            }
        }
        totals
    }

    /// Total remaining principal after each month
    pub fn remaining_balances(&self) -> Vec<f64> {
        let mut remaining: f64 = self.starting_balances.iter().sum();
        self.months
            .iter()
            .map(|m| {
                remaining -= m.total_principal();
                remaining.max(0.0)
            })
            .collect()
    }

    pub fn monthly_totals(&self) -> Vec<f64> {
        self.months.iter().map(|m| m.total_payment).collect()
    }

    pub fn monthly_interest(&self) -> Vec<f64> {
        self.months.iter().map(|m| m.interest).collect()
    }
}

/// Complete result of one strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyResult {
    /// Registry key of the strategy that produced this result
    pub strategy: String,

    /// Months to payoff
    pub months: u32,

    pub schedule: Schedule,

    pub monthly_totals: Vec<f64>,

    pub monthly_interest: Vec<f64>,
}

impl StrategyResult {
    pub fn from_schedule(strategy: impl Into<String>, schedule: Schedule) -> Self {
        Self {
            strategy: strategy.into(),
            months: schedule.len() as u32,
            monthly_totals: schedule.monthly_totals(),
            monthly_interest: schedule.monthly_interest(),
            schedule,
        }
    }

    pub fn total_cost(&self) -> f64 {
        self.monthly_totals.iter().sum()
    }

    pub fn total_interest(&self) -> f64 {
        self.monthly_interest.iter().sum()
    }

    /// Get summary statistics
    pub fn summary(&self) -> StrategySummary {
        StrategySummary {
            strategy: self.strategy.clone(),
            months: self.months,
            total_cost: self.total_cost(),
            total_interest: self.total_interest(),
        }
    }
}

/// Summary statistics for a strategy run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySummary {
    pub strategy: String,
    pub months: u32,
    pub total_cost: f64,
    pub total_interest: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn two_month_schedule() -> Schedule {
        let mut schedule = Schedule::new(vec![7, 3], vec![150.0, 50.0]);
        schedule.add_month(MonthRecord::new(1, vec![100.0, 20.0], 4.0));
        schedule.add_month(MonthRecord::new(2, vec![50.0, 30.0], 1.5));
        schedule
    }

    #[test]
    fn test_month_total_includes_interest() {
        let record = MonthRecord::new(1, vec![100.0, 20.0], 4.0);
        assert_abs_diff_eq!(record.total_payment, 124.0);
        assert_abs_diff_eq!(record.total_principal(), 120.0);
    }

    #[test]
    fn test_views() {
        let schedule = two_month_schedule();
        assert_eq!(schedule.principal_for(3), Some(vec![20.0, 30.0]));
        assert_eq!(schedule.principal_for(99), None);

        let by_loan = schedule.by_loan();
        assert_eq!(by_loan.keys().copied().collect::<Vec<_>>(), vec![3, 7]);
        assert_eq!(by_loan[&7], vec![100.0, 50.0]);

        assert_eq!(schedule.principal_totals(), vec![150.0, 50.0]);
        let remaining = schedule.remaining_balances();
        assert_abs_diff_eq!(remaining[0], 80.0);
        assert_abs_diff_eq!(remaining[1], 0.0);
    }

    #[test]
    fn test_result_summary() {
        let result = StrategyResult::from_schedule("even", two_month_schedule());
        let summary = result.summary();
        assert_eq!(summary.months, 2);
        assert_abs_diff_eq!(summary.total_interest, 5.5);
        assert_abs_diff_eq!(summary.total_cost, 205.5);
    }
}
