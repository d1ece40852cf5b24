//! Per-run loan state advanced one simulated month at a time

use crate::loan::Loan;

/// Mutable balances, rates and minimums owned by one strategy run
#[derive(Debug, Clone)]
pub struct LoanLedger {
    /// Current simulated month (0 before the first month)
    pub month: u32,

    pub loan_numbers: Vec<u32>,

    /// Monthly decimal rates
    pub rates: Vec<f64>,

    /// Minimum total payments (principal + interest)
    pub min_payments: Vec<f64>,

    /// Principal balances at the start of the current month
    pub balances: Vec<f64>,

    /// Zero-balance tolerance
    pub tolerance: f64,
}

impl LoanLedger {
    /// Initialize a private copy of the loan arrays
    ///
    /// Starting balances within tolerance are zeroed, so dust loans never
    /// enter the month loop.
    pub fn from_loans(loans: &[Loan], tolerance: f64) -> Self {
        Self {
            month: 0,
            loan_numbers: loans.iter().map(|l| l.loan_number).collect(),
            rates: loans.iter().map(|l| l.monthly_rate).collect(),
            min_payments: loans.iter().map(|l| l.min_payment).collect(),
            balances: loans
                .iter()
                .map(|l| if l.balance <= tolerance { 0.0 } else { l.balance })
                .collect(),
            tolerance,
        }
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Advance to next month
    pub fn advance_month(&mut self) {
        self.month += 1;
    }

    pub fn is_active(&self, pos: usize) -> bool {
        self.balances[pos] > self.tolerance
    }

    /// Positions of loans with balance above tolerance
    pub fn active_positions(&self) -> Vec<usize> {
        (0..self.len()).filter(|&i| self.is_active(i)).collect()
    }

    /// Interest accrued this month per position; zero for inactive loans
    pub fn accrued_interest(&self) -> Vec<f64> {
        (0..self.len())
            .map(|i| {
                if self.is_active(i) {
                    self.rates[i] * self.balances[i]
                } else {
                    0.0
                }
            })
            .collect()
    }

    /// Minimum principal contribution: `max(0, min_payment - interest)`
    ///
    /// Not capped at the balance; the overpayment handler absorbs any excess.
    pub fn minimum_principal(&self, interest: &[f64]) -> Vec<f64> {
        (0..self.len())
            .map(|i| {
                if self.is_active(i) {
                    (self.min_payments[i] - interest[i]).max(0.0)
                } else {
                    0.0
                }
            })
            .collect()
    }

    pub fn total_balance(&self) -> f64 {
        self.balances.iter().sum()
    }

    pub fn is_paid_off(&self) -> bool {
        self.total_balance() <= self.tolerance
    }

    /// Apply principal payments and zero-clamp balances below tolerance
    pub fn apply_principal(&mut self, principal: &[f64]) {
        for (balance, &p) in self.balances.iter_mut().zip(principal) {
            *balance -= p;
            if *balance <= self.tolerance {
                *balance = 0.0;
            }
        }
    }
}
