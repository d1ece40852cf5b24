//! Independent re-check of a produced schedule
//!
//! Replays the schedule from its starting balances and reports every place
//! where the recorded numbers disagree with the replay.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::engine::PaymentMode;
use super::schedule::Schedule;

/// A single inconsistency found in a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AuditFinding {
    /// Rates supplied do not line up with the schedule's loan columns
    ShapeMismatch { loans: usize, rates: usize },
    NegativePayment { month: u32, loan_number: u32, amount: f64 },
    /// Principal larger than the balance it was applied to
    Overpayment { month: u32, loan_number: u32, principal: f64, balance: f64 },
    InterestMismatch { month: u32, recorded: f64, expected: f64 },
    /// Total payment differs from interest + principal
    TotalMismatch { month: u32, recorded: f64, expected: f64 },
    OverBudget { month: u32, amount: f64, budget: f64 },
    /// Loan not paid down to zero, or paid past it
    ConservationBreach { loan_number: u32, paid: f64, starting: f64 },
}

impl fmt::Display for AuditFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditFinding::ShapeMismatch { loans, rates } => {
                write!(f, "schedule has {} loans but {} rates were given", loans, rates)
            }
            AuditFinding::NegativePayment { month, loan_number, amount } => write!(
                f,
                "month {}: loan {} has negative principal {:.2}",
                month, loan_number, amount
            ),
            AuditFinding::Overpayment { month, loan_number, principal, balance } => write!(
                f,
                "month {}: loan {} paid {:.2} against balance {:.2}",
                month, loan_number, principal, balance
            ),
            AuditFinding::InterestMismatch { month, recorded, expected } => write!(
                f,
                "month {}: interest {:.2} recorded, {:.2} expected",
                month, recorded, expected
            ),
            AuditFinding::TotalMismatch { month, recorded, expected } => write!(
                f,
                "month {}: total {:.2} recorded, {:.2} expected",
                month, recorded, expected
            ),
            AuditFinding::OverBudget { month, amount, budget } => write!(
                f,
                "month {}: payment {:.2} exceeds budget {:.2}",
                month, amount, budget
            ),
            AuditFinding::ConservationBreach { loan_number, paid, starting } => write!(
                f,
                "loan {}: principal paid {:.2} vs starting balance {:.2}",
                loan_number, paid, starting
            ),
        }
    }
}

/// Check a schedule against the payoff invariants
///
/// Returns an empty list for a clean schedule.
pub fn audit_schedule(
    schedule: &Schedule,
    rates: &[f64],
    budget: f64,
    mode: PaymentMode,
    tolerance: f64,
) -> Vec<AuditFinding> {
    let n = schedule.loan_numbers.len();
    if rates.len() != n || schedule.starting_balances.len() != n {
        return vec![AuditFinding::ShapeMismatch {
            loans: n,
            rates: rates.len(),
        }];
    }

    let mut findings = Vec::new();
    let mut balances = schedule.starting_balances.clone();

    for record in &schedule.months {
        let month = record.month;
        if record.principal.len() != n {
            findings.push(AuditFinding::ShapeMismatch {
                loans: record.principal.len(),
                rates: n,
            });
            continue;
        }

        let expected_interest: f64 = balances
            .iter()
            .zip(rates)
            .filter(|(&b, _)| b > tolerance)
            .map(|(b, r)| b * r)
            .sum();
        if (expected_interest - record.interest).abs() > tolerance {
            findings.push(AuditFinding::InterestMismatch {
                month,
                recorded: record.interest,
                expected: expected_interest,
            });
        }

        let principal_total = record.total_principal();
        let expected_total = record.interest + principal_total;
        if (expected_total - record.total_payment).abs() > tolerance {
            findings.push(AuditFinding::TotalMismatch {
                month,
                recorded: record.total_payment,
                expected: expected_total,
            });
        }

        let amount = match mode {
            PaymentMode::FixedTotal => record.total_payment,
            PaymentMode::FixedAfterInterest => principal_total,
        };
        if amount > budget + tolerance {
            findings.push(AuditFinding::OverBudget { month, amount, budget });
        }

        for (pos, &p) in record.principal.iter().enumerate() {
            let loan_number = schedule.loan_numbers[pos];
            if p < -tolerance {
                findings.push(AuditFinding::NegativePayment {
                    month,
                    loan_number,
                    amount: p,
                });
            }
            if p > balances[pos] + tolerance {
                findings.push(AuditFinding::Overpayment {
                    month,
                    loan_number,
                    principal: p,
                    balance: balances[pos],
                });
            }
            balances[pos] -= p;
            if balances[pos] < tolerance {
                balances[pos] = 0.0;
            }
        }
    }

    let paid = schedule.principal_totals();
    for pos in 0..n {
        let starting = schedule.starting_balances[pos];
        if (paid[pos] - starting).abs() > tolerance {
            findings.push(AuditFinding::ConservationBreach {
                loan_number: schedule.loan_numbers[pos],
                paid: paid[pos],
                starting,
            });
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::MonthRecord;

    fn clean() -> Schedule {
        // 100 @ 1%: month 1 interest 1, pay 60; month 2 interest 0.4, pay 40
        let mut s = Schedule::new(vec![1], vec![100.0]);
        s.add_month(MonthRecord::new(1, vec![60.0], 1.0));
        s.add_month(MonthRecord::new(2, vec![40.0], 0.4));
        s
    }

    #[test]
    fn test_clean_schedule() {
        let findings = audit_schedule(&clean(), &[0.01], 61.0, PaymentMode::FixedTotal, 0.01);
        assert!(findings.is_empty(), "{:?}", findings);
    }

    #[test]
    fn test_detects_problems() {
        let mut s = clean();
        s.months[1].interest = 3.0;
        s.months[1].principal[0] = 30.0;

        let findings = audit_schedule(&s, &[0.01], 50.0, PaymentMode::FixedTotal, 0.01);
        assert!(findings
            .iter()
            .any(|f| matches!(f, AuditFinding::InterestMismatch { month: 2, .. })));
        assert!(findings
            .iter()
            .any(|f| matches!(f, AuditFinding::TotalMismatch { month: 2, .. })));
        assert!(findings
            .iter()
            .any(|f| matches!(f, AuditFinding::OverBudget { month: 1, .. })));
        assert!(findings
            .iter()
            .any(|f| matches!(f, AuditFinding::ConservationBreach { loan_number: 1, .. })));
    }

    #[test]
    fn test_shape_mismatch() {
        let findings = audit_schedule(&clean(), &[0.01, 0.02], 100.0, PaymentMode::FixedTotal, 0.01);
        assert_eq!(findings, vec![AuditFinding::ShapeMismatch { loans: 1, rates: 2 }]);
    }
}
