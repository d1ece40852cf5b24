//! Priority rules for greedy allocation
//!
//! A greedy strategy is a pair of selectors: where the extra principal goes,
//! and which loan absorbs an overpayment. Ties resolve to the lowest position.

use serde::{Deserialize, Serialize};

/// Recipient of principal beyond the enforced minimums
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtraTarget {
    /// Split equally across all active loans
    EvenSplit,
    /// Loan with the highest accrued interest (rate x balance)
    HighestInterest,
    HighestBalance,
    LowestBalance,
}

/// Next recipient for pooled overpayment among loans with positive remaining balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedistributionRule {
    HighestInterest,
    HighestBalance,
    LowestBalance,
}

impl ExtraTarget {
    /// Distribute `extra` over `active` positions, returning per-position amounts
    pub fn allocate(
        &self,
        extra: f64,
        active: &[usize],
        balances: &[f64],
        rates: &[f64],
    ) -> Vec<f64> {
        let mut out = vec![0.0; balances.len()];
        if extra <= 0.0 || active.is_empty() {
            return out;
        }

        let target = match self {
            ExtraTarget::EvenSplit => {
                let share = extra / active.len() as f64;
                for &i in active {
                    out[i] = share;
                }
                return out;
            }
            ExtraTarget::HighestInterest => {
                argmax(active.iter().map(|&i| (i, rates[i] * balances[i])))
            }
            ExtraTarget::HighestBalance => argmax(active.iter().map(|&i| (i, balances[i]))),
            ExtraTarget::LowestBalance => argmin(active.iter().map(|&i| (i, balances[i]))),
        };

        if let Some(i) = target {
            out[i] = extra;
        }
        out
    }
}

impl RedistributionRule {
    /// Choose the next loan to receive overpayment, given remaining balances
    pub fn select(&self, remaining: &[f64], rates: &[f64]) -> Option<usize> {
        let candidates = remaining
            .iter()
            .enumerate()
            .filter(|(_, &b)| b > 0.0)
            .map(|(i, &b)| (i, b));

        match self {
            RedistributionRule::HighestInterest => {
                argmax(candidates.map(|(i, b)| (i, rates[i] * b)))
            }
            RedistributionRule::HighestBalance => argmax(candidates),
            RedistributionRule::LowestBalance => argmin(candidates),
        }
    }
}

/// First position holding the maximum value
fn argmax(values: impl Iterator<Item = (usize, f64)>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, v) in values {
        match best {
            Some((_, bv)) if v <= bv => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// First position holding the minimum value
fn argmin(values: impl Iterator<Item = (usize, f64)>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, v) in values {
        match best {
            Some((_, bv)) if v >= bv => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const BALANCES: [f64; 3] = [1_000.0, 5_000.0, 1_000.0];
    const RATES: [f64; 3] = [0.02, 0.005, 0.02];

    #[test]
    fn test_targets_pick_first_on_ties() {
        let active = [0, 1, 2];
        // Interest: 20, 25, 20
        let hi = ExtraTarget::HighestInterest.allocate(100.0, &active, &BALANCES, &RATES);
        assert_eq!(hi, vec![0.0, 100.0, 0.0]);

        // Lowest balance tie between 0 and 2 resolves to 0
        let low = ExtraTarget::LowestBalance.allocate(100.0, &active, &BALANCES, &RATES);
        assert_eq!(low, vec![100.0, 0.0, 0.0]);

        let high = ExtraTarget::HighestBalance.allocate(100.0, &active, &BALANCES, &RATES);
        assert_eq!(high, vec![0.0, 100.0, 0.0]);
    }

    #[test]
    fn test_even_split_skips_inactive() {
        let out = ExtraTarget::EvenSplit.allocate(90.0, &[0, 2], &BALANCES, &RATES);
        assert_abs_diff_eq!(out[0], 45.0);
        assert_abs_diff_eq!(out[1], 0.0);
        assert_abs_diff_eq!(out[2], 45.0);
    }

    #[test]
    fn test_no_extra_no_allocation() {
        let out = ExtraTarget::HighestBalance.allocate(-5.0, &[0, 1], &BALANCES, &RATES);
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_redistribution_ignores_paid_loans() {
        let remaining = [0.0, 300.0, 50.0];
        assert_eq!(
            RedistributionRule::LowestBalance.select(&remaining, &RATES),
            Some(2)
        );
        assert_eq!(
            RedistributionRule::HighestBalance.select(&remaining, &RATES),
            Some(1)
        );
        // 300 x 0.005 = 1.5 vs 50 x 0.02 = 1.0
        assert_eq!(
            RedistributionRule::HighestInterest.select(&remaining, &RATES),
            Some(1)
        );
        assert_eq!(
            RedistributionRule::HighestInterest.select(&[0.0, 0.0, 0.0], &RATES),
            None
        );
    }
}
