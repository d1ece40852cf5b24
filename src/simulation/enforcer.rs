//! Minimum-payment enforcement under a limited principal budget

use serde::{Deserialize, Serialize};

/// Balance above which a loan keeps at least half its minimum
pub const LARGE_BALANCE: f64 = 200.0;
/// Balance above which a loan keeps at least a quarter of its minimum
pub const MEDIUM_BALANCE: f64 = 100.0;

/// How minimum principal contributions shrink when the budget cannot cover them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MinimumEnforcer {
    /// Scale every minimum by `budget / sum`
    Simple,
    /// Protect a balance-dependent floor of each minimum before scaling
    Tiered,
}

impl MinimumEnforcer {
    /// Fit minimum principal contributions into `budget`
    ///
    /// Minimums are returned unchanged when they fit. The result never sums
    /// to more than `budget` and never contains a negative entry.
    pub fn enforce(&self, minimums: &[f64], balances: &[f64], budget: f64) -> Vec<f64> {
        let budget = budget.max(0.0);
        let total: f64 = minimums.iter().sum();
        if total <= budget {
            return minimums.to_vec();
        }

        match self {
            MinimumEnforcer::Simple => scale(minimums, budget / total),
            MinimumEnforcer::Tiered => tiered(minimums, balances, budget),
        }
    }
}

/// Share of the minimum protected for a loan of this balance
pub fn floor_fraction(balance: f64) -> f64 {
    if balance > LARGE_BALANCE {
        0.5
    } else if balance > MEDIUM_BALANCE {
        0.25
    } else {
        0.0
    }
}

fn scale(values: &[f64], factor: f64) -> Vec<f64> {
    values.iter().map(|v| v * factor).collect()
}

fn tiered(minimums: &[f64], balances: &[f64], budget: f64) -> Vec<f64> {
    let floors: Vec<f64> = minimums
        .iter()
        .zip(balances)
        .map(|(&m, &b)| m * floor_fraction(b))
        .collect();
    let floor_total: f64 = floors.iter().sum();

    if floor_total >= budget {
        if floor_total <= 0.0 {
            // Only reachable when the budget is zero too
            return vec![0.0; minimums.len()];
        }
        return scale(&floors, budget / floor_total);
    }

    // Sum of minimums exceeds budget, which exceeds the floors, so headroom is positive
    let headroom_total: f64 = minimums.iter().sum::<f64>() - floor_total;
    let share = (budget - floor_total) / headroom_total;
    minimums
        .iter()
        .zip(&floors)
        .map(|(&m, &f)| f + (m - f) * share)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_fits_unchanged() {
        let mins = [30.0, 75.0];
        for enforcer in [MinimumEnforcer::Simple, MinimumEnforcer::Tiered] {
            assert_eq!(enforcer.enforce(&mins, &[1000.0, 5000.0], 255.0), mins.to_vec());
        }
    }

    #[test]
    fn test_simple_scales_proportionally() {
        let out = MinimumEnforcer::Simple.enforce(&[60.0, 140.0], &[1000.0, 50.0], 100.0);
        assert_abs_diff_eq!(out[0], 30.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out[1], 70.0, epsilon = 1e-12);
    }

    #[test]
    fn test_tiered_protects_large_balances() {
        // Floors: 50% of 100 = 50 (balance 5000), 25% of 40 = 10 (balance 150), 0 (balance 80)
        let mins = [100.0, 40.0, 60.0];
        let balances = [5000.0, 150.0, 80.0];
        let out = MinimumEnforcer::Tiered.enforce(&mins, &balances, 120.0);

        // Remaining 60 shared over headroom 50 + 30 + 60 = 140
        let share = 60.0 / 140.0;
        assert_abs_diff_eq!(out[0], 50.0 + 50.0 * share, epsilon = 1e-9);
        assert_abs_diff_eq!(out[1], 10.0 + 30.0 * share, epsilon = 1e-9);
        assert_abs_diff_eq!(out[2], 60.0 * share, epsilon = 1e-9);
        assert_abs_diff_eq!(out.iter().sum::<f64>(), 120.0, epsilon = 1e-9);

        // Large loan keeps more than simple scaling would give it
        let simple = MinimumEnforcer::Simple.enforce(&mins, &balances, 120.0);
        assert!(out[0] > simple[0]);
    }

    #[test]
    fn test_tiered_scales_floors_when_they_exceed_budget() {
        let mins = [100.0, 100.0];
        let balances = [5000.0, 500.0];
        // Floors 50 + 50 = 100 > budget 40
        let out = MinimumEnforcer::Tiered.enforce(&mins, &balances, 40.0);
        assert_abs_diff_eq!(out[0], 20.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out[1], 20.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_budget() {
        for enforcer in [MinimumEnforcer::Simple, MinimumEnforcer::Tiered] {
            let out = enforcer.enforce(&[10.0, 20.0], &[50.0, 500.0], 0.0);
            assert!(out.iter().all(|&v| v == 0.0));
        }
    }
}
