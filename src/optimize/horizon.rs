//! Horizon estimate for the whole-horizon optimizer

use crate::config::MilpConfig;
use crate::loan::Loan;
use crate::simulation::PaymentMode;

/// Months the MILP plans over
///
/// `naive = ceil(total balance / monthly principal capacity)`, where capacity
/// is the budget less first-month interest (fixed total) or the whole budget
/// (after interest). The horizon is `ceil(multiplier x naive)` clamped to the
/// configured bounds. A non-positive capacity yields the upper bound.
pub fn estimate_horizon(loans: &[Loan], budget: f64, mode: PaymentMode, config: &MilpConfig) -> u32 {
    if let Some(fixed) = config.horizon_override {
        return fixed.max(1);
    }

    let total_balance: f64 = loans.iter().map(|l| l.balance).sum();
    let initial_interest: f64 = loans.iter().map(|l| l.first_month_interest()).sum();
    let capacity = mode.principal_budget(budget, initial_interest);

    let lower = config.min_horizon.max(1);
    let upper = config.max_horizon.max(lower);
    if capacity <= 0.0 {
        return upper;
    }

    let naive = (total_balance / capacity).ceil();
    let scaled = (config.horizon_multiplier * naive).ceil();
    if scaled >= upper as f64 {
        upper
    } else {
        (scaled as u32).max(lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loans() -> Vec<Loan> {
        vec![
            Loan::new(1, 0.02, 50.0, 1_000.0),
            Loan::new(2, 0.005, 100.0, 5_000.0),
        ]
    }

    #[test]
    fn test_clamped_to_minimum() {
        // capacity 255, naive ceil(6000 / 255) = 24, 1.5 x 24 = 36
        let h = estimate_horizon(&loans(), 300.0, PaymentMode::FixedTotal, &MilpConfig::default());
        assert_eq!(h, 36);

        // capacity 3000 -> naive 2 -> 3 -> clamped up to 30
        let h = estimate_horizon(&loans(), 3_000.0, PaymentMode::FixedAfterInterest, &MilpConfig::default());
        assert_eq!(h, 30);
    }

    #[test]
    fn test_clamped_to_maximum() {
        let h = estimate_horizon(&loans(), 50.0, PaymentMode::FixedTotal, &MilpConfig::default());
        assert_eq!(h, 360);
        let h = estimate_horizon(&loans(), 10.0, PaymentMode::FixedAfterInterest, &MilpConfig::default());
        assert_eq!(h, 360);
    }

    #[test]
    fn test_override() {
        let config = MilpConfig {
            horizon_override: Some(12),
            ..Default::default()
        };
        assert_eq!(estimate_horizon(&loans(), 300.0, PaymentMode::FixedTotal, &config), 12);
    }
}
