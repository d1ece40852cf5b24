//! Overpayment capping and redistribution

use super::policy::RedistributionRule;

/// Cap each principal payment at its loan's balance and return the pooled excess
pub fn cap_at_balance(principal: &mut [f64], balances: &[f64]) -> f64 {
    let mut pool = 0.0;
    for (p, &b) in principal.iter_mut().zip(balances) {
        if *p > b {
            pool += *p - b;
            *p = b;
        }
    }
    pool
}

/// Hand a pooled overpayment to other loans until it is spent or nothing is owed
///
/// Recipients are chosen by `rule` over remaining balances (balance minus
/// principal already assigned this month). Redistributed amounts are added
/// to `principal`. Returns whatever could not be placed.
pub fn redistribute(
    mut pool: f64,
    principal: &mut [f64],
    balances: &[f64],
    rates: &[f64],
    rule: RedistributionRule,
) -> f64 {
    let mut remaining: Vec<f64> = balances
        .iter()
        .zip(principal.iter())
        .map(|(&b, &p)| (b - p).max(0.0))
        .collect();

    while pool > 0.0 {
        let Some(i) = rule.select(&remaining, rates) else {
            break;
        };
        if pool >= remaining[i] {
            pool -= remaining[i];
            principal[i] += remaining[i];
            remaining[i] = 0.0;
        } else {
            principal[i] += pool;
            remaining[i] -= pool;
            pool = 0.0;
        }
    }

    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_cap_pools_excess() {
        let mut principal = vec![120.0, 40.0];
        let pool = cap_at_balance(&mut principal, &[100.0, 500.0]);
        assert_abs_diff_eq!(pool, 20.0);
        assert_eq!(principal, vec![100.0, 40.0]);
    }

    #[test]
    fn test_pool_cascades_through_small_loans() {
        // Snowball order: 30 then 80 then 1000
        let balances = [1_000.0, 30.0, 80.0, 0.0];
        let rates = [0.01, 0.01, 0.01, 0.01];
        let mut principal = vec![0.0; 4];
        let left = redistribute(
            150.0,
            &mut principal,
            &balances,
            &rates,
            RedistributionRule::LowestBalance,
        );
        assert_abs_diff_eq!(left, 0.0);
        assert_abs_diff_eq!(principal[1], 30.0);
        assert_abs_diff_eq!(principal[2], 80.0);
        assert_abs_diff_eq!(principal[0], 40.0);
        assert_abs_diff_eq!(principal[3], 0.0);
    }

    #[test]
    fn test_leftover_when_everything_is_paid() {
        let balances = [50.0, 20.0];
        let mut principal = vec![50.0, 0.0];
        let left = redistribute(
            35.0,
            &mut principal,
            &balances,
            &[0.02, 0.01],
            RedistributionRule::HighestInterest,
        );
        assert_abs_diff_eq!(left, 15.0);
        assert_eq!(principal, vec![50.0, 20.0]);
    }
}
