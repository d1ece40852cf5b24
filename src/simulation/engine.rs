//! Monthly payoff simulation shared by every month-by-month strategy

use serde::{Deserialize, Serialize};

use super::enforcer::MinimumEnforcer;
use super::ledger::LoanLedger;
use super::policy::{ExtraTarget, RedistributionRule};
use super::redistribute::{cap_at_balance, redistribute};
use super::schedule::{MonthRecord, Schedule, StrategyResult};
use crate::config::SimulationConfig;
use crate::error::EngineError;
use crate::loan::Loan;
use crate::observer::SimulationObserver;

/// How the monthly budget relates to interest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMode {
    /// Budget caps interest + principal (mode 0)
    #[default]
    FixedTotal,
    /// Budget is principal only; interest is paid on top (mode 1)
    FixedAfterInterest,
}

impl PaymentMode {
    /// Principal available after this month's interest
    pub fn principal_budget(&self, budget: f64, interest: f64) -> f64 {
        match self {
            PaymentMode::FixedTotal => budget - interest,
            PaymentMode::FixedAfterInterest => budget,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            PaymentMode::FixedTotal => 0,
            PaymentMode::FixedAfterInterest => 1,
        }
    }
}

impl TryFrom<u8> for PaymentMode {
    type Error = EngineError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(PaymentMode::FixedTotal),
            1 => Ok(PaymentMode::FixedAfterInterest),
            other => Err(EngineError::invalid(
                "(all)",
                format!("payment mode must be 0 or 1, got {}", other),
            )),
        }
    }
}

/// Everything an allocator may look at for one month
#[derive(Debug, Clone, Copy)]
pub struct MonthContext<'a> {
    pub month: u32,

    /// Positions of loans with balance above tolerance
    pub active: &'a [usize],

    /// Month-start balances
    pub balances: &'a [f64],

    pub rates: &'a [f64],

    /// Accrued interest per position
    pub interest: &'a [f64],

    /// `max(0, min_payment - interest)` per position
    pub min_principal: &'a [f64],

    /// Principal budget for the month
    pub principal_budget: f64,
}

/// Decides the principal split for one month
///
/// The returned vector may overpay a loan; the engine caps it and hands the
/// excess to `redistribution()`.
pub trait MonthlyAllocator {
    fn allocate(&self, ctx: &MonthContext<'_>) -> Result<Vec<f64>, EngineError>;

    fn redistribution(&self) -> RedistributionRule;
}

/// A greedy strategy: enforcer plus the two priority selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GreedyPolicy {
    pub enforcer: MinimumEnforcer,
    pub target: ExtraTarget,
    pub redistribution: RedistributionRule,
}

impl MonthlyAllocator for GreedyPolicy {
    fn allocate(&self, ctx: &MonthContext<'_>) -> Result<Vec<f64>, EngineError> {
        let mut principal =
            self.enforcer
                .enforce(ctx.min_principal, ctx.balances, ctx.principal_budget);
        let extra = ctx.principal_budget - principal.iter().sum::<f64>();

        let extra_split = self
            .target
            .allocate(extra, ctx.active, ctx.balances, ctx.rates);
        for (p, e) in principal.iter_mut().zip(extra_split) {
            *p += e;
        }
        Ok(principal)
    }

    fn redistribution(&self) -> RedistributionRule {
        self.redistribution
    }
}

/// Month-by-month payoff engine
#[derive(Debug, Clone, Default)]
pub struct SimulationEngine {
    config: SimulationConfig,
}

impl SimulationEngine {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run a strategy until every balance is within tolerance of zero
    pub fn simulate<A: MonthlyAllocator + ?Sized>(
        &self,
        strategy: &str,
        allocator: &A,
        loans: &[Loan],
        budget: f64,
        mode: PaymentMode,
        observer: &dyn SimulationObserver,
    ) -> Result<StrategyResult, EngineError> {
        check_budget(budget)?;

        let mut ledger = LoanLedger::from_loans(loans, self.config.tolerance);
        let mut schedule = Schedule::new(ledger.loan_numbers.clone(), ledger.balances.clone());

        while !ledger.is_paid_off() {
            if ledger.month >= self.config.max_months {
                return Err(EngineError::PayoffExceededHorizon {
                    months: self.config.max_months,
                });
            }

            ledger.advance_month();
            let record = self.calculate_month(allocator, &mut ledger, budget, mode)?;
            observer.on_month(strategy, &record);
            schedule.add_month(record);
        }

        Ok(StrategyResult::from_schedule(strategy, schedule))
    }

    /// Allocate, cap, redistribute and apply one month of payments
    fn calculate_month<A: MonthlyAllocator + ?Sized>(
        &self,
        allocator: &A,
        ledger: &mut LoanLedger,
        budget: f64,
        mode: PaymentMode,
    ) -> Result<MonthRecord, EngineError> {
        let active = ledger.active_positions();
        let interest = ledger.accrued_interest();
        let total_interest: f64 = interest.iter().sum();

        let principal_budget = mode.principal_budget(budget, total_interest);
        if principal_budget <= 0.0 {
            return Err(EngineError::InsufficientBudget {
                month: ledger.month,
                budget,
                interest: total_interest,
            });
        }

        let min_principal = ledger.minimum_principal(&interest);
        let ctx = MonthContext {
            month: ledger.month,
            active: &active,
            balances: &ledger.balances,
            rates: &ledger.rates,
            interest: &interest,
            min_principal: &min_principal,
            principal_budget,
        };
        let mut principal = allocator.allocate(&ctx)?;

        let pool = cap_at_balance(&mut principal, &ledger.balances);
        if pool > 0.0 {
            redistribute(
                pool,
                &mut principal,
                &ledger.balances,
                &ledger.rates,
                allocator.redistribution(),
            );
        }

        ledger.apply_principal(&principal);
        Ok(MonthRecord::new(ledger.month, principal, total_interest))
    }
}

pub(crate) fn check_budget(budget: f64) -> Result<(), EngineError> {
    if !budget.is_finite() || budget <= 0.0 {
        return Err(EngineError::invalid(
            "(all)",
            format!("monthly budget must be a positive number, got {}", budget),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoopObserver;
    use crate::strategy::StrategyKind;
    use approx::assert_abs_diff_eq;

    fn high_interest() -> GreedyPolicy {
        GreedyPolicy {
            enforcer: MinimumEnforcer::Simple,
            target: ExtraTarget::HighestInterest,
            redistribution: RedistributionRule::HighestInterest,
        }
    }

    #[test]
    fn test_single_loan_amortization() {
        let engine = SimulationEngine::default();
        let loans = [Loan::new(1, 0.01, 100.0, 1_200.0)];
        let result = engine
            .simulate("high_interest", &high_interest(), &loans, 200.0, PaymentMode::FixedTotal, &NoopObserver)
            .unwrap();

        // Direct amortization: pay 200 a month including interest
        let mut balance = 1_200.0_f64;
        let mut months = 0;
        while balance > 0.01 {
            balance = (balance * 1.01 - 200.0).max(0.0);
            months += 1;
        }
        assert_eq!(result.months, months);
        assert_eq!(result.months, 7);
        assert_abs_diff_eq!(result.monthly_interest[0], 12.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.monthly_totals[0], 200.0, epsilon = 1e-9);
        assert_abs_diff_eq!(
            result.schedule.principal_totals()[0],
            1_200.0,
            epsilon = 0.01
        );
    }

    #[test]
    fn test_insufficient_budget_reports_month() {
        let engine = SimulationEngine::default();
        let loans = [Loan::new(1, 0.02, 10.0, 10_000.0)];
        let err = engine
            .simulate("high_interest", &high_interest(), &loans, 150.0, PaymentMode::FixedTotal, &NoopObserver)
            .unwrap_err();
        match err {
            EngineError::InsufficientBudget {
                month,
                budget,
                interest,
            } => {
                assert_eq!(month, 1);
                assert_abs_diff_eq!(budget, 150.0);
                assert_abs_diff_eq!(interest, 200.0, epsilon = 1e-9);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_after_interest_mode_pays_interest_on_top() {
        let engine = SimulationEngine::default();
        let loans = [Loan::new(1, 0.02, 10.0, 10_000.0)];
        let result = engine
            .simulate("high_interest", &high_interest(), &loans, 150.0, PaymentMode::FixedAfterInterest, &NoopObserver)
            .unwrap();
        assert_abs_diff_eq!(result.monthly_totals[0], 350.0, epsilon = 1e-9);
        assert_eq!(result.months, 67);
    }

    #[test]
    fn test_horizon_cap() {
        let config = SimulationConfig {
            max_months: 12,
            ..Default::default()
        };
        let engine = SimulationEngine::new(config);
        let loans = [Loan::new(1, 0.01, 10.0, 100_000.0)];
        let err = engine
            .simulate("high_interest", &high_interest(), &loans, 1_100.0, PaymentMode::FixedTotal, &NoopObserver)
            .unwrap_err();
        assert_eq!(err, EngineError::PayoffExceededHorizon { months: 12 });
    }

    #[test]
    fn test_mode_codes() {
        assert_eq!(PaymentMode::try_from(0).unwrap(), PaymentMode::FixedTotal);
        assert_eq!(PaymentMode::try_from(1).unwrap(), PaymentMode::FixedAfterInterest);
        assert!(PaymentMode::try_from(2).is_err());
        assert_eq!(PaymentMode::FixedAfterInterest.code(), 1);
    }

    #[test]
    fn test_rejects_non_positive_budget() {
        let engine = SimulationEngine::default();
        let loans = [Loan::new(1, 0.01, 10.0, 100.0)];
        for budget in [0.0, -10.0, f64::NAN] {
            let err = engine
                .simulate("even", &high_interest(), &loans, budget, PaymentMode::FixedAfterInterest, &NoopObserver)
                .unwrap_err();
            assert!(matches!(err, EngineError::InvalidInput { .. }));
        }
    }

    #[test]
    fn test_payoff_month_overflow_follows_redistribution_rule() {
        // Loan 1 owes 20 but its minimum principal is 120; the 100 excess is
        // pooled. Accrued interest: loan 2 = 10, loan 3 = 12, loan 4 = 0.3.
        // Budget covers the minimums exactly, so no extra is targeted.
        let loans = [
            Loan::new(1, 0.0, 120.0, 20.0),
            Loan::new(2, 0.01, 0.0, 1_000.0),
            Loan::new(3, 0.03, 0.0, 400.0),
            Loan::new(4, 0.001, 0.0, 300.0),
        ];
        let engine = SimulationEngine::default();
        let cases = [
            (StrategyKind::Even, 2),
            (StrategyKind::HighInterest, 2),
            (StrategyKind::HighBalance, 1),
            (StrategyKind::Snowball, 3),
        ];
        for (kind, recipient) in cases {
            let policy = kind.greedy_policy().unwrap();
            let result = engine
                .simulate(kind.key(), &policy, &loans, 120.0, PaymentMode::FixedAfterInterest, &NoopObserver)
                .unwrap();
            let first = &result.schedule.months[0].principal;
            assert_abs_diff_eq!(first[0], 20.0, epsilon = 1e-9);
            for pos in 1..4 {
                let expected = if pos == recipient { 100.0 } else { 0.0 };
                assert_abs_diff_eq!(first[pos], expected, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_dust_loans_need_no_months() {
        let engine = SimulationEngine::default();
        let loans = [
            Loan::new(1, 0.01, 10.0, 0.008),
            Loan::new(2, 0.01, 10.0, 0.008),
        ];
        let result = engine
            .simulate("even", &high_interest(), &loans, 100.0, PaymentMode::FixedTotal, &NoopObserver)
            .unwrap();
        assert_eq!(result.months, 0);
        assert!(result.schedule.is_empty());
    }
}
