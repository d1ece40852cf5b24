//! Whole-horizon MILP minimizing lifetime interest
//!
//! Per loan `i` and month `t = 1..T`:
//!
//! ```text
//! b[t] = (1 + r) b[t-1] - p[t]                    balance recurrence
//! b[t] <= b[t-1]                                   balances never grow
//! b[t-1] <= M a[t]                                 open loans are active
//! a[t+1] <= a[t]                                   once closed, stays closed
//! p[t] <= (1 + r) M a[t]                           pay only while active
//! p[t] <= (1 + r) b[t-1]                           no overpayment
//! p[t] >= m (a[t] + a[t+1] - 1)                    minimum while staying open
//! b[T] = 0
//! ```
//!
//! with one budget row per month and objective `min sum r b[t-1]`. Payment
//! variables are total payments (interest + principal).

use good_lp::solvers::highs::highs;
use good_lp::{
    variable, variables, Expression, ResolutionError, Solution, SolutionStatus, SolverModel,
    Variable,
};
use log::debug;

use super::horizon::estimate_horizon;
use crate::config::{MilpConfig, BALANCE_TOLERANCE};
use crate::error::EngineError;
use crate::loan::Loan;
use crate::observer::SimulationObserver;
use crate::simulation::{check_budget, MonthRecord, PaymentMode, Schedule, StrategyResult};

/// Variables for one loan across the horizon (index `k` is month `k + 1`)
struct LoanVars {
    balance: Vec<Variable>,
    payment: Vec<Variable>,
    active: Vec<Variable>,
}

/// Lifetime-optimal payoff planner
#[derive(Debug, Clone)]
pub struct MilpOptimizer {
    strategy: String,
    config: MilpConfig,
    tolerance: f64,
}

impl MilpOptimizer {
    pub fn new(strategy: impl Into<String>, config: MilpConfig) -> Self {
        Self {
            strategy: strategy.into(),
            config,
            tolerance: BALANCE_TOLERANCE,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Solve the horizon problem and return the truncated payoff schedule
    pub fn optimize(
        &self,
        loans: &[Loan],
        budget: f64,
        mode: PaymentMode,
        observer: &dyn SimulationObserver,
    ) -> Result<StrategyResult, EngineError> {
        check_budget(budget)?;

        let initial_interest: f64 = loans
            .iter()
            .filter(|l| l.balance > self.tolerance)
            .map(|l| l.first_month_interest())
            .sum();
        if mode == PaymentMode::FixedTotal && initial_interest >= budget {
            return Err(EngineError::InsufficientBudget {
                month: 1,
                budget,
                interest: initial_interest,
            });
        }

        let horizon = estimate_horizon(loans, budget, mode, &self.config) as usize;
        debug!(
            "{}: planning {} loans over {} months",
            self.strategy,
            loans.len(),
            horizon
        );

        let balances = self.solve(loans, budget, mode, horizon)?;
        let schedule = self.extract_schedule(loans, &balances);
        for record in &schedule.months {
            observer.on_month(&self.strategy, record);
        }
        Ok(StrategyResult::from_schedule(self.strategy.clone(), schedule))
    }

    /// Build and solve the model, returning solved balances per loan per month
    fn solve(
        &self,
        loans: &[Loan],
        budget: f64,
        mode: PaymentMode,
        horizon: usize,
    ) -> Result<Vec<Vec<f64>>, EngineError> {
        let mut vars = variables!();
        let loan_vars: Vec<LoanVars> = loans
            .iter()
            .map(|_| LoanVars {
                balance: (0..horizon).map(|_| vars.add(variable().min(0.0))).collect(),
                payment: (0..horizon).map(|_| vars.add(variable().min(0.0))).collect(),
                active: (0..horizon).map(|_| vars.add(variable().binary())).collect(),
            })
            .collect();

        // Interest on b[t-1]; month 1 is a constant and drops out
        let mut objective = Expression::with_capacity(loans.len() * horizon);
        for (loan, lv) in loans.iter().zip(&loan_vars) {
            for k in 0..horizon.saturating_sub(1) {
                objective.add_mul(loan.monthly_rate, lv.balance[k]);
            }
        }

        let mut problem = vars
            .minimise(objective)
            .using(highs)
            .set_time_limit(self.config.time_limit_secs)
            .set_mip_rel_gap(self.config.mip_rel_gap as f32)
            .map_err(|e| EngineError::optimization(&self.strategy, e.to_string()))?;

        for (loan, lv) in loans.iter().zip(&loan_vars) {
            let growth = 1.0 + loan.monthly_rate;
            let big_m = (self.config.big_m_factor * loan.balance).max(loan.balance);
            let m = loan.min_payment;

            for k in 0..horizon {
                // Expression for b[t-1] split into a variable part and a constant
                let prev: Option<Variable> = if k == 0 { None } else { Some(lv.balance[k - 1]) };
                let prev_const = if k == 0 { loan.balance } else { 0.0 };

                let mut recurrence = Expression::default();
                recurrence.add_mul(1.0, lv.balance[k]);
                recurrence.add_mul(1.0, lv.payment[k]);
                let mut no_growth = Expression::default();
                no_growth.add_mul(1.0, lv.balance[k]);
                let mut linking = Expression::default();
                linking.add_mul(big_m, lv.active[k]);
                let mut no_overpay = Expression::default();
                no_overpay.add_mul(1.0, lv.payment[k]);
                if let Some(prev) = prev {
                    recurrence.add_mul(-growth, prev);
                    no_growth.add_mul(-1.0, prev);
                    linking.add_mul(-1.0, prev);
                    no_overpay.add_mul(-growth, prev);
                }
                problem = problem
                    .with(recurrence.eq(growth * prev_const))
                    .with(no_growth.leq(prev_const))
                    .with(linking.geq(prev_const))
                    .with(no_overpay.leq(growth * prev_const));

                let mut gated = Expression::default();
                gated.add_mul(1.0, lv.payment[k]);
                gated.add_mul(-growth * big_m, lv.active[k]);
                problem = problem.with(gated.leq(0.0));

                if k + 1 < horizon {
                    let mut monotone = Expression::default();
                    monotone.add_mul(1.0, lv.active[k + 1]);
                    monotone.add_mul(-1.0, lv.active[k]);
                    problem = problem.with(monotone.leq(0.0));

                    if m > 0.0 {
                        let mut minimum = Expression::default();
                        minimum.add_mul(1.0, lv.payment[k]);
                        minimum.add_mul(-m, lv.active[k]);
                        minimum.add_mul(-m, lv.active[k + 1]);
                        problem = problem.with(minimum.geq(-m));
                    }
                }
            }

            let mut terminal = Expression::default();
            terminal.add_mul(1.0, lv.balance[horizon - 1]);
            problem = problem.with(terminal.eq(0.0));
        }

        for k in 0..horizon {
            let mut row = Expression::with_capacity(loans.len() * 2);
            let mut rhs = budget;
            for (loan, lv) in loans.iter().zip(&loan_vars) {
                row.add_mul(1.0, lv.payment[k]);
                if mode == PaymentMode::FixedAfterInterest {
                    if k == 0 {
                        rhs += loan.first_month_interest();
                    } else {
                        row.add_mul(-loan.monthly_rate, lv.balance[k - 1]);
                    }
                }
            }
            problem = problem.with(row.leq(rhs));
        }

        let solution = problem.solve().map_err(|e| match e {
            ResolutionError::Infeasible | ResolutionError::Unbounded => EngineError::optimization(
                &self.strategy,
                format!(
                    "no feasible payoff within the {}-month horizon (horizon too short, \
                     or minimum payments exceed the budget)",
                    horizon
                ),
            ),
            other => EngineError::optimization(&self.strategy, other.to_string()),
        })?;
        check_status(&self.strategy, solution.status(), self.config.time_limit_secs)?;

        Ok(loan_vars
            .iter()
            .map(|lv| lv.balance.iter().map(|&b| solution.value(b).max(0.0)).collect())
            .collect())
    }

    /// Turn solved balances into a schedule ending at the first all-clear month
    ///
    /// The schedule is replayed from the starting balances so recorded interest
    /// matches the balances actually carried; any residual left by solver
    /// tolerance is swept into the final month.
    fn extract_schedule(&self, loans: &[Loan], solved: &[Vec<f64>]) -> Schedule {
        let mut schedule = Schedule::new(
            loans.iter().map(|l| l.loan_number).collect(),
            loans.iter().map(|l| l.balance).collect(),
        );
        let horizon = solved.first().map(|b| b.len()).unwrap_or(0);
        if horizon == 0 {
            return schedule;
        }

        let payoff = (0..horizon)
            .find(|&k| solved.iter().all(|b| b[k] <= self.tolerance))
            .unwrap_or(horizon - 1);
        let mut remaining: Vec<f64> = loans.iter().map(|l| l.balance).collect();

        for k in 0..=payoff {
            let interest: f64 = loans
                .iter()
                .zip(&remaining)
                .filter(|(_, &b)| b > self.tolerance)
                .map(|(l, b)| l.monthly_rate * b)
                .sum();

            let principal: Vec<f64> = remaining
                .iter()
                .zip(solved)
                .map(|(&left, balances)| {
                    if k == payoff {
                        left
                    } else {
                        (left - balances[k]).clamp(0.0, left)
                    }
                })
                .collect();

            for (left, p) in remaining.iter_mut().zip(&principal) {
                *left -= p;
                if *left < self.tolerance {
                    *left = 0.0;
                }
            }
            schedule.add_month(MonthRecord::new(k as u32 + 1, principal, interest));
        }

        schedule
    }
}

/// Accept proven optima and optima within the configured relative gap
///
/// Any other stop (time, iteration or memory limit) leaves an unproven
/// incumbent and is reported as a failure.
fn check_status(
    strategy: &str,
    status: SolutionStatus,
    time_limit_secs: f64,
) -> Result<(), EngineError> {
    match status {
        SolutionStatus::Optimal => Ok(()),
        SolutionStatus::GapLimit => {
            debug!("{}: stopped within the relative gap", strategy);
            Ok(())
        }
        SolutionStatus::TimeLimit => Err(EngineError::optimization(
            strategy,
            format!(
                "solver hit the {:.0}s time limit before proving optimality",
                time_limit_secs
            ),
        )),
    }
}
