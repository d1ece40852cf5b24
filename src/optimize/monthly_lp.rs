//! Per-month LP: minimize next month's accrued interest
//!
//! Re-solved every month inside the regular simulation loop:
//!
//! ```text
//! maximise   sum p_i * r_i
//! subject to sum p_i <= principal budget
//!            min_i <= p_i <= balance_i
//! ```
//!
//! Minimums are capped at the balance, then fitted into the budget with the
//! simple enforcer, so the LP is always feasible.

use good_lp::solvers::highs::highs;
use good_lp::{variable, variables, Expression, Solution, SolutionStatus, SolverModel, Variable};

use crate::error::EngineError;
use crate::simulation::{MinimumEnforcer, MonthContext, MonthlyAllocator, RedistributionRule};

/// Added to every rate so the full budget is used even when rates are zero
const PROGRESS_WEIGHT: f64 = 1e-7;

/// Allocator backed by a HiGHS linear program
#[derive(Debug, Clone)]
pub struct MonthlyLp {
    strategy: String,
}

impl MonthlyLp {
    pub fn new(strategy: impl Into<String>) -> Self {
        Self {
            strategy: strategy.into(),
        }
    }
}

impl MonthlyAllocator for MonthlyLp {
    fn allocate(&self, ctx: &MonthContext<'_>) -> Result<Vec<f64>, EngineError> {
        let n = ctx.balances.len();
        let capped: Vec<f64> = (0..n)
            .map(|i| ctx.min_principal[i].min(ctx.balances[i]).max(0.0))
            .collect();
        let lower = MinimumEnforcer::Simple.enforce(&capped, ctx.balances, ctx.principal_budget);

        let mut vars = variables!();
        let mut objective = Expression::with_capacity(ctx.active.len());
        let mut budget_row = Expression::with_capacity(ctx.active.len());
        let mut payment_vars: Vec<(usize, Variable)> = Vec::with_capacity(ctx.active.len());

        for &i in ctx.active {
            let upper = ctx.balances[i];
            let p = vars.add(variable().min(lower[i].min(upper)).max(upper));
            objective.add_mul(ctx.rates[i] + PROGRESS_WEIGHT, p);
            budget_row.add_mul(1.0, p);
            payment_vars.push((i, p));
        }

        let problem = vars
            .maximise(objective)
            .using(highs)
            .with(budget_row.leq(ctx.principal_budget));

        let solution = problem.solve().map_err(|e| {
            EngineError::optimization(&self.strategy, format!("month {}: {}", ctx.month, e))
        })?;
        if matches!(solution.status(), SolutionStatus::TimeLimit) {
            return Err(EngineError::optimization(
                &self.strategy,
                format!("month {}: solver stopped before reaching an optimum", ctx.month),
            ));
        }

        let mut principal = vec![0.0; n];
        for (i, p) in payment_vars {
            principal[i] = solution.value(p).clamp(0.0, ctx.balances[i]);
        }
        Ok(principal)
    }

    fn redistribution(&self) -> RedistributionRule {
        RedistributionRule::HighestInterest
    }
}
