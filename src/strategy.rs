//! Strategy registry
//!
//! A closed set of strategies. String keys exist only for the outer boundary
//! (CLI flags, request payloads); internally everything is a `StrategyKind`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::SimulationConfig;
use crate::error::EngineError;
use crate::loan::Loan;
use crate::observer::SimulationObserver;
use crate::optimize::{MilpOptimizer, MonthlyLp};
use crate::simulation::{
    ExtraTarget, GreedyPolicy, MinimumEnforcer, PaymentMode, RedistributionRule,
    SimulationEngine, StrategyResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Even,
    HighInterest,
    HighBalance,
    Snowball,
    MinimizeInterest,
    MilpLifetime,
}

impl StrategyKind {
    /// Every registered strategy, in registry order
    pub fn all() -> [StrategyKind; 6] {
        [
            StrategyKind::Even,
            StrategyKind::HighInterest,
            StrategyKind::HighBalance,
            StrategyKind::Snowball,
            StrategyKind::MinimizeInterest,
            StrategyKind::MilpLifetime,
        ]
    }

    pub fn key(&self) -> &'static str {
        match self {
            StrategyKind::Even => "even",
            StrategyKind::HighInterest => "high_interest",
            StrategyKind::HighBalance => "high_balance",
            StrategyKind::Snowball => "snowball",
            StrategyKind::MinimizeInterest => "minimize_interest",
            StrategyKind::MilpLifetime => "milp_lifetime",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::Even => "Even Payments",
            StrategyKind::HighInterest => "High Interest First",
            StrategyKind::HighBalance => "High Balance First",
            StrategyKind::Snowball => "Snowball Method",
            StrategyKind::MinimizeInterest => "Minimize Accrued Interest",
            StrategyKind::MilpLifetime => "MILP Lifetime Optimal",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StrategyKind::Even => "Distribute extra payments equally across all loans",
            StrategyKind::HighInterest => "Focus extra payments on the loan accruing the most interest",
            StrategyKind::HighBalance => "Focus extra payments on highest principal balance loans",
            StrategyKind::Snowball => "Pay off lowest balance loans first for psychological wins",
            StrategyKind::MinimizeInterest => {
                "Solve a linear program each month to minimize next month's interest"
            }
            StrategyKind::MilpLifetime => {
                "Mixed integer program over the whole payoff horizon (globally optimal, slower)"
            }
        }
    }

    /// Enforcer and selectors for the month-by-month greedy strategies
    pub fn greedy_policy(&self) -> Option<GreedyPolicy> {
        let (enforcer, target, redistribution) = match self {
            StrategyKind::Even => (
                MinimumEnforcer::Simple,
                ExtraTarget::EvenSplit,
                RedistributionRule::HighestInterest,
            ),
            StrategyKind::HighInterest => (
                MinimumEnforcer::Simple,
                ExtraTarget::HighestInterest,
                RedistributionRule::HighestInterest,
            ),
            StrategyKind::HighBalance => (
                MinimumEnforcer::Simple,
                ExtraTarget::HighestBalance,
                RedistributionRule::HighestBalance,
            ),
            StrategyKind::Snowball => (
                MinimumEnforcer::Tiered,
                ExtraTarget::LowestBalance,
                RedistributionRule::LowestBalance,
            ),
            StrategyKind::MinimizeInterest | StrategyKind::MilpLifetime => return None,
        };
        Some(GreedyPolicy {
            enforcer,
            target,
            redistribution,
        })
    }

    pub fn is_optimizer(&self) -> bool {
        self.greedy_policy().is_none()
    }

    /// Run this strategy on a private copy of `loans`
    pub fn run(
        &self,
        loans: &[Loan],
        budget: f64,
        mode: PaymentMode,
        config: &SimulationConfig,
        observer: &dyn SimulationObserver,
    ) -> Result<StrategyResult, EngineError> {
        let engine = SimulationEngine::new(config.clone());
        if let Some(policy) = self.greedy_policy() {
            return engine.simulate(self.key(), &policy, loans, budget, mode, observer);
        }
        match self {
            StrategyKind::MilpLifetime => MilpOptimizer::new(self.key(), config.milp.clone())
                .with_tolerance(config.tolerance)
                .optimize(loans, budget, mode, observer),
            _ => engine.simulate(self.key(), &MonthlyLp::new(self.key()), loans, budget, mode, observer),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for StrategyKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyKind::all()
            .into_iter()
            .find(|k| k.key() == s.trim())
            .ok_or_else(|| EngineError::UnknownStrategy(s.to_string()))
    }
}
