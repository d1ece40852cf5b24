//! Month-by-month payoff simulation

pub mod audit;
mod engine;
pub mod enforcer;
mod ledger;
pub mod policy;
pub mod redistribute;
mod schedule;

pub use engine::{GreedyPolicy, MonthContext, MonthlyAllocator, PaymentMode, SimulationEngine};
pub(crate) use engine::check_budget;
pub use enforcer::MinimumEnforcer;
pub use ledger::LoanLedger;
pub use policy::{ExtraTarget, RedistributionRule};
pub use schedule::{MonthRecord, Schedule, StrategyResult, StrategySummary};
