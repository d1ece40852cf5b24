//! Loan Strategies - multi-loan payoff simulation and strategy comparison
//!
//! This library provides:
//! - Greedy allocation strategies (even split, high interest, high balance, snowball)
//! - Minimum-payment enforcement and overpayment redistribution
//! - Per-month LP and whole-horizon MILP optimizers
//! - Multi-strategy comparison with optional parallel execution
//! - Loan sheet loading, validation and schedule auditing

pub mod compare;
pub mod config;
pub mod error;
pub mod loan;
pub mod observer;
pub mod optimize;
pub mod simulation;
pub mod strategy;

// Re-export commonly used types
pub use compare::{compare, run_strategy, Comparison, ComparisonSummary, StrategyRunner, SummaryRow};
pub use config::{MilpConfig, SimulationConfig};
pub use error::{EngineError, LoadError};
pub use loan::{Loan, LoanRecord, RateFormat, ValidatedLoans};
pub use observer::{LogObserver, NoopObserver, ProgressFn, SimulationObserver};
pub use simulation::{MonthRecord, PaymentMode, Schedule, StrategyResult};
pub use strategy::StrategyKind;
