//! Optimization-based strategies (HiGHS via good_lp)

pub mod horizon;
mod milp;
mod monthly_lp;

pub use horizon::estimate_horizon;
pub use milp::MilpOptimizer;
pub use monthly_lp::MonthlyLp;
