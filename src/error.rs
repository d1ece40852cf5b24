//! Error taxonomy for loan validation, simulation and optimization

use thiserror::Error;

/// Failures raised by the engine
///
/// Every variant aborts only the strategy (or validation pass) that raised it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Malformed or out-of-range loan data, detected before any simulation
    #[error("Invalid input for loan {loan}: {reason}")]
    InvalidInput { loan: String, reason: String },

    /// Fixed-total budget cannot cover the interest accrued in a month
    #[error(
        "Budget {budget:.2} cannot cover accrued interest {interest:.2} in month {month}; \
         increase the monthly budget or reduce the number of loans"
    )]
    InsufficientBudget { month: u32, budget: f64, interest: f64 },

    /// Greedy loop reached its month cap without paying everything off
    #[error(
        "Payoff not reached within {months} months; the budget is likely too low \
         relative to the debt"
    )]
    PayoffExceededHorizon { months: u32 },

    /// LP/MILP solver did not return an optimal solution
    #[error("Optimization failed for {strategy}: {reason}")]
    OptimizationFailed { strategy: String, reason: String },

    /// Strategy key not present in the registry
    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),
}

impl EngineError {
    pub(crate) fn invalid(loan: impl ToString, reason: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            loan: loan.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn optimization(strategy: &str, reason: impl Into<String>) -> Self {
        EngineError::OptimizationFailed {
            strategy: strategy.to_string(),
            reason: reason.into(),
        }
    }
}

/// Failures while reading loan sheets or config files
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Unable to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed loan sheet: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] EngineError),
}
