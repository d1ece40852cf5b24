//! Observation hooks injected into strategy runs
//!
//! Strategies never log through global state of their own; anything a caller
//! wants to see (progress bars, month traces) arrives through an observer.

use log::{debug, info, trace, warn};

use crate::error::EngineError;
use crate::simulation::{MonthRecord, StrategyResult};

/// Callbacks fired while strategies run
///
/// All methods default to no-ops. Observers must be `Sync` so a comparison
/// can share one across the rayon pool.
pub trait SimulationObserver: Sync {
    /// Called before a strategy begins: `(name, index, total)`
    fn on_strategy_start(&self, _name: &str, _index: usize, _total: usize) {}

    /// Called after each simulated month is recorded
    fn on_month(&self, _strategy: &str, _record: &MonthRecord) {}

    /// Called once a strategy has finished, successfully or not
    fn on_strategy_finish(&self, _strategy: &str, _outcome: &Result<StrategyResult, EngineError>) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SimulationObserver for NoopObserver {}

/// Observer that forwards events to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver {
    /// Emit a trace line per simulated month
    pub trace_months: bool,
}

impl SimulationObserver for LogObserver {
    fn on_strategy_start(&self, name: &str, index: usize, total: usize) {
        info!("Running {} ({}/{})", name, index + 1, total);
    }

    fn on_month(&self, strategy: &str, record: &MonthRecord) {
        if self.trace_months {
            trace!(
                "{} month {}: interest {:.2}, principal {:.2}",
                strategy,
                record.month,
                record.interest,
                record.total_principal()
            );
        }
    }

    fn on_strategy_finish(&self, strategy: &str, outcome: &Result<StrategyResult, EngineError>) {
        match outcome {
            Ok(result) => debug!(
                "{} finished in {} months, interest {:.2}",
                strategy,
                result.months,
                result.total_interest()
            ),
            Err(e) => warn!("{} failed: {}", strategy, e),
        }
    }
}

/// Progress callback adapter: `ProgressFn(|name, i, n| ...)`
pub struct ProgressFn<F>(pub F);

impl<F> SimulationObserver for ProgressFn<F>
where
    F: Fn(&str, usize, usize) + Sync,
{
    fn on_strategy_start(&self, name: &str, index: usize, total: usize) {
        (self.0)(name, index, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_progress_fn_receives_start_events() {
        let seen = Mutex::new(Vec::new());
        let observer = ProgressFn(|name: &str, i: usize, n: usize| {
            seen.lock().unwrap().push(format!("{}:{}/{}", name, i, n));
        });
        observer.on_strategy_start("Snowball Method", 3, 6);
        observer.on_month("snowball", &MonthRecord::new(1, vec![10.0], 1.0));
        assert_eq!(seen.into_inner().unwrap(), vec!["Snowball Method:3/6"]);
    }
}
