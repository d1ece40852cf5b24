//! Run configuration for simulations and the MILP optimizer
//!
//! Every field has a default, so a config file only needs the keys it changes:
//!
//! ```json
//! { "parallel": true, "milp": { "time_limit_secs": 60 } }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::LoadError;

/// Balances at or below this are treated as paid off
pub const BALANCE_TOLERANCE: f64 = 0.01;

/// Safety cap on simulated months for the greedy loop
pub const MAX_ITERATIONS: u32 = 600;

fn default_tolerance() -> f64 {
    BALANCE_TOLERANCE
}

fn default_max_months() -> u32 {
    MAX_ITERATIONS
}

fn default_time_limit() -> f64 {
    300.0
}

fn default_horizon_multiplier() -> f64 {
    1.5
}

fn default_min_horizon() -> u32 {
    30
}

fn default_max_horizon() -> u32 {
    360
}

fn default_big_m_factor() -> f64 {
    5.0
}

fn default_mip_rel_gap() -> f64 {
    1e-6
}

/// Settings shared by every strategy in a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Zero-balance tolerance
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Month cap before `PayoffExceededHorizon`
    #[serde(default = "default_max_months")]
    pub max_months: u32,

    /// Run strategies of a comparison on the rayon pool
    #[serde(default)]
    pub parallel: bool,

    #[serde(default)]
    pub milp: MilpConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tolerance: BALANCE_TOLERANCE,
            max_months: MAX_ITERATIONS,
            parallel: false,
            milp: MilpConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Read a config from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Whole-horizon MILP settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilpConfig {
    /// Solver wall-clock limit in seconds
    #[serde(default = "default_time_limit")]
    pub time_limit_secs: f64,

    /// Horizon = multiplier x naive payoff estimate
    #[serde(default = "default_horizon_multiplier")]
    pub horizon_multiplier: f64,

    #[serde(default = "default_min_horizon")]
    pub min_horizon: u32,

    #[serde(default = "default_max_horizon")]
    pub max_horizon: u32,

    /// BigM = factor x largest initial balance
    #[serde(default = "default_big_m_factor")]
    pub big_m_factor: f64,

    /// Relative MIP gap accepted as optimal
    #[serde(default = "default_mip_rel_gap")]
    pub mip_rel_gap: f64,

    /// Fixed horizon, bypassing the estimate
    #[serde(default)]
    pub horizon_override: Option<u32>,
}

impl Default for MilpConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: default_time_limit(),
            horizon_multiplier: default_horizon_multiplier(),
            min_horizon: default_min_horizon(),
            max_horizon: default_max_horizon(),
            big_m_factor: default_big_m_factor(),
            mip_rel_gap: default_mip_rel_gap(),
            horizon_override: None,
        }
    }
}
