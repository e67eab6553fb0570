//! Planner settings from TOML.

use serde::Deserialize;

use crate::error::ConfigError;

/// Step sizes and limits of the constraint repair loop.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlannerTuning {
    /// Velocity step used by the stepped-down peak search and cap reduction.
    #[serde(default = "default_velocity_decrement")]
    pub velocity_decrement: f64,

    /// Distance a boundary is moved when braking must start earlier.
    #[serde(default = "default_distance_decrement")]
    pub distance_decrement: f64,

    /// Safety cap on full planning passes.
    #[serde(default = "default_max_repair_iterations")]
    pub max_repair_iterations: usize,

    /// Remove unreachable local peaks before the first pass.
    #[serde(default = "default_close_high_tight_gaps")]
    pub close_high_tight_gaps: bool,
}

fn default_velocity_decrement() -> f64 {
    5.0
}

fn default_distance_decrement() -> f64 {
    10.0
}

fn default_max_repair_iterations() -> usize {
    10_000
}

fn default_close_high_tight_gaps() -> bool {
    true
}

impl Default for PlannerTuning {
    fn default() -> Self {
        Self {
            velocity_decrement: default_velocity_decrement(),
            distance_decrement: default_distance_decrement(),
            max_repair_iterations: default_max_repair_iterations(),
            close_high_tight_gaps: default_close_high_tight_gaps(),
        }
    }
}

impl PlannerTuning {
    /// Check that step sizes and the iteration cap are positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.velocity_decrement > 0.0) {
            return Err(ConfigError::InvalidVelocityDecrement(self.velocity_decrement));
        }
        if !(self.distance_decrement > 0.0) {
            return Err(ConfigError::InvalidDistanceDecrement(self.distance_decrement));
        }
        if self.max_repair_iterations == 0 {
            return Err(ConfigError::InvalidRepairIterations(self.max_repair_iterations));
        }
        Ok(())
    }
}

/// `[planner]` table: global velocity cap plus repair tuning keys.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PlannerSettings {
    /// Global speed cap applied on top of every segment's own limit.
    pub cap_velocity: f64,

    /// See [`PlannerTuning::velocity_decrement`].
    #[serde(default = "default_velocity_decrement")]
    pub velocity_decrement: f64,

    /// See [`PlannerTuning::distance_decrement`].
    #[serde(default = "default_distance_decrement")]
    pub distance_decrement: f64,

    /// See [`PlannerTuning::max_repair_iterations`].
    #[serde(default = "default_max_repair_iterations")]
    pub max_repair_iterations: usize,

    /// See [`PlannerTuning::close_high_tight_gaps`].
    #[serde(default = "default_close_high_tight_gaps")]
    pub close_high_tight_gaps: bool,
}

impl PlannerSettings {
    /// Repair tuning part of the settings.
    pub fn tuning(&self) -> PlannerTuning {
        PlannerTuning {
            velocity_decrement: self.velocity_decrement,
            distance_decrement: self.distance_decrement,
            max_repair_iterations: self.max_repair_iterations,
            close_high_tight_gaps: self.close_high_tight_gaps,
        }
    }
}
