//! Planner configuration - root configuration structure.

use heapless::Vec;
use serde::Deserialize;

use crate::path::{Segment, MAX_PATH_SEGMENTS};

use super::motion::MotionParameter;
use super::planner::PlannerSettings;

/// Root configuration structure from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct PlannerConfig {
    /// Jerk and acceleration limits.
    pub motion: MotionParameter,

    /// Velocity cap and repair tuning.
    pub planner: PlannerSettings,

    /// Path segments in driving order.
    #[serde(default)]
    pub segments: Vec<Segment, MAX_PATH_SEGMENTS>,
}

impl PlannerConfig {
    /// Get a segment by id.
    pub fn segment(&self, id: u32) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == id)
    }

    /// List all segment ids in driving order.
    pub fn segment_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.segments.iter().map(|s| s.id)
    }

    /// Sum of all segment lengths.
    pub fn path_length(&self) -> f64 {
        self.segments.iter().map(|s| s.length).sum()
    }
}
