//! Motion planning for clearance-motion.
//!
//! Provides the single-transition ramp calculator and the multi-constraint
//! joint motion profile built on top of it.

mod observer;
mod profile;
mod ramp;
mod situation;

pub use observer::{PlanningObserver, Repair};
pub use profile::{
    JointMotionProfile, JointMotionProfileInputSet, Timestamps, VelocityPoint, VelocityPointList,
    MAX_VELOCITY_POINTS,
};
pub use ramp::{ExtendedRampCalculationResult, KinematicState, RampCalculator, RampDirection};
pub use situation::Situation;
