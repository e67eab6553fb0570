//! Velocity and stop constraints along the path.
//!
//! Raw constraints may overlap; the planner only ever sees the effective
//! envelope derived from them.

mod stop;
mod velocity;

pub use stop::{StopConstraint, StopConstraintCollection};
pub use velocity::{
    ConstraintList, VelocityConstraint, VelocityConstraintsCollection, MAX_EFFECTIVE_CONSTRAINTS,
    MAX_STOP_CONSTRAINTS, MAX_VELOCITY_CONSTRAINTS,
};
