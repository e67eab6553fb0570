//! Path segments and clearance-driven re-planning.

mod clearance;
mod segment;

pub use clearance::{ClearanceHandlingMotionProfile, VehicleStatus};
pub use segment::{NodeId, PathSegment, Segment, MAX_PATH_SEGMENTS};
