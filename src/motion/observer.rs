//! Diagnostic hooks into profile construction.

use crate::constraint::VelocityConstraint;

use super::profile::VelocityPoint;

/// Mutation applied to the working envelope when a planning pass fails.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Repair {
    /// Constraint absorbed into its successor.
    MergedWithNext {
        /// Index of the removed constraint.
        index: usize,
    },
    /// Constraint absorbed into its predecessor at the lower cap.
    MergedWithPrevious {
        /// Index of the removed constraint.
        index: usize,
    },
    /// Boundary to the faster predecessor moved back so braking starts earlier.
    ShiftedBoundary {
        /// Index of the grown constraint.
        index: usize,
        /// New start of the grown constraint.
        start: f64,
    },
    /// Constraint cap lowered by one velocity step.
    LoweredCap {
        /// Index of the constraint.
        index: usize,
        /// New cap.
        max_velocity: f64,
    },
    /// Unreachable local peak removed before the first pass.
    ClosedPeak {
        /// Index of the removed constraint.
        index: usize,
    },
}

/// Receives a trace of profile construction.
///
/// All methods default to no-ops; `()` is the silent observer.
pub trait PlanningObserver {
    /// A full planning pass is about to run over `constraints`.
    fn on_pass(&mut self, _iteration: usize, _constraints: &[VelocityConstraint]) {}

    /// A pass aborted and the envelope was repaired.
    fn on_repair(&mut self, _iteration: usize, _repair: &Repair) {}

    /// Construction finished with these velocity points.
    fn on_complete(&mut self, _points: &[VelocityPoint]) {}
}

impl PlanningObserver for () {}

impl<T: PlanningObserver + ?Sized> PlanningObserver for &mut T {
    fn on_pass(&mut self, iteration: usize, constraints: &[VelocityConstraint]) {
        (**self).on_pass(iteration, constraints)
    }

    fn on_repair(&mut self, iteration: usize, repair: &Repair) {
        (**self).on_repair(iteration, repair)
    }

    fn on_complete(&mut self, points: &[VelocityPoint]) {
        (**self).on_complete(points)
    }
}
