//! Incremental re-planning as path clearance is granted.

use libm::fabs;

use crate::config::{MotionParameter, PlannerTuning};
use crate::constraint::{VelocityConstraint, VelocityConstraintsCollection};
use crate::error::{ConfigError, Result};
use crate::math::EPSILON;
use crate::motion::{JointMotionProfile, JointMotionProfileInputSet, KinematicState, PlanningObserver};

use super::segment::{NodeId, PathSegment, MAX_PATH_SEGMENTS};

/// Kinematic state plus where on the path it lies.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VehicleStatus {
    /// Acceleration, velocity and absolute distance.
    pub state: KinematicState,
    /// Node the vehicle is on or last left; `None` before the first grant.
    pub node: Option<NodeId>,
    /// Index of the segment the vehicle is on; `None` before the first grant.
    pub segment_index: Option<usize>,
}

/// Motion profile for a vehicle that may only drive on cleared segments.
///
/// Every accepted grant samples the current state, plans a fresh
/// [`JointMotionProfile`] from there to the end of the granted segment and
/// swaps it in. Queries before the first grant report standstill at the
/// origin.
///
/// Holds no internal synchronization; callers sharing one instance across
/// threads must serialize access.
#[derive(Debug)]
pub struct ClearanceHandlingMotionProfile<'a, S: PathSegment, O: PlanningObserver = ()> {
    created: f64,
    segments: &'a [S],
    params: MotionParameter,
    cap_velocity: f64,
    tuning: PlannerTuning,
    active: Option<JointMotionProfile>,
    cleared_length: f64,
    seed_time: f64,
    seed_distance: f64,
    observer: O,
}

impl<'a, S: PathSegment> ClearanceHandlingMotionProfile<'a, S> {
    /// Create a profile with nothing cleared yet.
    ///
    /// `created` is the wall-clock origin that grant and query times are
    /// measured against.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidCapVelocity` unless `cap_velocity > 0`,
    /// and `ConfigError::TooManySegments` for paths longer than
    /// [`MAX_PATH_SEGMENTS`].
    pub fn new(created: f64, segments: &'a [S], params: MotionParameter, cap_velocity: f64) -> Result<Self> {
        Self::with_observer(created, segments, params, cap_velocity, ())
    }
}

impl<'a, S: PathSegment, O: PlanningObserver> ClearanceHandlingMotionProfile<'a, S, O> {
    /// Create a profile that reports every rebuild to `observer`.
    pub fn with_observer(
        created: f64,
        segments: &'a [S],
        params: MotionParameter,
        cap_velocity: f64,
        observer: O,
    ) -> Result<Self> {
        if !(cap_velocity > 0.0 && cap_velocity.is_finite()) {
            return Err(ConfigError::InvalidCapVelocity(cap_velocity).into());
        }
        if segments.len() > MAX_PATH_SEGMENTS {
            return Err(ConfigError::TooManySegments {
                count: segments.len(),
                capacity: MAX_PATH_SEGMENTS,
            }
            .into());
        }

        Ok(Self {
            created,
            segments,
            params,
            cap_velocity,
            tuning: PlannerTuning::default(),
            active: None,
            cleared_length: 0.0,
            seed_time: 0.0,
            seed_distance: 0.0,
            observer,
        })
    }

    /// Use custom repair tuning for every rebuild.
    pub fn with_tuning(self, tuning: PlannerTuning) -> Self {
        Self { tuning, ..self }
    }

    /// Index of `edge_id` if it still lies (at least partly) beyond the
    /// cleared length.
    fn uncleared_edge_index(&self, edge_id: u32) -> Option<usize> {
        let mut end = 0.0;
        for (index, segment) in self.segments.iter().enumerate() {
            end += segment.length();
            if segment.id() == edge_id {
                return (end > self.cleared_length + EPSILON).then_some(index);
            }
        }
        None
    }

    /// Check whether `edge_id` is a known segment that has not been cleared.
    pub fn is_uncleared_edge_available(&self, edge_id: u32) -> bool {
        self.uncleared_edge_index(edge_id).is_some()
    }

    /// Extend clearance up to and including `edge_id`.
    ///
    /// Returns `Ok(false)` without touching any state when the edge is
    /// unknown or already cleared, so repeated grants are harmless.
    ///
    /// # Errors
    ///
    /// Constraint and planning errors from the rebuild. The previous profile
    /// stays active when they occur.
    pub fn clearance_granted(&mut self, edge_id: u32, wall_time: f64) -> Result<bool> {
        let Some(edge_index) = self.uncleared_edge_index(edge_id) else {
            warn!("clearance for edge {} rejected", edge_id);
            return Ok(false);
        };

        let elapsed = wall_time - self.created;
        let state = self.status(elapsed);

        // Constraints are relative to the sampled distance.
        let mut constraints = VelocityConstraintsCollection::new();
        let mut segment_start = 0.0;
        for segment in &self.segments[..=edge_index] {
            let segment_end = segment_start + segment.length();
            if segment_end > state.distance + EPSILON {
                let from = segment_start.max(state.distance);
                let max_velocity = segment.max_velocity().min(self.cap_velocity);
                constraints.push(VelocityConstraint::new(
                    from - state.distance,
                    segment_end - from,
                    max_velocity,
                )?)?;
            }
            segment_start = segment_end;
        }

        let input = JointMotionProfileInputSet::new(self.params, state.acceleration, state.velocity, constraints)
            .with_tuning(self.tuning);
        let profile = JointMotionProfile::with_observer(input, &mut self.observer)?;

        debug!(
            "edge {} cleared up to {}, new profile lasts {} s",
            edge_id,
            segment_start,
            profile.total_duration()
        );

        self.active = Some(profile);
        self.seed_time = elapsed;
        self.seed_distance = state.distance;
        self.cleared_length = segment_start;
        Ok(true)
    }

    /// Acceleration, velocity and absolute distance `elapsed` seconds after
    /// `created`.
    pub fn status(&self, elapsed: f64) -> KinematicState {
        match &self.active {
            Some(profile) => {
                let local = profile.status(elapsed - self.seed_time);
                KinematicState::new(
                    local.acceleration,
                    local.velocity,
                    self.seed_distance + local.distance,
                )
            }
            None => KinematicState::REST,
        }
    }

    /// [`status`](Self::status) plus the current node and segment.
    ///
    /// Inside a segment the node is its start node; exactly on a segment
    /// end it is the end node.
    pub fn status_with_location(&self, elapsed: f64) -> VehicleStatus {
        let state = self.status(elapsed);
        if self.active.is_none() {
            return VehicleStatus {
                state,
                node: None,
                segment_index: None,
            };
        }

        let (segment_index, node) = self.locate(state.distance);
        VehicleStatus {
            state,
            node,
            segment_index,
        }
    }

    fn locate(&self, distance: f64) -> (Option<usize>, Option<NodeId>) {
        let mut end = 0.0;
        for (index, segment) in self.segments.iter().enumerate() {
            end += segment.length();
            if fabs(distance - end) < EPSILON {
                return (Some(index), Some(segment.end_node()));
            }
            if distance < end {
                return (Some(index), Some(segment.start_node()));
            }
        }
        match self.segments.last() {
            Some(last) => (Some(self.segments.len() - 1), Some(last.end_node())),
            None => (None, None),
        }
    }

    /// Distance authorized so far. Never decreases.
    #[inline]
    pub fn cleared_length(&self) -> f64 {
        self.cleared_length
    }

    /// Cleared distance still ahead of the vehicle at `elapsed`.
    pub fn remaining_length(&self, elapsed: f64) -> f64 {
        (self.cleared_length - self.status(elapsed).distance).max(0.0)
    }

    /// Duration of the active profile, measured from its own seed time.
    pub fn total_duration(&self) -> f64 {
        self.active.as_ref().map_or(0.0, |p| p.total_duration())
    }

    /// Currently active profile, if any grant was accepted.
    pub fn active_profile(&self) -> Option<&JointMotionProfile> {
        self.active.as_ref()
    }

    /// Wall-clock origin.
    #[inline]
    pub fn created(&self) -> f64 {
        self.created
    }

    /// Global velocity cap.
    #[inline]
    pub fn cap_velocity(&self) -> f64 {
        self.cap_velocity
    }

    /// Path segments in driving order.
    pub fn segments(&self) -> &'a [S] {
        self.segments
    }

    /// Observer receiving rebuild traces.
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Mutable access to the observer.
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }
}
