//! Joint motion profile over an effective velocity envelope.
//!
//! Construction walks the envelope constraint by constraint, classifies each
//! one into a [`Situation`] and places velocity points. A constraint that
//! cannot be honored repairs the envelope and aborts the pass; construction
//! finishes on the first pass that completes without a repair.

use heapless::Vec;
use libm::fabs;

use crate::config::{MotionParameter, PlannerTuning};
use crate::constraint::{
    ConstraintList, StopConstraintCollection, VelocityConstraint, VelocityConstraintsCollection,
};
use crate::error::{ConstraintError, PlanningError, Result};
use crate::math::EPSILON;

use super::observer::{PlanningObserver, Repair};
use super::ramp::{ExtendedRampCalculationResult, KinematicState, RampCalculator};
use super::situation::Situation;

/// Maximum number of velocity points (and ramps) in one profile.
pub const MAX_VELOCITY_POINTS: usize = 256;

/// Velocity point storage.
pub type VelocityPointList = Vec<VelocityPoint, MAX_VELOCITY_POINTS>;

/// Knot of the profile: the state at a distance where one ramp hands over to
/// the next.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VelocityPoint {
    /// Absolute distance.
    pub distance: f64,
    /// Acceleration. Only the initial point may be non-zero.
    pub acceleration: f64,
    /// Velocity.
    pub velocity: f64,
    /// Index of the owning effective constraint; `None` for the initial point.
    pub constraint: Option<usize>,
    /// Standstill time spent at this point before moving on.
    pub dwell: f64,
}

impl VelocityPoint {
    fn cruise(distance: f64, velocity: f64, constraint: usize) -> Self {
        Self {
            distance,
            acceleration: 0.0,
            velocity,
            constraint: Some(constraint),
            dwell: 0.0,
        }
    }

    fn same_state(&self, other: &VelocityPoint) -> bool {
        fabs(self.distance - other.distance) < EPSILON
            && fabs(self.velocity - other.velocity) < EPSILON
            && fabs(self.acceleration - other.acceleration) < EPSILON
    }
}

/// Everything needed to plan one profile.
#[derive(Debug, Clone)]
pub struct JointMotionProfileInputSet {
    params: MotionParameter,
    initial_acceleration: f64,
    initial_velocity: f64,
    constraints: VelocityConstraintsCollection,
    stops: StopConstraintCollection,
    tuning: PlannerTuning,
}

impl JointMotionProfileInputSet {
    /// Input without stops and with default tuning.
    pub fn new(
        params: MotionParameter,
        initial_acceleration: f64,
        initial_velocity: f64,
        constraints: VelocityConstraintsCollection,
    ) -> Self {
        Self {
            params,
            initial_acceleration,
            initial_velocity,
            constraints,
            stops: StopConstraintCollection::new(),
            tuning: PlannerTuning::default(),
        }
    }

    /// Add stop constraints.
    pub fn with_stops(self, stops: StopConstraintCollection) -> Self {
        Self { stops, ..self }
    }

    /// Replace the repair tuning.
    pub fn with_tuning(self, tuning: PlannerTuning) -> Self {
        Self { tuning, ..self }
    }

    /// Motion limits.
    pub fn params(&self) -> &MotionParameter {
        &self.params
    }

    /// Acceleration at distance zero.
    pub fn initial_acceleration(&self) -> f64 {
        self.initial_acceleration
    }

    /// Velocity at distance zero.
    pub fn initial_velocity(&self) -> f64 {
        self.initial_velocity
    }

    /// Raw velocity constraints.
    pub fn constraints(&self) -> &VelocityConstraintsCollection {
        &self.constraints
    }

    /// Stop constraints.
    pub fn stops(&self) -> &StopConstraintCollection {
        &self.stops
    }

    /// Repair tuning.
    pub fn tuning(&self) -> &PlannerTuning {
        &self.tuning
    }
}

/// Outcome of one planning pass that did not fail outright.
enum PassOutcome {
    Complete(VelocityPointList),
    Repaired(Repair),
}

/// Per-construction planning context.
struct Planner<'a> {
    calc: RampCalculator,
    tuning: &'a PlannerTuning,
    stops: &'a StopConstraintCollection,
    initial: VelocityPoint,
}

impl Planner<'_> {
    /// Run one pass over `work`. Repairs mutate `work` and end the pass.
    fn plan_pass(&self, work: &mut ConstraintList) -> Result<PassOutcome> {
        let mut points = VelocityPointList::new();
        push_point(&mut points, self.initial)?;
        let mut current = self.initial;

        for index in 0..work.len() {
            let constraint = work[index];
            let (a, v0, base) = (current.acceleration, current.velocity, current.distance);

            if constraint.is_stop() {
                if v0 > EPSILON || fabs(a) > EPSILON {
                    return Err(PlanningError::Infeasible { index }.into());
                }
                current = VelocityPoint {
                    distance: constraint.start().max(base),
                    acceleration: 0.0,
                    velocity: 0.0,
                    constraint: Some(index),
                    dwell: self.stops.dwell_at(constraint.start()).unwrap_or(0.0),
                };
                push_point(&mut points, current)?;
                continue;
            }

            let v1 = constraint.max_velocity();
            let v2 = work.get(index + 1).map_or(0.0, |next| next.max_velocity());
            let end = constraint.end();
            let available = end - base;
            let situation = Situation::classify(v0, v1, v2);

            let emitted: Vec<VelocityPoint, 3> = match situation {
                Situation::Rise | Situation::HoldThenRise => {
                    let d_up = self.calc.distance_needed(a, v0, v1)?;
                    if !fits(d_up, available, end) {
                        return self.merge_with_previous(work, index).map(PassOutcome::Repaired);
                    }
                    cruise_points(&[((base + d_up).min(end), v1), (end, v1)], index)
                }
                Situation::HoldThenFall => {
                    let d_up = self.calc.distance_needed(a, v0, v1)?;
                    let d_down = self.calc.distance_needed(0.0, v1, v2)?;
                    if !fits(d_up + d_down, available, end) {
                        return self.merge_with_previous(work, index).map(PassOutcome::Repaired);
                    }
                    let up_end = (base + d_up).min(end);
                    cruise_points(&[(up_end, v1), ((end - d_down).max(up_end), v1), (end, v2)], index)
                }
                Situation::PeakExitAboveEntry | Situation::PeakExitBelowEntry | Situation::Fall => {
                    match self.stepped_down_velocity(index == 0, a, v0, v1, v2, available, end)? {
                        Some((peak, d_up, d_down)) => {
                            let up_end = (base + d_up).min(end);
                            cruise_points(
                                &[(up_end, peak), ((end - d_down).max(up_end), peak), (end, v2)],
                                index,
                            )
                        }
                        None if situation == Situation::PeakExitAboveEntry => {
                            return self.merge_with_next(work, index).map(PassOutcome::Repaired);
                        }
                        None => {
                            return self.merge_with_previous(work, index).map(PassOutcome::Repaired);
                        }
                    }
                }
                Situation::DipExitBelowEntry | Situation::DipExitAboveEntry => {
                    return Err(PlanningError::ImpossibleSituation {
                        index,
                        situation: situation.number(),
                    }
                    .into());
                }
            };

            for point in emitted {
                push_point(&mut points, point)?;
                current = point;
            }
        }

        Ok(PassOutcome::Complete(points))
    }

    /// Highest velocity, stepping down from `v1`, that can be reached from
    /// `v0` and left again for `v2` within `available`.
    ///
    /// Entering the first constraint with a negative acceleration also tries
    /// velocities below the relaxed one, down to `v2` or further, since the
    /// vehicle may already be braking.
    ///
    /// Returns the velocity with its acceleration and braking distances.
    #[allow(clippy::too_many_arguments)]
    fn stepped_down_velocity(
        &self,
        first: bool,
        a: f64,
        v0: f64,
        v1: f64,
        v2: f64,
        available: f64,
        end: f64,
    ) -> Result<Option<(f64, f64, f64)>> {
        // `preferred` is where a plain search would stop, `floor` where the
        // extended search for a braking vehicle stops.
        let (preferred, floor) = if v1 < v0 {
            (v2.min(v1), v2.min(v1))
        } else if first && a < 0.0 {
            let relaxed = self.calc.relaxed_velocity(a, v0);
            (v0.min(relaxed).max(v2).min(v1), relaxed.max(0.0).min(v2).min(v1))
        } else {
            (v0.max(v2).min(v1), v0.max(v2).min(v1))
        };

        let mut candidate = v1;
        loop {
            let d_up = self.calc.distance_needed(a, v0, candidate)?;
            let d_down = self.calc.distance_needed(0.0, candidate, v2)?;
            let needed = d_up + d_down;
            // A zero peak may not hold standstill over a positive distance.
            let leaves_zero_hold = candidate <= EPSILON && !fits(available, needed, end);
            if fits(needed, available, end) && !leaves_zero_hold {
                return Ok(Some((candidate, d_up, d_down)));
            }
            if candidate <= floor {
                return Ok(None);
            }
            let mut next = candidate - self.tuning.velocity_decrement;
            // Never step over the preferred stop or an exit at exactly `v2`.
            for checkpoint in [preferred, v2] {
                if candidate > checkpoint && next < checkpoint {
                    next = checkpoint;
                    break;
                }
            }
            candidate = next.max(floor);
        }
    }

    /// Absorb constraint `index` into its successor, which keeps its cap and
    /// grows backward. Falls back to the predecessor when there is no usable
    /// successor.
    fn merge_with_next(&self, work: &mut ConstraintList, index: usize) -> Result<Repair> {
        match work.get(index + 1).copied() {
            Some(next) if !next.is_stop() => {
                let current = work[index];
                let merged = VelocityConstraint::new(
                    current.start(),
                    current.length() + next.length(),
                    next.max_velocity(),
                )?;
                work.remove(index);
                work[index] = merged;
                Ok(Repair::MergedWithNext { index })
            }
            _ => self.merge_with_previous(work, index),
        }
    }

    /// Give constraint `index` more room from its predecessor.
    ///
    /// A faster predecessor loses `distance_decrement` at the shared
    /// boundary. A predecessor slower by more than one velocity step lowers
    /// the current cap instead. Anything else is absorbed into the
    /// predecessor at the lower of both caps.
    fn merge_with_previous(&self, work: &mut ConstraintList, index: usize) -> Result<Repair> {
        let current = work[index];
        let previous = match index.checked_sub(1).map(|p| work[p]) {
            Some(previous) if !previous.is_stop() => previous,
            _ => return self.lower_cap(work, index),
        };

        let step = self.tuning.distance_decrement;
        if previous.max_velocity() > current.max_velocity() + EPSILON && previous.length() > step {
            let start = current.start() - step;
            work[index - 1] = previous.with_length(previous.length() - step)?;
            work[index] = VelocityConstraint::new(start, current.length() + step, current.max_velocity())?;
            return Ok(Repair::ShiftedBoundary { index, start });
        }

        if previous.max_velocity() < current.max_velocity() - self.tuning.velocity_decrement {
            return self.lower_cap(work, index);
        }

        work[index - 1] = VelocityConstraint::new(
            previous.start(),
            previous.length() + current.length(),
            previous.max_velocity().min(current.max_velocity()),
        )?;
        work.remove(index);
        Ok(Repair::MergedWithPrevious { index })
    }

    fn lower_cap(&self, work: &mut ConstraintList, index: usize) -> Result<Repair> {
        let current = work[index];
        let max_velocity = current.max_velocity() - self.tuning.velocity_decrement;
        if max_velocity <= EPSILON {
            return Err(PlanningError::Infeasible { index }.into());
        }
        work[index] = current.with_max_velocity(max_velocity)?;
        Ok(Repair::LoweredCap { index, max_velocity })
    }

    /// Remove local peaks that can neither be reached nor bridged within
    /// their own length, highest first. Each one is absorbed into its
    /// predecessor.
    fn close_high_tight_gaps<O>(&self, work: &mut ConstraintList, observer: &mut O) -> Result<()>
    where
        O: PlanningObserver + ?Sized,
    {
        loop {
            let mut highest: Option<(usize, f64)> = None;
            for index in 1..work.len().saturating_sub(1) {
                let (previous, current, next) = (work[index - 1], work[index], work[index + 1]);
                if previous.is_stop() || next.is_stop() {
                    continue;
                }
                let (v0, v1, v2) = (previous.max_velocity(), current.max_velocity(), next.max_velocity());
                if v1 <= v0.max(v2) + EPSILON {
                    continue;
                }
                let needed = self.calc.distance_needed(0.0, v0, v1)? + self.calc.distance_needed(0.0, v1, v2)?;
                if needed <= current.length() + EPSILON
                    || self.calc.is_reachable(v0, v2, current.length())?
                    || self.calc.is_reachable(v2, v0, current.length())?
                {
                    continue;
                }
                if highest.map_or(true, |(_, v)| v1 > v) {
                    highest = Some((index, v1));
                }
            }

            let Some((index, _)) = highest else {
                return Ok(());
            };
            let (previous, current) = (work[index - 1], work[index]);
            work[index - 1] = previous.with_length(previous.length() + current.length())?;
            work.remove(index);

            let repair = Repair::ClosedPeak { index };
            trace!("closed unreachable peak at constraint {}", index);
            observer.on_repair(0, &repair);
        }
    }
}

/// Check whether `needed` fits into `available`, with a tolerance that grows
/// with the absolute distance `end`.
fn fits(needed: f64, available: f64, end: f64) -> bool {
    needed <= available + EPSILON + 1e-12 * fabs(end)
}

fn cruise_points(targets: &[(f64, f64)], constraint: usize) -> Vec<VelocityPoint, 3> {
    targets
        .iter()
        .map(|&(distance, velocity)| VelocityPoint::cruise(distance, velocity, constraint))
        .collect()
}

fn push_point(points: &mut VelocityPointList, point: VelocityPoint) -> Result<()> {
    points.push(point).map_err(|_| {
        ConstraintError::CapacityExceeded {
            capacity: MAX_VELOCITY_POINTS,
        }
        .into()
    })
}

fn log_repair(iteration: usize, repair: &Repair) {
    match *repair {
        Repair::MergedWithNext { index } => {
            trace!("pass {}: merged constraint {} into next", iteration, index)
        }
        Repair::MergedWithPrevious { index } => {
            trace!("pass {}: merged constraint {} into previous", iteration, index)
        }
        Repair::ShiftedBoundary { index, start } => {
            trace!("pass {}: constraint {} now starts at {}", iteration, index, start)
        }
        Repair::LoweredCap { index, max_velocity } => {
            trace!("pass {}: constraint {} capped at {}", iteration, index, max_velocity)
        }
        Repair::ClosedPeak { index } => {
            trace!("pass {}: closed peak at constraint {}", iteration, index)
        }
    }
}

/// Continuous jerk-limited velocity profile over a sequence of constraints.
///
/// Immutable once constructed. Time zero is the initial state at distance
/// zero; the profile ends at standstill at the end of the last constraint.
#[derive(Debug, Clone)]
pub struct JointMotionProfile {
    input: JointMotionProfileInputSet,
    effective: ConstraintList,
    points: VelocityPointList,
    ramps: Vec<ExtendedRampCalculationResult, MAX_VELOCITY_POINTS>,
    cumulative_times: Vec<f64, MAX_VELOCITY_POINTS>,
    total_duration: f64,
    repair_iterations: usize,
}

impl JointMotionProfile {
    /// Plan a profile.
    ///
    /// # Errors
    ///
    /// Planning errors are fatal: an impossible situation, a non-finite ramp
    /// duration, an unrepairable constraint or too many repair passes.
    pub fn new(input: JointMotionProfileInputSet) -> Result<Self> {
        Self::with_observer(input, &mut ())
    }

    /// Plan a profile, reporting every pass and repair to `observer`.
    pub fn with_observer<O>(input: JointMotionProfileInputSet, observer: &mut O) -> Result<Self>
    where
        O: PlanningObserver + ?Sized,
    {
        let v0 = input.initial_velocity;
        let a0 = input.initial_acceleration;
        if !(v0 >= 0.0) {
            return Err(ConstraintError::NegativeVelocity(v0).into());
        }

        let calc = RampCalculator::new(input.params);
        let mut work = input.constraints.effective_constraints()?;
        if let Some(first) = work.first_mut() {
            if first.start() > 0.0 {
                *first = VelocityConstraint::new(0.0, first.end(), first.max_velocity())?;
            }
        }
        input.stops.split(&mut work)?;

        if work.is_empty() && (v0 > EPSILON || fabs(a0) > EPSILON) {
            return Err(PlanningError::Infeasible { index: 0 }.into());
        }

        let planner = Planner {
            calc,
            tuning: &input.tuning,
            stops: &input.stops,
            initial: VelocityPoint {
                distance: 0.0,
                acceleration: a0,
                velocity: v0,
                constraint: None,
                dwell: 0.0,
            },
        };

        if input.tuning.close_high_tight_gaps {
            planner.close_high_tight_gaps(&mut work, observer)?;
        }

        let mut iteration = 0;
        let raw_points = loop {
            if iteration >= input.tuning.max_repair_iterations {
                return Err(PlanningError::RepairLimitExceeded { iterations: iteration }.into());
            }
            observer.on_pass(iteration, &work);
            match planner.plan_pass(&mut work)? {
                PassOutcome::Complete(points) => break points,
                PassOutcome::Repaired(repair) => {
                    log_repair(iteration, &repair);
                    observer.on_repair(iteration, &repair);
                }
            }
            iteration += 1;
        };

        let mut points = VelocityPointList::new();
        for point in raw_points {
            let duplicate = point.dwell <= 0.0 && points.last().map_or(false, |last| last.same_state(&point));
            if !duplicate {
                push_point(&mut points, point)?;
            }
        }

        let mut ramps = Vec::new();
        let mut cumulative_times = Vec::new();
        let mut elapsed = 0.0;
        for (index, pair) in points.windows(2).enumerate() {
            let ramp = Self::ramp_between(&calc, index, &pair[0], &pair[1])?;
            if !ramp.duration().is_finite() {
                return Err(PlanningError::NonFiniteDuration { index }.into());
            }
            let ramp = ramp.positioned(pair[0].distance, elapsed);
            elapsed += ramp.duration();
            // Both lists hold one entry per point pair, so they fit whenever
            // `points` does.
            let _ = ramps.push(ramp);
            let _ = cumulative_times.push(elapsed);
        }

        debug!(
            "planned profile: {} points, {} repairs, {} s",
            points.len(),
            iteration,
            elapsed
        );
        observer.on_complete(&points);

        Ok(Self {
            input,
            effective: work,
            points,
            ramps,
            cumulative_times,
            total_duration: elapsed,
            repair_iterations: iteration,
        })
    }

    fn ramp_between(
        calc: &RampCalculator,
        index: usize,
        from: &VelocityPoint,
        to: &VelocityPoint,
    ) -> Result<ExtendedRampCalculationResult> {
        let span = to.distance - from.distance;

        if to.dwell > 0.0 && from.velocity <= EPSILON && to.velocity <= EPSILON {
            return Ok(ExtendedRampCalculationResult::hold(0.0, 0.0, to.dwell));
        }

        if fabs(to.velocity - from.velocity) < EPSILON && fabs(from.acceleration) < EPSILON {
            if from.velocity <= EPSILON {
                if span > EPSILON {
                    return Err(PlanningError::ZeroVelocityHold { index }.into());
                }
                return Ok(ExtendedRampCalculationResult::hold(0.0, 0.0, 0.0));
            }
            return Ok(ExtendedRampCalculationResult::hold(
                from.velocity,
                span,
                span / from.velocity,
            ));
        }

        let ramp = calc.calculate(from.acceleration, from.velocity, to.velocity)?;
        debug_assert!(
            fabs(ramp.length() - span) <= 1e-6 * (1.0 + fabs(span)),
            "ramp {} covers {} but points are {} apart",
            index,
            ramp.length(),
            span
        );
        Ok(ramp)
    }

    /// State `t` seconds after the start, clamped to `[0, total_duration]`.
    pub fn status(&self, t: f64) -> KinematicState {
        let t = t.clamp(0.0, self.total_duration);
        let index = self
            .cumulative_times
            .iter()
            .position(|&end| end > t)
            .unwrap_or(self.ramps.len().saturating_sub(1));

        match self.ramps.get(index) {
            Some(ramp) => {
                let local = ramp.state_at(t - ramp.start_time());
                KinematicState::new(
                    local.acceleration,
                    local.velocity,
                    ramp.start_distance() + local.distance,
                )
            }
            None => KinematicState::new(
                self.input.initial_acceleration,
                self.input.initial_velocity,
                0.0,
            ),
        }
    }

    /// Time at which `distance` is first reached.
    pub fn time_at_distance(&self, distance: f64) -> Result<f64> {
        let mut cursor = 0;
        self.time_from(distance, &mut cursor)
    }

    /// Times at which each of `distances` is reached.
    ///
    /// Distances are expected in ascending order; the lookup walks the ramps
    /// forward and only restarts when a distance goes backward.
    pub fn calculate_timestamps<'a>(&'a self, distances: &'a [f64]) -> Timestamps<'a> {
        Timestamps {
            profile: self,
            distances: distances.iter(),
            cursor: 0,
        }
    }

    fn time_from(&self, distance: f64, cursor: &mut usize) -> Result<f64> {
        let d = distance.clamp(0.0, self.total_length());
        if self.ramps.get(*cursor).map_or(false, |r| d < r.start_distance()) {
            *cursor = 0;
        }
        while let Some(ramp) = self.ramps.get(*cursor) {
            if d <= ramp.start_distance() + ramp.length() || *cursor + 1 == self.ramps.len() {
                return Ok(ramp.start_time() + ramp.time_at_distance(d - ramp.start_distance())?);
            }
            *cursor += 1;
        }
        Ok(0.0)
    }

    /// Time from the initial state to standstill.
    #[inline]
    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    /// Distance from the initial state to standstill.
    pub fn total_length(&self) -> f64 {
        self.points.last().map_or(0.0, |p| p.distance)
    }

    /// Knots of the profile.
    pub fn velocity_points(&self) -> &[VelocityPoint] {
        &self.points
    }

    /// One ramp per consecutive pair of knots.
    pub fn ramps(&self) -> &[ExtendedRampCalculationResult] {
        &self.ramps
    }

    /// End time of each ramp.
    pub fn cumulative_times(&self) -> &[f64] {
        &self.cumulative_times
    }

    /// Envelope after repair; knots refer to it by index.
    pub fn effective_constraints(&self) -> &[VelocityConstraint] {
        &self.effective
    }

    /// Number of repairs needed before a pass succeeded.
    pub fn repair_iterations(&self) -> usize {
        self.repair_iterations
    }

    /// Input the profile was planned from.
    pub fn input(&self) -> &JointMotionProfileInputSet {
        &self.input
    }
}

/// Iterator returned by [`JointMotionProfile::calculate_timestamps`].
#[derive(Debug, Clone)]
pub struct Timestamps<'a> {
    profile: &'a JointMotionProfile,
    distances: core::slice::Iter<'a, f64>,
    cursor: usize,
}

impl Iterator for Timestamps<'_> {
    type Item = Result<f64>;

    fn next(&mut self) -> Option<Self::Item> {
        let distance = *self.distances.next()?;
        Some(self.profile.time_from(distance, &mut self.cursor))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.distances.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::StopConstraint;
    use crate::error::Error;

    fn params() -> MotionParameter {
        MotionParameter::symmetric(2000.0, 500.0).unwrap()
    }

    fn collection(parts: &[(f64, f64, f64)]) -> VelocityConstraintsCollection {
        let mut collection = VelocityConstraintsCollection::new();
        for &(start, length, v) in parts {
            collection.push(VelocityConstraint::new(start, length, v).unwrap()).unwrap();
        }
        collection
    }

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {} got {} (tol {})",
            expected,
            actual,
            tol
        );
    }

    /// Sample the profile and check the state never jumps.
    fn assert_continuous(profile: &JointMotionProfile, v_max: f64) {
        let dt = 1e-3;
        let steps = (profile.total_duration() / dt) as usize + 2;
        let mut previous = profile.status(0.0);
        for k in 1..=steps {
            let state = profile.status(k as f64 * dt);
            assert!((state.acceleration - previous.acceleration).abs() <= 2000.0 * dt + 1e-6);
            assert!((state.velocity - previous.velocity).abs() <= 500.0 * dt + 1e-6);
            assert!((state.distance - previous.distance).abs() <= v_max * dt + 1e-6);
            assert!(state.velocity >= -1e-6);
            previous = state;
        }
    }

    #[derive(Default)]
    struct Recorder {
        passes: usize,
        repairs: std::vec::Vec<Repair>,
        completed: usize,
    }

    impl PlanningObserver for Recorder {
        fn on_pass(&mut self, _iteration: usize, _constraints: &[VelocityConstraint]) {
            self.passes += 1;
        }

        fn on_repair(&mut self, _iteration: usize, repair: &Repair) {
            self.repairs.push(*repair);
        }

        fn on_complete(&mut self, points: &[VelocityPoint]) {
            self.completed = points.len();
        }
    }

    #[test]
    fn test_single_constraint_steps_peak_down() {
        let input = JointMotionProfileInputSet::new(params(), 0.0, 0.0, collection(&[(0.0, 1000.0, 800.0)]));
        let profile = JointMotionProfile::new(input).unwrap();

        let points = profile.velocity_points();
        assert_eq!(points.len(), 4);
        // 650 needs 1007.5 to reach and leave, 645 needs 993.3.
        assert_eq!(points[1].velocity, 645.0);
        assert_close(points[1].distance, 496.65, 1e-9);
        assert_close(points[2].distance, 1000.0 - 496.65, 1e-9);
        assert_eq!(points[3].velocity, 0.0);
        assert_eq!(profile.repair_iterations(), 0);

        assert_close(profile.total_length(), 1000.0, 1e-12);
        assert_close(profile.total_duration(), 3.08 + 6.7 / 645.0, 1e-9);
        assert_continuous(&profile, 800.0);
    }

    #[test]
    fn test_start_and_end_states() {
        let input = JointMotionProfileInputSet::new(params(), 200.0, 100.0, collection(&[(0.0, 2000.0, 500.0)]));
        let profile = JointMotionProfile::new(input).unwrap();

        assert_eq!(profile.status(0.0), KinematicState::new(200.0, 100.0, 0.0));
        assert_eq!(profile.status(-1.0), KinematicState::new(200.0, 100.0, 0.0));

        let end = profile.status(profile.total_duration());
        assert_close(end.acceleration, 0.0, 1e-6);
        assert_close(end.velocity, 0.0, 1e-6);
        assert_close(end.distance, 2000.0, 1e-6);
        assert_eq!(profile.status(profile.total_duration() + 5.0), end);
        assert_continuous(&profile, 500.0);
    }

    #[test]
    fn test_envelope_respected_across_step_down() {
        let input = JointMotionProfileInputSet::new(
            params(),
            0.0,
            0.0,
            collection(&[(0.0, 500.0, 100.0), (500.0, 1000.0, 50.0)]),
        );
        let profile = JointMotionProfile::new(input).unwrap();

        let steps = (profile.total_duration() / 1e-3) as usize;
        for k in 0..=steps {
            let state = profile.status(k as f64 * 1e-3);
            let cap = if state.distance < 500.0 { 100.0 } else { 50.0 };
            assert!(state.velocity <= cap + 1e-6, "{:?}", state);
        }
        assert_close(profile.total_length(), 1500.0, 1e-9);
        assert_continuous(&profile, 100.0);
    }

    #[test]
    fn test_short_brake_shifts_boundary() {
        // Braking 300 -> 0 needs 127.5, the last constraint only has 2.
        let input = JointMotionProfileInputSet::new(
            params(),
            0.0,
            0.0,
            collection(&[(0.0, 1000.0, 400.0), (1000.0, 2.0, 300.0)]),
        );
        let mut recorder = Recorder::default();
        let profile = JointMotionProfile::with_observer(input, &mut recorder).unwrap();

        assert_eq!(profile.repair_iterations(), 13);
        assert_eq!(recorder.passes, 14);
        assert_eq!(recorder.repairs.len(), 13);
        assert!(recorder
            .repairs
            .iter()
            .all(|r| matches!(r, Repair::ShiftedBoundary { index: 1, .. })));
        assert_eq!(recorder.completed, profile.velocity_points().len());

        let effective = profile.effective_constraints();
        assert_eq!(effective.len(), 2);
        assert_eq!(effective[1].start(), 870.0);
        assert_eq!(effective[1].length(), 132.0);
        assert_close(profile.total_length(), 1002.0, 1e-9);
    }

    #[test]
    fn test_repair_limit() {
        let tuning = PlannerTuning {
            max_repair_iterations: 3,
            ..PlannerTuning::default()
        };
        let input = JointMotionProfileInputSet::new(
            params(),
            0.0,
            0.0,
            collection(&[(0.0, 1000.0, 400.0), (1000.0, 2.0, 300.0)]),
        )
        .with_tuning(tuning);

        assert_eq!(
            JointMotionProfile::new(input).unwrap_err(),
            Error::Planning(PlanningError::RepairLimitExceeded { iterations: 3 })
        );
    }

    #[test]
    fn test_stop_dwell() {
        let mut stops = StopConstraintCollection::new();
        stops.push(StopConstraint::new(100.0, 2.0).unwrap()).unwrap();
        let input = JointMotionProfileInputSet::new(params(), 0.0, 0.0, collection(&[(0.0, 200.0, 50.0)]))
            .with_stops(stops);
        let profile = JointMotionProfile::new(input).unwrap();

        // Ramps: accelerate, cruise, brake, dwell, ...
        let arrival = profile.cumulative_times()[2];
        assert_close(profile.time_at_distance(100.0).unwrap(), arrival, 1e-4);
        let halfway = profile.status(arrival + 1.0);
        assert_close(halfway.velocity, 0.0, 1e-9);
        assert_close(halfway.distance, 100.0, 1e-9);

        // Symmetric halves around a two second standstill.
        assert_close(profile.total_duration(), 2.0 * arrival + 2.0, 1e-9);
        assert!(profile.velocity_points().iter().any(|p| p.dwell == 2.0));
        assert_continuous(&profile, 50.0);
    }

    #[test]
    fn test_timestamps_follow_distance() {
        let input = JointMotionProfileInputSet::new(
            params(),
            0.0,
            0.0,
            collection(&[(0.0, 300.0, 200.0), (300.0, 400.0, 120.0)]),
        );
        let profile = JointMotionProfile::new(input).unwrap();

        let distances = [0.0, 1.0, 50.0, 150.0, 299.0, 300.0, 450.0, 699.0, 700.0];
        let times: std::vec::Vec<f64> = profile
            .calculate_timestamps(&distances)
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(times.len(), distances.len());
        assert_eq!(times[0], 0.0);
        assert!(times.windows(2).all(|w| w[1] >= w[0]));
        for (&d, &t) in distances.iter().zip(&times) {
            assert_close(profile.status(t).distance, d, 1e-6);
            assert_close(profile.time_at_distance(d).unwrap(), t, 1e-9);
        }
        // Inverting near standstill is a triple root, so the end is coarse.
        assert_close(times[8], profile.total_duration(), 1e-3);
    }

    #[test]
    fn test_empty_constraints() {
        let rest = JointMotionProfileInputSet::new(params(), 0.0, 0.0, VelocityConstraintsCollection::new());
        let profile = JointMotionProfile::new(rest).unwrap();
        assert_eq!(profile.total_duration(), 0.0);
        assert_eq!(profile.status(3.0), KinematicState::REST);

        let moving = JointMotionProfileInputSet::new(params(), 0.0, 10.0, VelocityConstraintsCollection::new());
        assert!(JointMotionProfile::new(moving).is_err());
    }

    #[test]
    fn test_negative_initial_velocity_rejected() {
        let input = JointMotionProfileInputSet::new(params(), 0.0, -1.0, collection(&[(0.0, 10.0, 5.0)]));
        assert_eq!(
            JointMotionProfile::new(input).unwrap_err(),
            Error::Constraint(ConstraintError::NegativeVelocity(-1.0))
        );
    }
}
