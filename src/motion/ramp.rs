//! Single jerk-limited velocity transition (S-curve ramp).
//!
//! A ramp has up to three phases: jerk toward an extreme acceleration, hold
//! that acceleration (the flat phase, possibly empty) and jerk back to zero
//! acceleration. Every ramp ends with zero acceleration.

use libm::fabs;

use crate::config::MotionParameter;
use crate::error::{PlanningError, Result};
use crate::math::{solve_cubic_in_range, EquationSolver, QuadraticRoots, EPSILON};

/// Relative velocity tolerance within which a target counts as the velocity
/// reached by simply releasing the initial acceleration.
const RELAX_TOLERANCE: f64 = 1e-10;

/// Kind of velocity change a ramp performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RampDirection {
    /// Net velocity increase.
    Accelerate,
    /// Net velocity decrease.
    Decelerate,
    /// No velocity change; the caller treats it as a plain hold.
    Constant,
}

/// Instantaneous acceleration, velocity and distance.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KinematicState {
    /// Acceleration.
    pub acceleration: f64,
    /// Velocity.
    pub velocity: f64,
    /// Distance traveled.
    pub distance: f64,
}

impl KinematicState {
    /// Create a new state.
    #[inline]
    pub const fn new(acceleration: f64, velocity: f64, distance: f64) -> Self {
        Self {
            acceleration,
            velocity,
            distance,
        }
    }

    /// Vehicle at rest at the origin.
    pub const REST: Self = Self::new(0.0, 0.0, 0.0);
}

/// Result of one ramp calculation. Immutable once computed.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ExtendedRampCalculationResult {
    direction: RampDirection,
    v_from: f64,
    v_to: f64,
    a_from: f64,
    jerk_up: f64,
    jerk_down: f64,
    phase_durations: [f64; 3],
    phase_lengths: [f64; 3],
    length: f64,
    duration: f64,
    start_distance: f64,
    start_time: f64,
}

impl ExtendedRampCalculationResult {
    fn constant(a_from: f64, v_from: f64) -> Self {
        Self {
            direction: RampDirection::Constant,
            v_from,
            v_to: v_from,
            a_from,
            jerk_up: 0.0,
            jerk_down: 0.0,
            phase_durations: [0.0; 3],
            phase_lengths: [0.0; 3],
            length: 0.0,
            duration: 0.0,
            start_distance: 0.0,
            start_time: 0.0,
        }
    }

    /// Constant-velocity hold over `length` lasting `duration`.
    ///
    /// Modeled as a pure phase-two segment with zero acceleration, which
    /// also covers zero-length dwells at standstill.
    pub(crate) fn hold(velocity: f64, length: f64, duration: f64) -> Self {
        Self {
            phase_durations: [0.0, duration, 0.0],
            phase_lengths: [0.0, length, 0.0],
            length,
            duration,
            ..Self::constant(0.0, velocity)
        }
    }

    /// Same ramp anchored at an absolute distance and time.
    pub fn positioned(self, start_distance: f64, start_time: f64) -> Self {
        Self {
            start_distance,
            start_time,
            ..self
        }
    }

    /// Direction of the velocity change.
    #[inline]
    pub const fn direction(&self) -> RampDirection {
        self.direction
    }

    /// Initial velocity.
    #[inline]
    pub const fn v_from(&self) -> f64 {
        self.v_from
    }

    /// Target velocity.
    #[inline]
    pub const fn v_to(&self) -> f64 {
        self.v_to
    }

    /// Initial acceleration.
    #[inline]
    pub const fn a_from(&self) -> f64 {
        self.a_from
    }

    /// Jerk of phase one.
    #[inline]
    pub const fn jerk_up(&self) -> f64 {
        self.jerk_up
    }

    /// Jerk of phase three.
    #[inline]
    pub const fn jerk_down(&self) -> f64 {
        self.jerk_down
    }

    /// Durations of the three phases.
    #[inline]
    pub const fn phase_durations(&self) -> [f64; 3] {
        self.phase_durations
    }

    /// Distances covered in the three phases.
    #[inline]
    pub const fn phase_lengths(&self) -> [f64; 3] {
        self.phase_lengths
    }

    /// Total distance.
    #[inline]
    pub const fn length(&self) -> f64 {
        self.length
    }

    /// Total duration.
    #[inline]
    pub const fn duration(&self) -> f64 {
        self.duration
    }

    /// Absolute distance at which the ramp starts.
    #[inline]
    pub const fn start_distance(&self) -> f64 {
        self.start_distance
    }

    /// Absolute time at which the ramp starts.
    #[inline]
    pub const fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Acceleration held during the flat phase (peak of the ramp).
    #[inline]
    pub fn peak_acceleration(&self) -> f64 {
        self.a_from + self.jerk_up * self.phase_durations[0]
    }

    /// Boundary states at the end of phase one and phase two, relative to the
    /// ramp start.
    fn boundaries(&self) -> (KinematicState, KinematicState) {
        let [t1, t2, _] = self.phase_durations;
        let [s1, s2, _] = self.phase_lengths;
        let a1 = self.peak_acceleration();
        let v1 = self.v_from + self.a_from * t1 + 0.5 * self.jerk_up * t1 * t1;
        let v2 = v1 + a1 * t2;
        (
            KinematicState::new(a1, v1, s1),
            KinematicState::new(a1, v2, s1 + s2),
        )
    }

    /// State `t` seconds after the ramp start, relative to the ramp start.
    ///
    /// `t` is clamped to `[0, duration]`.
    pub fn state_at(&self, t: f64) -> KinematicState {
        let t = t.clamp(0.0, self.duration);
        let [t1, t2, _] = self.phase_durations;

        if t <= t1 {
            let (a0, v0, j) = (self.a_from, self.v_from, self.jerk_up);
            return KinematicState::new(
                a0 + j * t,
                v0 + a0 * t + 0.5 * j * t * t,
                v0 * t + 0.5 * a0 * t * t + j * t * t * t / 6.0,
            );
        }

        let (end1, end2) = self.boundaries();
        if t <= t1 + t2 {
            let tau = t - t1;
            return KinematicState::new(
                end1.acceleration,
                end1.velocity + end1.acceleration * tau,
                end1.distance + end1.velocity * tau + 0.5 * end1.acceleration * tau * tau,
            );
        }

        let tau = t - t1 - t2;
        let (a, v, j) = (end2.acceleration, end2.velocity, self.jerk_down);
        KinematicState::new(
            a + j * tau,
            v + a * tau + 0.5 * j * tau * tau,
            end2.distance + v * tau + 0.5 * a * tau * tau + j * tau * tau * tau / 6.0,
        )
    }

    /// Time after the ramp start at which `distance` (relative) is reached.
    ///
    /// Phases one and three are cubic in time, phase two is quadratic.
    pub fn time_at_distance(&self, distance: f64) -> Result<f64> {
        if self.length <= 0.0 {
            return Ok(0.0);
        }
        let s = distance.clamp(0.0, self.length);
        let [t1, t2, t3] = self.phase_durations;
        let [s1, s2, _] = self.phase_lengths;

        if s <= s1 {
            let (a0, v0, j) = (self.a_from, self.v_from, self.jerk_up);
            return solve_cubic_in_range(j / 6.0, a0 / 2.0, v0, -s, 0.0, t1);
        }

        let (end1, end2) = self.boundaries();
        if s <= s1 + s2 {
            let tau = solve_cubic_in_range(
                0.0,
                end1.acceleration / 2.0,
                end1.velocity,
                -(s - s1),
                0.0,
                t2,
            )?;
            return Ok(t1 + tau);
        }

        let tau = solve_cubic_in_range(
            self.jerk_down / 6.0,
            end2.acceleration / 2.0,
            end2.velocity,
            -(s - s1 - s2),
            0.0,
            t3,
        )?;
        Ok(t1 + t2 + tau)
    }
}

/// Computes minimal jerk-limited transitions for one set of motion limits.
#[derive(Debug, Clone, Copy)]
pub struct RampCalculator {
    params: MotionParameter,
}

impl RampCalculator {
    /// Create a calculator for the given limits.
    pub const fn new(params: MotionParameter) -> Self {
        Self { params }
    }

    /// Limits used by this calculator.
    pub const fn params(&self) -> &MotionParameter {
        &self.params
    }

    /// Compute the ramp from `(a_from, v_from)` to `v_to` with zero final
    /// acceleration.
    ///
    /// When the initial acceleration alone would carry the velocity past the
    /// target, the ramp inverts: phase one jerks toward the opposite
    /// acceleration before settling.
    pub fn calculate(&self, a_from: f64, v_from: f64, v_to: f64) -> Result<ExtendedRampCalculationResult> {
        let dv = v_to - v_from;
        if fabs(dv) < EPSILON && fabs(a_from) < EPSILON {
            return Ok(ExtendedRampCalculationResult::constant(a_from, v_from));
        }

        let j_pos = self.params.positive_jerk();
        let j_neg = self.params.negative_jerk();
        let relaxed = self.relaxed_velocity(a_from, v_from);
        let rising = v_to >= relaxed;

        let direction = if dv > EPSILON {
            RampDirection::Accelerate
        } else if dv < -EPSILON || !rising {
            RampDirection::Decelerate
        } else {
            RampDirection::Accelerate
        };

        let only_relaxes = fabs(a_from) >= EPSILON && fabs(v_to - relaxed) <= RELAX_TOLERANCE * (1.0 + fabs(v_to));
        let (j1, j3, t1, t2, t3) = if only_relaxes {
            // Releasing the initial acceleration lands on the target. The
            // general solution degenerates into a double root here.
            let (j1, j3) = if a_from > 0.0 { (j_pos, j_neg) } else { (j_neg, j_pos) };
            (j1, j3, 0.0, 0.0, -a_from / j3)
        } else {
            let (a_ext, j1, j3) = if rising {
                (self.params.max_acceleration(), j_pos, j_neg)
            } else {
                (self.params.max_deceleration(), j_neg, j_pos)
            };

            // Velocity change when the extreme acceleration is reached and
            // immediately released.
            let t1_full = ((a_ext - a_from) / j1).max(0.0);
            let a1_full = a_from + j1 * t1_full;
            let dv_full = a_from * t1_full + 0.5 * j1 * t1_full * t1_full - a1_full * a1_full / (2.0 * j3);

            let needs_flat = if rising { dv_full <= dv } else { dv_full >= dv };
            let (t1, t2, t3) = if needs_flat {
                (t1_full, (dv - dv_full) / a1_full, -a1_full / j3)
            } else {
                self.solve_peak(a_from, v_from, v_to, j1, j3)?
            };
            (j1, j3, t1, t2, t3)
        };

        let a1 = a_from + j1 * t1;
        let v1 = v_from + a_from * t1 + 0.5 * j1 * t1 * t1;
        let s1 = v_from * t1 + 0.5 * a_from * t1 * t1 + j1 * t1 * t1 * t1 / 6.0;
        let v2 = v1 + a1 * t2;
        let s2 = v1 * t2 + 0.5 * a1 * t2 * t2;
        let s3 = v2 * t3 + 0.5 * a1 * t3 * t3 + j3 * t3 * t3 * t3 / 6.0;

        Ok(ExtendedRampCalculationResult {
            direction,
            v_from,
            v_to,
            a_from,
            jerk_up: j1,
            jerk_down: j3,
            phase_durations: [t1, t2, t3],
            phase_lengths: [s1, s2, s3],
            length: s1 + s2 + s3,
            duration: t1 + t2 + t3,
            start_distance: 0.0,
            start_time: 0.0,
        })
    }

    /// Velocity reached by bringing `a_from` straight to zero acceleration.
    pub fn relaxed_velocity(&self, a_from: f64, v_from: f64) -> f64 {
        let jerk = if a_from > 0.0 {
            self.params.negative_jerk()
        } else {
            self.params.positive_jerk()
        };
        v_from - a_from * a_from / (2.0 * jerk)
    }

    /// Phase durations when the extreme acceleration is never reached.
    ///
    /// Solves `dv = a0·t1 + j1·t1²/2 − (a0 + j1·t1)²/(2·j3)` for `t1`, with
    /// `t3 = (−j1·t1 − a0)/j3`.
    fn solve_peak(&self, a0: f64, v0: f64, v_to: f64, j1: f64, j3: f64) -> Result<(f64, f64, f64)> {
        let dv = v_to - v0;
        let a = 0.5 * j1 - j1 * j1 / (2.0 * j3);
        let b = a0 - a0 * j1 / j3;
        let c = -a0 * a0 / (2.0 * j3) - dv;

        let roots = match EquationSolver::solve(a, b, c)? {
            // A target next to the relaxed velocity is a double root that
            // rounding can push to a slightly negative discriminant.
            roots if !roots.success && b * b - 4.0 * a * c >= -1e-9 * (b * b + fabs(4.0 * a * c)) => {
                let x = -b / (2.0 * a);
                QuadraticRoots {
                    success: true,
                    x1: x,
                    x2: x,
                }
            }
            roots => roots,
        };
        let tolerance = 1e-9;
        roots
            .iter()
            .filter(|t1| *t1 >= -tolerance)
            .map(|t1| (t1.max(0.0), (-j1 * t1 - a0) / j3))
            .filter(|(_, t3)| *t3 >= -tolerance)
            .min_by(|x, y| x.0.total_cmp(&y.0))
            .map(|(t1, t3)| (t1, 0.0, t3.max(0.0)))
            .ok_or(
                PlanningError::RampUnsolvable {
                    a_from: a0,
                    v_from: v0,
                    v_to,
                }
                .into(),
            )
    }

    /// Distance needed to go from `(a_from, v_from)` to `v_to`.
    pub fn distance_needed(&self, a_from: f64, v_from: f64, v_to: f64) -> Result<f64> {
        Ok(self.calculate(a_from, v_from, v_to)?.length())
    }

    /// Time needed to go from `(a_from, v_from)` to `v_to`.
    pub fn time_needed(&self, a_from: f64, v_from: f64, v_to: f64) -> Result<f64> {
        Ok(self.calculate(a_from, v_from, v_to)?.duration())
    }

    /// Check whether `v_to` can be reached from `v_from` (at zero
    /// acceleration) within `available` distance.
    pub fn is_reachable(&self, v_from: f64, v_to: f64, available: f64) -> Result<bool> {
        Ok(self.distance_needed(0.0, v_from, v_to)? <= available + EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calculator() -> RampCalculator {
        RampCalculator::new(MotionParameter::symmetric(2000.0, 500.0).unwrap())
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

    #[test]
    fn test_constant() {
        let r = calculator().calculate(0.0, 100.0, 100.0).unwrap();
        assert_eq!(r.direction(), RampDirection::Constant);
        assert_eq!(r.length(), 0.0);
        assert_eq!(r.duration(), 0.0);
    }

    #[test]
    fn test_with_flat_phase() {
        // 0 -> 800: jerk phases each 0.25 s giving 62.5 each, flat 675 at 500.
        let r = calculator().calculate(0.0, 0.0, 800.0).unwrap();
        assert_eq!(r.direction(), RampDirection::Accelerate);
        let [t1, t2, t3] = r.phase_durations();
        assert_close(t1, 0.25, 1e-12);
        assert_close(t2, 1.35, 1e-12);
        assert_close(t3, 0.25, 1e-12);
        assert_close(r.duration(), 1.85, 1e-12);
        // Symmetric S-curve from rest: average velocity is half the target.
        assert_close(r.length(), 0.5 * 800.0 * 1.85, 1e-9);
    }

    #[test]
    fn test_without_flat_phase() {
        // 0 -> 5: peak acceleration sqrt(5 * 2000) = 100.
        let r = calculator().calculate(0.0, 0.0, 5.0).unwrap();
        let [t1, t2, t3] = r.phase_durations();
        assert_close(t1, 0.05, 1e-12);
        assert_eq!(t2, 0.0);
        assert_close(t3, 0.05, 1e-12);
        assert_close(r.peak_acceleration(), 100.0, 1e-9);
    }

    #[test]
    fn test_deceleration_mirrors_acceleration() {
        let up = calculator().calculate(0.0, 0.0, 600.0).unwrap();
        let down = calculator().calculate(0.0, 600.0, 0.0).unwrap();
        assert_eq!(down.direction(), RampDirection::Decelerate);
        assert_close(up.duration(), down.duration(), 1e-12);
        assert_close(up.length(), down.length(), 1e-9);
    }

    #[test]
    fn test_endpoints() {
        let calc = calculator();
        for &(a0, v0, v1) in &[
            (0.0, 0.0, 800.0),
            (300.0, 200.0, 700.0),
            (-400.0, 300.0, 600.0),
            (400.0, 300.0, 310.0),
            (-300.0, 50.0, 0.0),
            (250.0, 400.0, 400.0),
        ] {
            let r = calc.calculate(a0, v0, v1).unwrap();
            let start = r.state_at(0.0);
            assert_close(start.acceleration, a0, 1e-9);
            assert_close(start.velocity, v0, 1e-9);
            assert_close(start.distance, 0.0, 1e-9);

            let end = r.state_at(r.duration());
            assert_close(end.acceleration, 0.0, 1e-6);
            assert_close(end.velocity, v1, 1e-6);
            assert_close(end.distance, r.length(), 1e-6);

            assert_close(r.time_at_distance(r.length()).unwrap(), r.duration(), 1e-3);
        }
    }

    #[test]
    fn test_inversion_when_relaxing_overshoots() {
        // Relaxing 400 with jerk 2000 adds 40 velocity: 300 -> 340 > 310.
        let r = calculator().calculate(400.0, 300.0, 310.0).unwrap();
        assert_eq!(r.direction(), RampDirection::Accelerate);
        assert!(r.jerk_up() < 0.0);
        assert!(r.peak_acceleration() < 0.0);
    }

    #[test]
    fn test_time_at_distance_round_trip() {
        let r = calculator().calculate(0.0, 0.0, 800.0).unwrap();
        for i in 0..=20 {
            let s = r.length() * i as f64 / 20.0;
            let t = r.time_at_distance(s).unwrap();
            assert_close(r.state_at(t).distance, s, 1e-6);
        }
    }

    fn asymmetric_calculator() -> RampCalculator {
        RampCalculator::new(MotionParameter::new(2000.0, -1500.0, 500.0, -400.0).unwrap())
    }

    #[test]
    fn test_round_trip_with_negative_start_acceleration() {
        // Phase one has a single real root here; the complex pair's real
        // part also lies inside the phase.
        let r = asymmetric_calculator().calculate(-165.0039, 363.7985, 588.3214).unwrap();
        for fraction in [0.0, 0.01, 0.08, 0.25, 0.5, 0.9, 1.0] {
            let s = r.length() * fraction;
            let t = r.time_at_distance(s).unwrap();
            assert_close(r.state_at(t).distance, s, 1e-6);
        }
    }

    #[test]
    fn test_target_at_relaxed_velocity() {
        let calc = asymmetric_calculator();
        let relaxed = calc.relaxed_velocity(-313.0853, 620.4944);
        let r = calc.calculate(-313.0853, 620.4944, relaxed).unwrap();

        assert_eq!(r.direction(), RampDirection::Decelerate);
        let [t1, t2, t3] = r.phase_durations();
        assert_eq!((t1, t2), (0.0, 0.0));
        assert_close(t3, 313.0853 / 2000.0, 1e-12);

        let end = r.state_at(r.duration());
        assert_close(end.acceleration, 0.0, 1e-9);
        assert_close(end.velocity, relaxed, 1e-9);
        let t = r.time_at_distance(r.length() / 2.0).unwrap();
        assert_close(r.state_at(t).distance, r.length() / 2.0, 1e-6);

        // Slightly off the relaxed velocity the general solution still applies.
        assert!(calc.calculate(-313.0853, 620.4944, relaxed + 1e-6).is_ok());
        assert!(calc.calculate(-313.0853, 620.4944, relaxed - 1e-6).is_ok());
    }

    #[test]
    fn test_relaxed_velocity() {
        let calc = calculator();
        assert_close(calc.relaxed_velocity(400.0, 300.0), 340.0, 1e-12);
        assert_close(calc.relaxed_velocity(-300.0, 50.0), 27.5, 1e-12);
        assert_eq!(calc.relaxed_velocity(0.0, 12.0), 12.0);
    }

    #[test]
    fn test_hold_evaluates_linearly() {
        let hold = ExtendedRampCalculationResult::hold(10.0, 50.0, 5.0);
        let mid = hold.state_at(2.0);
        assert_eq!(mid.acceleration, 0.0);
        assert_close(mid.velocity, 10.0, 1e-12);
        assert_close(mid.distance, 20.0, 1e-12);
        assert_close(hold.time_at_distance(30.0).unwrap(), 3.0, 1e-12);
    }

    #[test]
    fn test_reachability() {
        let calc = calculator();
        let needed = calc.distance_needed(0.0, 0.0, 800.0).unwrap();
        assert!(calc.is_reachable(0.0, 800.0, needed).unwrap());
        assert!(!calc.is_reachable(0.0, 800.0, needed - 1.0).unwrap());
        assert_close(calc.time_needed(0.0, 0.0, 800.0).unwrap(), 1.85, 1e-12);
    }
}
