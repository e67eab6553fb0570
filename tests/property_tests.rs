//! Property tests for the effective envelope, ramps and joint profiles.

use clearance_motion::{
    JointMotionProfile, JointMotionProfileInputSet, MotionParameter, RampCalculator, VelocityConstraint,
    VelocityConstraintsCollection,
};
use proptest::prelude::*;

fn params() -> MotionParameter {
    MotionParameter::new(2000.0, -1500.0, 500.0, -400.0).expect("valid limits")
}

fn raw_constraints() -> impl Strategy<Value = Vec<(f64, f64, f64)>> {
    prop::collection::vec((0.0..100.0f64, 0.5..50.0f64, 1.0..100.0f64), 1..8)
}

fn collection(parts: &[(f64, f64, f64)]) -> VelocityConstraintsCollection {
    let mut collection = VelocityConstraintsCollection::new();
    for &(start, length, v) in parts {
        collection
            .push(VelocityConstraint::new(start, length, v).unwrap())
            .unwrap();
    }
    collection
}

proptest! {
    #[test]
    fn effective_envelope_is_contiguous_and_tight(
        parts in raw_constraints(),
        sample_points in prop::collection::vec(0.0..150.0f64, 20),
    ) {
        let raw = collection(&parts);
        let effective = raw.effective_constraints().unwrap();
        prop_assert!(!effective.is_empty());

        for pair in effective.windows(2) {
            prop_assert!((pair[0].end() - pair[1].start()).abs() < 1e-9);
            prop_assert!(pair[0].max_velocity() != pair[1].max_velocity());
        }

        let max_end = parts.iter().map(|&(s, l, _)| s + l).fold(0.0, f64::max);
        let last = effective[effective.len() - 1];
        prop_assert!((last.end() - max_end).abs() < 1e-9);

        let near_boundary = |p: f64| {
            parts.iter().any(|&(s, l, _)| (p - s).abs() < 1e-6 || (p - s - l).abs() < 1e-6)
        };
        for &point in &sample_points {
            if near_boundary(point) {
                continue;
            }
            if let Some(expected) = raw.min_velocity_at(point) {
                let interval = effective.iter().find(|c| c.contains(point));
                prop_assert!(interval.is_some(), "point {} not covered", point);
                prop_assert_eq!(interval.map(|c| c.max_velocity()), Some(expected));
            }
        }
    }

    #[test]
    fn ramp_endpoints_and_inversion(
        a_from in -400.0..500.0f64,
        v_from in 0.0..800.0f64,
        v_to in 0.0..800.0f64,
        fraction in 0.0..1.0f64,
    ) {
        let calc = RampCalculator::new(params());
        let ramp = calc.calculate(a_from, v_from, v_to).unwrap();

        let start = ramp.state_at(0.0);
        prop_assert!((start.acceleration - a_from).abs() < 1e-9);
        prop_assert!((start.velocity - v_from).abs() < 1e-9);
        prop_assert_eq!(start.distance, 0.0);

        let end = ramp.state_at(ramp.duration());
        prop_assert!(end.acceleration.abs() < 1e-5);
        prop_assert!((end.velocity - v_to).abs() < 1e-6);
        prop_assert!((end.distance - ramp.length()).abs() < 1e-6);

        // Lowest velocity: relaxing a negative acceleration dips below the
        // start, otherwise velocity moves monotonically between the ends.
        let relaxed = calc.relaxed_velocity(a_from, v_from);
        let lowest = if a_from < 0.0 { relaxed } else { v_from }.min(v_to);

        if lowest >= 0.0 {
            let t = ramp.time_at_distance(ramp.length()).unwrap();
            prop_assert!((t - ramp.duration()).abs() < 1e-3);
        }

        // Inversion is only unique while the ramp keeps moving forward.
        if lowest > 1.0 {
            let s = ramp.length() * fraction;
            let t = ramp.time_at_distance(s).unwrap();
            prop_assert!((ramp.state_at(t).distance - s).abs() < 1e-6);
        }
    }

    #[test]
    fn joint_profile_starts_at_rest_and_ends_at_total_length(
        lengths in prop::collection::vec(50.0..1000.0f64, 1..6),
        caps in prop::collection::vec(20.0..800.0f64, 6),
    ) {
        let mut raw = VelocityConstraintsCollection::new();
        let mut start = 0.0;
        for (length, cap) in lengths.iter().zip(&caps) {
            raw.push(VelocityConstraint::new(start, *length, *cap).unwrap()).unwrap();
            start += length;
        }

        let input = JointMotionProfileInputSet::new(params(), 0.0, 0.0, raw);
        let profile = JointMotionProfile::new(input).unwrap();

        let first = profile.status(0.0);
        prop_assert_eq!(first.velocity, 0.0);
        prop_assert_eq!(first.distance, 0.0);

        let last = profile.status(profile.total_duration());
        prop_assert!(last.velocity.abs() < 1e-6);
        prop_assert!((last.distance - start).abs() < 1e-6);
        prop_assert!(profile.total_duration().is_finite());

        for pair in profile.velocity_points().windows(2) {
            prop_assert!(pair[1].distance >= pair[0].distance - 1e-9);
        }
    }
}
