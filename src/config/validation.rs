//! Configuration validation.

use crate::error::{ConfigError, Error, Result};
use crate::path::Segment;

use super::PlannerConfig;

/// Validate a planner configuration.
///
/// Checks:
/// - Cap velocity is positive
/// - Repair tuning values are positive
/// - Segment ids are unique
/// - Segment lengths are non-negative and segments with length allow motion
pub fn validate_config(config: &PlannerConfig) -> Result<()> {
    let cap = config.planner.cap_velocity;
    if !(cap > 0.0 && cap.is_finite()) {
        return Err(Error::Config(ConfigError::InvalidCapVelocity(cap)));
    }

    config.planner.tuning().validate()?;

    for (index, segment) in config.segments.iter().enumerate() {
        validate_segment(segment)?;

        if config.segments[..index].iter().any(|s| s.id == segment.id) {
            return Err(Error::Config(ConfigError::DuplicateSegmentId(segment.id)));
        }
    }

    Ok(())
}

fn validate_segment(segment: &Segment) -> Result<()> {
    if !(segment.length >= 0.0 && segment.length.is_finite()) {
        return Err(Error::Config(ConfigError::InvalidSegmentLength {
            id: segment.id,
            length: segment.length,
        }));
    }

    // A zero-length segment may carry a zero cap, anything longer must move.
    let velocity_ok = if segment.length > 0.0 {
        segment.max_velocity > 0.0
    } else {
        segment.max_velocity >= 0.0
    };
    if !velocity_ok {
        return Err(Error::Config(ConfigError::InvalidSegmentVelocity {
            id: segment.id,
            velocity: segment.max_velocity,
        }));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_velocity_segment() {
        let moving = Segment::new(4, 10.0, 0.0, 1, 2);
        assert!(matches!(
            validate_segment(&moving),
            Err(Error::Config(ConfigError::InvalidSegmentVelocity { id: 4, .. }))
        ));

        let point = Segment::new(5, 0.0, 0.0, 2, 2);
        assert!(validate_segment(&point).is_ok());
    }
}
