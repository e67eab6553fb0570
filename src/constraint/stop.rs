//! Zero-velocity dwell points.

use heapless::Vec;

use crate::error::{ConstraintError, Result};
use crate::math::EPSILON;

use super::velocity::{insert_effective, push_effective, ConstraintList, VelocityConstraint, MAX_STOP_CONSTRAINTS};

/// Forced full stop at `start`, held for `dwell_duration` seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StopConstraint {
    start: f64,
    dwell_duration: f64,
}

impl StopConstraint {
    /// Create a validated stop.
    pub fn new(start: f64, dwell_duration: f64) -> Result<Self> {
        if !(start >= 0.0) {
            return Err(ConstraintError::NegativeStart(start).into());
        }
        if !(dwell_duration >= 0.0) {
            return Err(ConstraintError::NegativeDwell(dwell_duration).into());
        }
        Ok(Self { start, dwell_duration })
    }

    /// Stop position.
    #[inline]
    pub const fn start(&self) -> f64 {
        self.start
    }

    /// Standstill time in seconds.
    #[inline]
    pub const fn dwell_duration(&self) -> f64 {
        self.dwell_duration
    }
}

/// Stops ordered by position.
#[derive(Debug, Clone, Default)]
pub struct StopConstraintCollection {
    stops: Vec<StopConstraint, MAX_STOP_CONSTRAINTS>,
}

impl StopConstraintCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self { stops: Vec::new() }
    }

    /// Insert a stop, keeping the collection sorted by position.
    pub fn push(&mut self, stop: StopConstraint) -> Result<()> {
        let index = self
            .stops
            .iter()
            .position(|s| s.start() > stop.start())
            .unwrap_or(self.stops.len());
        self.stops.insert(index, stop).map_err(|_| {
            ConstraintError::CapacityExceeded {
                capacity: MAX_STOP_CONSTRAINTS,
            }
            .into()
        })
    }

    /// Number of stops.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Iterate in position order.
    pub fn iter(&self) -> impl Iterator<Item = &StopConstraint> {
        self.stops.iter()
    }

    /// Dwell time of a stop located at `distance`, if any.
    pub fn dwell_at(&self, distance: f64) -> Option<f64> {
        self.stops
            .iter()
            .find(|s| libm::fabs(s.start() - distance) < EPSILON)
            .map(|s| s.dwell_duration())
    }

    /// Split an effective envelope at every stop.
    ///
    /// The interval containing a stop becomes `before`, a zero-length stop
    /// point and `after`; empty pieces are dropped. A stop at or beyond the
    /// end of the envelope is appended after the last interval.
    pub fn split(&self, envelope: &mut ConstraintList) -> Result<()> {
        for stop in &self.stops {
            let at = stop.start();
            let Some(index) = envelope.iter().position(|c| c.contains(at) || at < c.start()) else {
                let end = envelope.last().map_or(at, |c| c.end());
                push_effective(envelope, VelocityConstraint::stop_at(end))?;
                continue;
            };

            let current = envelope[index];
            if current.is_stop() || at <= current.start() {
                insert_effective(envelope, index, VelocityConstraint::stop_at(current.start()))?;
                continue;
            }

            let before = current.with_length(at - current.start())?;
            let after = VelocityConstraint::new(at, current.end() - at, current.max_velocity())?;
            envelope[index] = before;
            insert_effective(envelope, index + 1, VelocityConstraint::stop_at(at))?;
            if after.length() > 0.0 {
                insert_effective(envelope, index + 2, after)?;
            }
        }
        Ok(())
    }
}
