//! Distance-indexed velocity caps and the effective envelope.

use heapless::Vec;

use crate::error::{ConstraintError, Result};
use crate::math::EPSILON;

/// Maximum number of raw velocity constraints in one collection.
pub const MAX_VELOCITY_CONSTRAINTS: usize = 32;

/// Maximum number of stop constraints in one collection.
pub const MAX_STOP_CONSTRAINTS: usize = 8;

/// Maximum length of an effective envelope (overlap splits plus stop splits).
pub const MAX_EFFECTIVE_CONSTRAINTS: usize = 2 * MAX_VELOCITY_CONSTRAINTS + 2 * MAX_STOP_CONSTRAINTS;

/// Effective envelope storage.
pub type ConstraintList = Vec<VelocityConstraint, MAX_EFFECTIVE_CONSTRAINTS>;

/// Velocity cap over the half-open interval `[start, start + length)`.
///
/// Immutable; the `with_*` functions re-run validation and return a new value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VelocityConstraint {
    start: f64,
    length: f64,
    max_velocity: f64,
}

impl VelocityConstraint {
    /// Create a validated constraint.
    ///
    /// # Errors
    ///
    /// Fails on negative start, length or velocity, and on a positive length
    /// capped at zero velocity (use a stop constraint for that).
    pub fn new(start: f64, length: f64, max_velocity: f64) -> Result<Self> {
        if !(start >= 0.0) {
            return Err(ConstraintError::NegativeStart(start).into());
        }
        if !(length >= 0.0) {
            return Err(ConstraintError::NegativeLength(length).into());
        }
        if !(max_velocity >= 0.0) {
            return Err(ConstraintError::NegativeVelocity(max_velocity).into());
        }
        if length > 0.0 && max_velocity == 0.0 {
            return Err(ConstraintError::ZeroVelocityOverLength { start, length }.into());
        }

        Ok(Self {
            start,
            length,
            max_velocity,
        })
    }

    /// Zero-length, zero-velocity point forcing a full stop.
    pub(crate) fn stop_at(start: f64) -> Self {
        Self {
            start: start.max(0.0),
            length: 0.0,
            max_velocity: 0.0,
        }
    }

    /// Same constraint moved to a new start, keeping its length.
    pub fn with_start(self, start: f64) -> Result<Self> {
        Self::new(start, self.length, self.max_velocity)
    }

    /// Same constraint with a new length.
    pub fn with_length(self, length: f64) -> Result<Self> {
        Self::new(self.start, length, self.max_velocity)
    }

    /// Same constraint with a new velocity cap.
    pub fn with_max_velocity(self, max_velocity: f64) -> Result<Self> {
        Self::new(self.start, self.length, max_velocity)
    }

    /// Start distance.
    #[inline]
    pub const fn start(&self) -> f64 {
        self.start
    }

    /// Length of the interval.
    #[inline]
    pub const fn length(&self) -> f64 {
        self.length
    }

    /// End distance (`start + length`).
    #[inline]
    pub fn end(&self) -> f64 {
        self.start + self.length
    }

    /// Velocity cap.
    #[inline]
    pub const fn max_velocity(&self) -> f64 {
        self.max_velocity
    }

    /// Zero-length stop point.
    #[inline]
    pub fn is_stop(&self) -> bool {
        self.length == 0.0 && self.max_velocity == 0.0
    }

    /// Check whether `distance` lies in `[start, end)`.
    #[inline]
    pub fn contains(&self, distance: f64) -> bool {
        distance >= self.start && distance < self.end()
    }
}

/// Ordered, possibly overlapping set of velocity caps.
#[derive(Debug, Clone, Default)]
pub struct VelocityConstraintsCollection {
    constraints: Vec<VelocityConstraint, MAX_VELOCITY_CONSTRAINTS>,
}

impl VelocityConstraintsCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self {
            constraints: Vec::new(),
        }
    }

    /// Build a collection from a slice.
    pub fn from_slice(constraints: &[VelocityConstraint]) -> Result<Self> {
        let mut collection = Self::new();
        for c in constraints {
            collection.push(*c)?;
        }
        Ok(collection)
    }

    /// Append a constraint.
    ///
    /// # Errors
    ///
    /// Returns `ConstraintError::CapacityExceeded` when the collection is full.
    pub fn push(&mut self, constraint: VelocityConstraint) -> Result<()> {
        self.constraints.push(constraint).map_err(|_| {
            ConstraintError::CapacityExceeded {
                capacity: MAX_VELOCITY_CONSTRAINTS,
            }
            .into()
        })
    }

    /// Number of constraints.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Iterate over the raw constraints.
    pub fn iter(&self) -> impl Iterator<Item = &VelocityConstraint> {
        self.constraints.iter()
    }

    /// Raw constraints as a slice.
    pub fn as_slice(&self) -> &[VelocityConstraint] {
        &self.constraints
    }

    /// Sum of all constraint lengths.
    pub fn total_length(&self) -> f64 {
        self.constraints.iter().map(|c| c.length()).sum()
    }

    /// Smallest cap among constraints covering `distance`.
    pub fn min_velocity_at(&self, distance: f64) -> Option<f64> {
        self.constraints
            .iter()
            .filter(|c| c.contains(distance))
            .map(|c| c.max_velocity())
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Resolve overlaps into a disjoint, contiguous envelope.
    ///
    /// Every boundary point takes the minimum cap of the constraints covering
    /// it; consecutive points with the same cap merge, uncovered gaps extend
    /// the preceding interval and the last interval runs to the largest end.
    pub fn effective_constraints(&self) -> Result<ConstraintList> {
        let mut points: Vec<f64, { 2 * MAX_VELOCITY_CONSTRAINTS }> = Vec::new();
        for c in &self.constraints {
            // Capacity is exactly two points per constraint.
            let _ = points.push(c.start());
            let _ = points.push(c.end());
        }
        points.sort_unstable_by(|a, b| a.total_cmp(b));

        let max_end = self
            .constraints
            .iter()
            .map(|c| c.end())
            .fold(0.0_f64, f64::max);

        let mut effective = ConstraintList::new();
        for (index, &point) in points.iter().enumerate() {
            // Of a cluster of nearly equal points only the last one opens an
            // interval, so the cap right after the cluster is the one used.
            if points.get(index + 1).map_or(false, |&next| next - point < EPSILON) {
                continue;
            }

            let Some(velocity) = self.min_velocity_at(point) else {
                continue;
            };

            if effective.last().map(|c| c.max_velocity()) == Some(velocity) {
                continue;
            }
            if let Some(last) = effective.last_mut() {
                *last = last.with_length(point - last.start())?;
            }
            push_effective(&mut effective, VelocityConstraint::new(point, 0.0, velocity)?)?;
        }

        if let Some(last) = effective.last_mut() {
            *last = last.with_length(max_end - last.start())?;
        }

        Ok(effective)
    }
}

pub(crate) fn push_effective(list: &mut ConstraintList, constraint: VelocityConstraint) -> Result<()> {
    list.push(constraint).map_err(|_| {
        ConstraintError::CapacityExceeded {
            capacity: MAX_EFFECTIVE_CONSTRAINTS,
        }
        .into()
    })
}

pub(crate) fn insert_effective(
    list: &mut ConstraintList,
    index: usize,
    constraint: VelocityConstraint,
) -> Result<()> {
    list.insert(index, constraint).map_err(|_| {
        ConstraintError::CapacityExceeded {
            capacity: MAX_EFFECTIVE_CONSTRAINTS,
        }
        .into()
    })
}
