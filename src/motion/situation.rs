//! Classification of a constraint by its incoming, own and outgoing velocity.

use crate::math::EPSILON;

/// Shape the velocity must take across one effective constraint.
///
/// `v0` is the velocity entering the constraint, `v1` its cap and `v2` the
/// cap of the following constraint (zero at the end of the path).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Situation {
    /// 1: `v1 > v0`, `v0 <= v2 < v1`. Peak below the cap, exit above entry.
    PeakExitAboveEntry,
    /// 2: `v1 > v0`, `v2 < v0`. Peak below the cap, exit below entry.
    PeakExitBelowEntry,
    /// 3: `v1 > v0`, `v2 >= v1`. Accelerate to the cap.
    Rise,
    /// 4: `v1 < v0`, `v1 < v2 <= v0`. Not reachable after repair.
    DipExitBelowEntry,
    /// 5: `v1 < v0`, `v2 > v0`. Not reachable after repair.
    DipExitAboveEntry,
    /// 6: `v1 < v0`, `v2 <= v1`. Entering above the cap, leaving lower.
    Fall,
    /// 7: `v1 == v0`, `v2 > v1`. Hold the cap.
    HoldThenRise,
    /// 8: `v1 == v0`, `v2 <= v1`. Hold, then brake before the end.
    HoldThenFall,
}

impl Situation {
    /// Classify a constraint.
    pub fn classify(v0: f64, v1: f64, v2: f64) -> Self {
        if libm::fabs(v1 - v0) < EPSILON {
            if v2 > v1 + EPSILON {
                Situation::HoldThenRise
            } else {
                Situation::HoldThenFall
            }
        } else if v1 > v0 {
            if v2 < v1 - EPSILON {
                if v2 >= v0 - EPSILON {
                    Situation::PeakExitAboveEntry
                } else {
                    Situation::PeakExitBelowEntry
                }
            } else {
                Situation::Rise
            }
        } else if v2 > v1 + EPSILON {
            if v2 <= v0 + EPSILON {
                Situation::DipExitBelowEntry
            } else {
                Situation::DipExitAboveEntry
            }
        } else {
            Situation::Fall
        }
    }

    /// Conventional situation number (1 to 8).
    pub const fn number(self) -> u8 {
        match self {
            Situation::PeakExitAboveEntry => 1,
            Situation::PeakExitBelowEntry => 2,
            Situation::Rise => 3,
            Situation::DipExitBelowEntry => 4,
            Situation::DipExitAboveEntry => 5,
            Situation::Fall => 6,
            Situation::HoldThenRise => 7,
            Situation::HoldThenFall => 8,
        }
    }
}
