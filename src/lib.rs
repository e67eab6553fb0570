//! # clearance-motion
//!
//! Jerk-limited motion profiles along a one-dimensional path, re-planned
//! incrementally as path clearance is granted.
//!
//! ## Features
//!
//! - **S-curve ramps**: Minimal jerk-limited transitions between two velocities,
//!   including a non-zero starting acceleration
//! - **Joint profiles**: One continuous profile across an envelope of
//!   velocity caps and stop points, with iterative constraint repair
//! - **Clearance handling**: Re-plan from the current state whenever more
//!   path segments are authorized
//! - **no_std compatible**: Core library works without standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use clearance_motion::{ClearanceHandlingMotionProfile, MotionParameter, Segment};
//!
//! let segments = [
//!     Segment::new(1, 1000.0, 800.0, 1, 2),
//!     Segment::new(2, 1000.0, 800.0, 2, 3),
//! ];
//! let params = MotionParameter::symmetric(2000.0, 500.0)?;
//! let mut profile = ClearanceHandlingMotionProfile::new(0.0, &segments, params, 800.0)?;
//!
//! profile.clearance_granted(1, 0.0)?;
//! let state = profile.status(1.5);
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O, TOML parsing and `tracing` diagnostics
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

// Must come first so the logging macros are visible in every module.
#[macro_use]
mod fmt;

// Core modules
pub mod config;
pub mod constraint;
pub mod error;
pub mod math;
pub mod motion;
pub mod path;

// Re-exports for ergonomic API
pub use config::{validate_config, MotionParameter, PlannerConfig, PlannerSettings, PlannerTuning};
pub use constraint::{StopConstraint, StopConstraintCollection, VelocityConstraint, VelocityConstraintsCollection};
pub use error::{Error, Result};
pub use motion::{
    ExtendedRampCalculationResult, JointMotionProfile, JointMotionProfileInputSet, KinematicState,
    PlanningObserver, RampCalculator, RampDirection, Repair, VelocityPoint,
};
pub use path::{ClearanceHandlingMotionProfile, NodeId, PathSegment, Segment, VehicleStatus};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};
