//! Error types for clearance-motion.
//!
//! Provides unified error handling across configuration, constraint
//! construction and motion planning.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all clearance-motion operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Velocity or stop constraint error
    Constraint(ConstraintError),
    /// Profile planning error
    Planning(PlanningError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Positive jerk must be > 0
    InvalidPositiveJerk(f64),
    /// Negative jerk must be < 0
    InvalidNegativeJerk(f64),
    /// Max acceleration must be > 0
    InvalidMaxAcceleration(f64),
    /// Max deceleration must be < 0
    InvalidMaxDeceleration(f64),
    /// Cap velocity must be > 0
    InvalidCapVelocity(f64),
    /// Velocity decrement must be > 0
    InvalidVelocityDecrement(f64),
    /// Distance decrement must be > 0
    InvalidDistanceDecrement(f64),
    /// Repair iteration cap must be > 0
    InvalidRepairIterations(usize),
    /// Two path segments share an id
    DuplicateSegmentId(u32),
    /// Segment length must be >= 0
    InvalidSegmentLength {
        /// Segment id
        id: u32,
        /// Offending length
        length: f64,
    },
    /// Segment velocity must be > 0 (>= 0 for zero-length segments)
    InvalidSegmentVelocity {
        /// Segment id
        id: u32,
        /// Offending velocity
        velocity: f64,
    },
    /// Path holds more segments than a plan can constrain
    TooManySegments {
        /// Segments supplied
        count: usize,
        /// Largest supported path
        capacity: usize,
    },
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Velocity and stop constraint errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintError {
    /// Start distance must be >= 0
    NegativeStart(f64),
    /// Length must be >= 0
    NegativeLength(f64),
    /// Max velocity must be >= 0
    NegativeVelocity(f64),
    /// A constraint with positive length must allow motion
    ZeroVelocityOverLength {
        /// Constraint start distance
        start: f64,
        /// Constraint length
        length: f64,
    },
    /// Dwell duration must be >= 0
    NegativeDwell(f64),
    /// Fixed-capacity storage is full
    CapacityExceeded {
        /// Capacity that was exceeded
        capacity: usize,
    },
}

/// Profile planning errors. All of them abort profile construction.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanningError {
    /// Equation solver called with a == 0 and b == 0
    NotAnEquation,
    /// Both cubic solvers failed to produce a finite root
    CubicUnsolvable,
    /// No non-negative phase durations reach the target velocity
    RampUnsolvable {
        /// Initial acceleration
        a_from: f64,
        /// Initial velocity
        v_from: f64,
        /// Target velocity
        v_to: f64,
    },
    /// Situation 4 or 5 survived constraint repair
    ImpossibleSituation {
        /// Index into the effective constraint list
        index: usize,
        /// Situation number (4 or 5)
        situation: u8,
    },
    /// A ramp produced a NaN or infinite duration
    NonFiniteDuration {
        /// Index of the offending ramp
        index: usize,
    },
    /// Zero velocity hold over a positive distance
    ZeroVelocityHold {
        /// Index of the offending ramp
        index: usize,
    },
    /// Constraint cannot be repaired any further
    Infeasible {
        /// Index into the effective constraint list
        index: usize,
    },
    /// Repair loop exceeded its safety cap
    RepairLimitExceeded {
        /// Number of passes attempted
        iterations: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Constraint(e) => write!(f, "Constraint error: {}", e),
            Error::Planning(e) => write!(f, "Planning error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidPositiveJerk(v) => write!(f, "Invalid positive jerk: {}. Must be > 0", v),
            ConfigError::InvalidNegativeJerk(v) => write!(f, "Invalid negative jerk: {}. Must be < 0", v),
            ConfigError::InvalidMaxAcceleration(v) => {
                write!(f, "Invalid max acceleration: {}. Must be > 0", v)
            }
            ConfigError::InvalidMaxDeceleration(v) => {
                write!(f, "Invalid max deceleration: {}. Must be < 0", v)
            }
            ConfigError::InvalidCapVelocity(v) => write!(f, "Invalid cap velocity: {}. Must be > 0", v),
            ConfigError::InvalidVelocityDecrement(v) => {
                write!(f, "Invalid velocity decrement: {}. Must be > 0", v)
            }
            ConfigError::InvalidDistanceDecrement(v) => {
                write!(f, "Invalid distance decrement: {}. Must be > 0", v)
            }
            ConfigError::InvalidRepairIterations(v) => {
                write!(f, "Invalid repair iteration cap: {}. Must be > 0", v)
            }
            ConfigError::DuplicateSegmentId(id) => write!(f, "Duplicate path segment id: {}", id),
            ConfigError::InvalidSegmentLength { id, length } => {
                write!(f, "Segment {} has invalid length {}. Must be >= 0", id, length)
            }
            ConfigError::InvalidSegmentVelocity { id, velocity } => {
                write!(f, "Segment {} has invalid max velocity {}. Must be > 0", id, velocity)
            }
            ConfigError::TooManySegments { count, capacity } => {
                write!(f, "Path has {} segments, at most {} are supported", count, capacity)
            }
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for ConstraintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintError::NegativeStart(v) => write!(f, "Constraint start {} is negative", v),
            ConstraintError::NegativeLength(v) => write!(f, "Constraint length {} is negative", v),
            ConstraintError::NegativeVelocity(v) => write!(f, "Constraint velocity {} is negative", v),
            ConstraintError::ZeroVelocityOverLength { start, length } => write!(
                f,
                "Constraint at {} with length {} caps velocity at zero, use a stop constraint",
                start, length
            ),
            ConstraintError::NegativeDwell(v) => write!(f, "Dwell duration {} is negative", v),
            ConstraintError::CapacityExceeded { capacity } => {
                write!(f, "Capacity of {} entries exceeded", capacity)
            }
        }
    }
}

impl fmt::Display for PlanningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanningError::NotAnEquation => write!(f, "Coefficients a and b are both zero"),
            PlanningError::CubicUnsolvable => write!(f, "No finite real root for cubic"),
            PlanningError::RampUnsolvable { a_from, v_from, v_to } => write!(
                f,
                "No ramp from velocity {} (acceleration {}) to velocity {}",
                v_from, a_from, v_to
            ),
            PlanningError::ImpossibleSituation { index, situation } => {
                write!(f, "Situation {} at constraint {} after repair", situation, index)
            }
            PlanningError::NonFiniteDuration { index } => {
                write!(f, "Ramp {} has a non-finite duration", index)
            }
            PlanningError::ZeroVelocityHold { index } => {
                write!(f, "Ramp {} holds zero velocity over a positive distance", index)
            }
            PlanningError::Infeasible { index } => {
                write!(f, "Constraint {} cannot be repaired further", index)
            }
            PlanningError::RepairLimitExceeded { iterations } => {
                write!(f, "Constraint repair did not converge after {} passes", iterations)
            }
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<ConstraintError> for Error {
    fn from(e: ConstraintError) -> Self {
        Error::Constraint(e)
    }
}

impl From<PlanningError> for Error {
    fn from(e: PlanningError) -> Self {
        Error::Planning(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for ConstraintError {}

#[cfg(feature = "std")]
impl std::error::Error for PlanningError {}
