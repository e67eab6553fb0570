//! Numeric helpers for ramp inversion.
//!
//! Closed-form linear/quadratic and cubic root finding.

mod cubic;
mod equation;

pub use cubic::{solve_cubic_in_range, Complex};
pub use equation::{EquationSolver, QuadraticRoots};

/// Tolerance used when comparing velocities, distances and times.
pub const EPSILON: f64 = 1e-8;
