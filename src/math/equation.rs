//! Linear and quadratic equation solver.

use libm::sqrt;

use crate::error::{PlanningError, Result};

/// Real roots of `a·x² + b·x + c = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticRoots {
    /// `false` when the discriminant is negative (no real root).
    pub success: bool,
    /// First root, `(-b + √disc) / 2a` for the quadratic case.
    pub x1: f64,
    /// Second root, `(-b - √disc) / 2a` for the quadratic case.
    pub x2: f64,
}

impl QuadraticRoots {
    /// Iterate over both roots when real.
    pub fn iter(&self) -> impl Iterator<Item = f64> {
        let roots = [self.x1, self.x2];
        let n = if self.success { 2 } else { 0 };
        roots.into_iter().take(n)
    }
}

/// Stateless solver for equations of degree one and two.
#[derive(Debug, Clone, Copy, Default)]
pub struct EquationSolver;

impl EquationSolver {
    /// Solve `a·x² + b·x + c = 0`.
    ///
    /// With `a == 0` the linear root `-c/b` is returned in both slots.
    ///
    /// # Errors
    ///
    /// Returns `PlanningError::NotAnEquation` if both `a` and `b` are zero.
    pub fn solve(a: f64, b: f64, c: f64) -> Result<QuadraticRoots> {
        if a == 0.0 && b == 0.0 {
            return Err(PlanningError::NotAnEquation.into());
        }

        if a == 0.0 {
            let x = -c / b;
            return Ok(QuadraticRoots { success: true, x1: x, x2: x });
        }

        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return Ok(QuadraticRoots { success: false, x1: f64::NAN, x2: f64::NAN });
        }

        let root = sqrt(disc);
        Ok(QuadraticRoots {
            success: true,
            x1: (-b + root) / (2.0 * a),
            x2: (-b - root) / (2.0 * a),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_not_an_equation() {
        assert_eq!(
            EquationSolver::solve(0.0, 0.0, 1.0),
            Err(Error::Planning(PlanningError::NotAnEquation))
        );
    }

    #[test]
    fn test_linear() {
        let r = EquationSolver::solve(0.0, 2.0, -4.0).unwrap();
        assert!(r.success);
        assert_eq!(r.x1, 2.0);
        assert_eq!(r.x2, 2.0);
    }

    #[test]
    fn test_quadratic_two_roots() {
        // (x - 1)(x - 3) = x² - 4x + 3
        let r = EquationSolver::solve(1.0, -4.0, 3.0).unwrap();
        assert!(r.success);
        assert!((r.x1 - 3.0).abs() < 1e-12);
        assert!((r.x2 - 1.0).abs() < 1e-12);
        assert_eq!(r.iter().count(), 2);
    }

    #[test]
    fn test_negative_discriminant() {
        let r = EquationSolver::solve(1.0, 0.0, 1.0).unwrap();
        assert!(!r.success);
        assert_eq!(r.iter().count(), 0);
    }
}
