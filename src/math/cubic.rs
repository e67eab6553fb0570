//! Cubic root finding for distance→time inversion.
//!
//! The trigonometric form is tried first. It breaks down (NaN or ±∞) when the
//! depressed cubic has a single real root or a vanishing linear term, which is
//! the normal case for ramps starting at rest, so the Cardano formula over
//! complex numbers is always available as a fallback.

use core::f64::consts::PI;
use core::ops::{Add, Div, Mul, Neg, Sub};

use libm::{acos, atan2, cbrt, cos, fabs, hypot, sin, sqrt};

use crate::error::{PlanningError, Result};

use super::equation::EquationSolver;

/// Minimal complex number for the Cardano fallback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Complex {
    /// Real part.
    pub re: f64,
    /// Imaginary part.
    pub im: f64,
}

impl Complex {
    /// Create a new complex number.
    #[inline]
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// Purely real value.
    #[inline]
    pub const fn real(re: f64) -> Self {
        Self { re, im: 0.0 }
    }

    /// Modulus.
    #[inline]
    pub fn norm(self) -> f64 {
        hypot(self.re, self.im)
    }

    /// Argument in (-π, π].
    #[inline]
    pub fn arg(self) -> f64 {
        atan2(self.im, self.re)
    }

    fn from_polar(r: f64, theta: f64) -> Self {
        Self::new(r * cos(theta), r * sin(theta))
    }

    /// Principal square root.
    pub fn sqrt(self) -> Self {
        Self::from_polar(sqrt(self.norm()), self.arg() / 2.0)
    }

    /// Principal cube root.
    pub fn cbrt(self) -> Self {
        Self::from_polar(cbrt(self.norm()), self.arg() / 3.0)
    }
}

impl Add for Complex {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Sub for Complex {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl Mul for Complex {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

impl Div for Complex {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        let d = rhs.re * rhs.re + rhs.im * rhs.im;
        Self::new(
            (self.re * rhs.re + self.im * rhs.im) / d,
            (self.im * rhs.re - self.re * rhs.im) / d,
        )
    }
}

impl Neg for Complex {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.re, -self.im)
    }
}

/// Real roots of the depressed cubic `t³ + p·t + q = 0` via the
/// trigonometric method. Entries are NaN when the method does not apply.
fn trigonometric_roots(p: f64, q: f64) -> [f64; 3] {
    let m = 2.0 * sqrt(-p / 3.0);
    let theta = acos(3.0 * q / (2.0 * p) * sqrt(-3.0 / p)) / 3.0;
    [
        m * cos(theta),
        m * cos(theta - 2.0 * PI / 3.0),
        m * cos(theta - 4.0 * PI / 3.0),
    ]
}

/// Real roots of `t³ + p·t + q = 0` by Cardano's formula, principal root
/// first. Roots with a non-negligible imaginary part come back as NaN.
fn cardano_roots(p: f64, q: f64) -> [f64; 3] {
    let discriminant = q * q / 4.0 + p * p * p / 27.0;
    if discriminant > 0.0 {
        // One real root. Taking the larger cube root avoids cancellation.
        let root = sqrt(discriminant);
        let u = if q > 0.0 { -q / 2.0 - root } else { -q / 2.0 + root };
        let c = cbrt(u);
        if c == 0.0 {
            return [0.0, f64::NAN, f64::NAN];
        }
        return [c - p / (3.0 * c), f64::NAN, f64::NAN];
    }

    let delta = Complex::real(discriminant).sqrt();
    let half_q = Complex::real(-q / 2.0);
    let u1 = half_q + delta;
    let u2 = half_q - delta;
    let u = if u1.norm() >= u2.norm() { u1 } else { u2 };

    let c = u.cbrt();
    if c.norm() == 0.0 {
        return [0.0; 3];
    }

    let omega = Complex::from_polar(1.0, 2.0 * PI / 3.0);
    let third_p = Complex::real(p / 3.0);
    let mut roots = [f64::NAN; 3];
    let mut rotation = Complex::real(1.0);
    for root in roots.iter_mut() {
        let ck = c * rotation;
        let z = ck - third_p / ck;
        if fabs(z.im) <= 1e-6 * (1.0 + z.norm()) {
            *root = z.re;
        }
        rotation = rotation * omega;
    }
    roots
}

fn pick_in_range(candidates: &[f64], lo: f64, hi: f64) -> Option<f64> {
    let tol = 1e-6 * (1.0 + fabs(hi));
    candidates
        .iter()
        .copied()
        .filter(|x| x.is_finite() && *x >= lo - tol && *x <= hi + tol)
        .min_by(|a, b| a.total_cmp(b))
        .map(|x| x.clamp(lo, hi))
}

/// Find a real root of `a·x³ + b·x² + c·x + d = 0` inside `[lo, hi]`.
///
/// Degenerates to the quadratic solver when `a == 0`. If no real root lands
/// in range, the real root closest to the range is clamped into it.
///
/// # Errors
///
/// Returns `PlanningError::CubicUnsolvable` when neither method yields a
/// finite value.
pub fn solve_cubic_in_range(a: f64, b: f64, c: f64, d: f64, lo: f64, hi: f64) -> Result<f64> {
    if a == 0.0 {
        let roots = EquationSolver::solve(b, c, d)?;
        let candidates = [roots.x1, roots.x2];
        return pick_in_range(&candidates[..if roots.success { 2 } else { 0 }], lo, hi)
            .ok_or(PlanningError::CubicUnsolvable.into());
    }

    let b = b / a;
    let c = c / a;
    let d = d / a;
    let shift = b / 3.0;
    let p = c - b * b / 3.0;
    let q = 2.0 * b * b * b / 27.0 - b * c / 3.0 + d;

    let trig = trigonometric_roots(p, q).map(|t| t - shift);
    if let Some(x) = pick_in_range(&trig, lo, hi) {
        return Ok(x);
    }

    let cardano = cardano_roots(p, q).map(|t| t - shift);
    if let Some(x) = pick_in_range(&cardano, lo, hi) {
        return Ok(x);
    }

    // Nothing in range: clamp the real root closest to it.
    let distance_to_range = |x: f64| (lo - x).max(x - hi).max(0.0);
    cardano
        .iter()
        .copied()
        .filter(|x| x.is_finite())
        .min_by(|a, b| distance_to_range(*a).total_cmp(&distance_to_range(*b)))
        .map(|x| x.clamp(lo, hi))
        .ok_or(PlanningError::CubicUnsolvable.into())
}
