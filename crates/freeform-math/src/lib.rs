#![warn(missing_docs)]

//! Math types for the freeform geometry kernel.
//!
//! Thin wrappers around nalgebra providing the vector aliases,
//! tolerance constants, binomial coefficients, and the small dense linear
//! solves used by the curve, surface and multivariate crates.

use nalgebra::{DMatrix, DVector, Vector3};
use serde::{Deserialize, Serialize};

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A dynamically sized column vector.
pub type DVec = DVector<f64>;

/// A dynamically sized matrix.
pub type DMat = DMatrix<f64>;

/// Maximum number of Euclidean coordinates a control point may carry.
pub const MAX_PT_COORD: usize = 19;

/// General purpose comparison epsilon.
pub const EPS: f64 = 1e-5;

/// Epsilon used when comparing knot values and parametric domains.
pub const KNOT_EPS: f64 = 1e-10;

/// Smallest magnitude treated as non-zero in divisions.
pub const UEPS: f64 = 1e-14;

/// `true` if `a` and `b` differ by less than `eps`.
#[inline]
pub fn apx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() < eps
}

/// Tolerance set used across the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerance {
    /// Two knots closer than this are considered equal.
    pub knot: f64,
    /// Slack allowed when verifying a parameter against a domain.
    pub param: f64,
}

impl Tolerance {
    /// Default kernel tolerances.
    pub const DEFAULT: Self = Self {
        knot: KNOT_EPS,
        param: EPS,
    };

    /// Check if two knot values coincide.
    pub fn knots_equal(&self, a: f64, b: f64) -> bool {
        apx_eq(a, b, self.knot)
    }

    /// Check if `t` lies in `[min, max]`, allowing the parameter slack.
    pub fn in_domain(&self, t: f64, min: f64, max: f64) -> bool {
        t >= min - self.param && t <= max + self.param
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Binomial coefficient `C(n, k)` as a float. Zero when `k > n`.
pub fn binomial(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    let mut c = 1.0;
    for i in 0..k {
        c = c * (n - i) as f64 / (i + 1) as f64;
    }
    c
}

/// Solve the square system `a * x = b` by LU decomposition.
///
/// Returns `None` when `a` is singular.
pub fn solve_square(a: DMat, b: &DVec) -> Option<DVec> {
    if a.nrows() != a.ncols() || a.nrows() != b.len() {
        return None;
    }
    let lu = a.lu();
    let x = lu.solve(b)?;
    if x.iter().all(|v| v.is_finite()) {
        Some(x)
    } else {
        None
    }
}

/// Minimum norm least squares solution of `a * x = b` via SVD.
///
/// Works for under- and over-determined systems alike.
pub fn solve_min_norm(a: DMat, b: &DVec) -> Option<DVec> {
    if a.nrows() != b.len() {
        return None;
    }
    let svd = a.svd(true, true);
    let x = svd.solve(b, UEPS).ok()?;
    if x.iter().all(|v| v.is_finite()) {
        Some(x)
    } else {
        None
    }
}

/// Null vector of an `(n - 1) x n` matrix via signed maximal minors.
///
/// This is the generalized cross product: for a Jacobian of `n - 1`
/// constraints in `n` unknowns it is tangent to the solution curve.
/// Returns `None` if the matrix shape is wrong or the rows are dependent.
pub fn null_vector(a: &DMat) -> Option<DVec> {
    let n = a.ncols();
    if n < 2 || a.nrows() + 1 != n {
        return None;
    }
    let mut v = DVec::zeros(n);
    for i in 0..n {
        let minor = a.clone().remove_column(i);
        let d = minor.determinant();
        v[i] = if i % 2 == 0 { d } else { -d };
    }
    let norm = v.norm();
    if norm < UEPS {
        None
    } else {
        Some(v / norm)
    }
}
