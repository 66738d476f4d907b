//! Basis kernels.
//!
//! One zero-sized kernel per representation implements [`CurveKernel`].
//! Operations a basis does not provide fall back to the trait defaults,
//! which report the matching `*NoSupport` error. Surfaces reuse the curve
//! kernels strip by strip (see [`crate::surface`]).

pub(crate) mod bezier;
pub(crate) mod bspline;
pub(crate) mod power;

use crate::curve::Curve;
use crate::error::{CagdError, Result};
use crate::types::GeomType;

pub(crate) use bezier::BezierBasis;
pub(crate) use bspline::BsplineBasis;
pub(crate) use power::PowerBasis;

/// The fixed contract every curve basis satisfies.
///
/// All operations return newly built curves; evaluation returns the
/// stored coordinates of the point (weight first when rational).
pub(crate) trait CurveKernel {
    /// Basis handled by this kernel.
    const GTYPE: GeomType;

    /// Parametric domain.
    fn domain(crv: &Curve) -> (f64, f64);

    /// Evaluate the stored coordinates at `t`.
    fn eval(crv: &Curve, t: f64) -> Result<Vec<f64>>;

    /// Curve with the given domain. May change the representation.
    fn set_domain(_crv: &Curve, _min: f64, _max: f64) -> Result<Curve> {
        Err(CagdError::no_support(Self::GTYPE, "domain changes"))
    }

    /// Differentiate every stored coordinate, weight included.
    fn derive_scalar(_crv: &Curve) -> Result<Curve> {
        Err(CagdError::no_support(Self::GTYPE, "derivatives"))
    }

    /// Antiderivative vanishing at the start of the domain.
    fn integrate(_crv: &Curve) -> Result<Curve> {
        Err(CagdError::no_support(Self::GTYPE, "integration"))
    }

    /// Split into the pieces before and after `t`.
    fn subdiv(_crv: &Curve, _t: f64) -> Result<(Curve, Curve)> {
        Err(CagdError::no_support(Self::GTYPE, "subdivision"))
    }

    /// Insert knots, or replace the knot vector when `replace` is set.
    fn refine(_crv: &Curve, _replace: bool, _knots: &[f64]) -> Result<Curve> {
        Err(CagdError::no_support(Self::GTYPE, "refinement"))
    }

    /// Raise the order to `order`.
    fn degree_raise_n(_crv: &Curve, _order: usize) -> Result<Curve> {
        Err(CagdError::no_support(Self::GTYPE, "degree raising"))
    }

    /// Lower the order by one.
    fn degree_reduce(_crv: &Curve) -> Result<Curve> {
        Err(CagdError::no_support(Self::GTYPE, "degree reduction"))
    }

    /// Moebius reparametrization with ratio `c`; `c == 0` equalizes the end weights.
    fn moebius(_crv: &Curve, _c: f64) -> Result<Curve> {
        Err(CagdError::no_support(Self::GTYPE, "Moebius transformation"))
    }

    /// Reverse the parametrization.
    fn reverse(_crv: &Curve) -> Result<Curve> {
        Err(CagdError::no_support(Self::GTYPE, "reversal"))
    }
}

/// Ratio that makes the end weights of a Moebius transform equal.
pub(crate) fn moebius_equalizing_ratio(w0: f64, wn: f64, n: usize) -> Result<f64> {
    if n == 0 {
        return Ok(1.0);
    }
    let ratio = w0 / wn;
    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(CagdError::invalid(format!(
            "end weights {w0} and {wn} cannot be equalized"
        )));
    }
    Ok(ratio.powf(1.0 / n as f64))
}

/// Multiply homogeneous rows by `c^i`.
pub(crate) fn moebius_rows(rows: &mut [Vec<f64>], c: f64) {
    let mut s = 1.0;
    for row in rows.iter_mut() {
        for x in row.iter_mut() {
            *x *= s;
        }
        s *= c;
    }
}
